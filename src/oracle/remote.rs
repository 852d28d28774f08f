use std::num::NonZeroU32;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use super::{OracleError, Prediction, ZeroShotOracle};
use crate::config::config::OracleCfg;

/// Client for a hosted zero-shot-classification endpoint
/// (`{inputs, parameters: {candidate_labels}}` in, ranked labels out).
#[derive(Clone)]
pub struct RemoteOracle {
    client: Client,
    url: String,
    api_key: String,
    model: String,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

/// Both response shapes served by zero-shot endpoints.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ZeroShotResponse {
    Columns { labels: Vec<String>, scores: Vec<f64> },
    Rows(Vec<LabelScore>),
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

impl RemoteOracle {
    pub fn new(cfg: &OracleCfg) -> Result<Self> {
        let rpm = NonZeroU32::new(cfg.rate_limit_rpm).unwrap_or(NonZeroU32::MIN);
        let limiter = Arc::new(RateLimiter::direct(Quota::per_minute(rpm)));

        let client = Client::builder()
            .timeout(cfg.timeout)
            .build()
            .context("building oracle http client")?;

        info!("Remote oracle at {} with model {}", cfg.base_url, cfg.model);

        Ok(Self {
            client,
            url: cfg.base_url.clone(),
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
            limiter,
        })
    }
}

#[async_trait]
impl ZeroShotOracle for RemoteOracle {
    async fn score(
        &self,
        text: &str,
        hypotheses: &[String],
    ) -> Result<Vec<Prediction>, OracleError> {
        self.limiter.until_ready().await;

        let body = json!({
            "inputs": text,
            "parameters": {
                "candidate_labels": hypotheses,
                "multi_label": false,
            }
        });

        let mut req = self.client.post(&self.url).json(&body);
        if !self.api_key.is_empty() {
            req = req.header("Authorization", format!("Bearer {}", self.api_key));
        }

        let res = req
            .send()
            .await
            .map_err(|e| OracleError::Unavailable(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status();
            let err_text = res.text().await.unwrap_or_default();
            return Err(OracleError::Failure(format!("{}: {}", status, err_text)));
        }

        let parsed: ZeroShotResponse = res
            .json()
            .await
            .map_err(|e| OracleError::Malformed(e.to_string()))?;

        debug!(model = %self.model, "remote oracle scored {} hypotheses", hypotheses.len());
        attach_indices(hypotheses, parsed)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// The wire format only carries label text; resolve each label to the index
/// of the hypothesis it echoes so downstream code never matches on strings.
fn attach_indices(
    hypotheses: &[String],
    resp: ZeroShotResponse,
) -> Result<Vec<Prediction>, OracleError> {
    let rows: Vec<(String, f64)> = match resp {
        ZeroShotResponse::Columns { labels, scores } => {
            if labels.len() != scores.len() {
                return Err(OracleError::Malformed(format!(
                    "{} labels but {} scores",
                    labels.len(),
                    scores.len()
                )));
            }
            labels.into_iter().zip(scores).collect()
        }
        ZeroShotResponse::Rows(rows) => rows.into_iter().map(|r| (r.label, r.score)).collect(),
    };

    let mut taken = vec![false; hypotheses.len()];
    let mut out = Vec::with_capacity(rows.len());
    for (label, score) in rows {
        let index = (0..hypotheses.len())
            .find(|&i| !taken[i] && hypotheses[i] == label)
            .ok_or_else(|| OracleError::Malformed(format!("unknown label in response: {}", label)))?;
        taken[index] = true;
        out.push(Prediction { index, label, score });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hyps() -> Vec<String> {
        vec!["first".to_string(), "second".to_string()]
    }

    #[test]
    fn test_columns_response_indices() {
        let resp: ZeroShotResponse = serde_json::from_str(
            r#"{"sequence": "x", "labels": ["second", "first"], "scores": [0.8, 0.2]}"#,
        )
        .unwrap();

        let preds = attach_indices(&hyps(), resp).unwrap();
        assert_eq!(preds[0].index, 1);
        assert_eq!(preds[1].index, 0);
        assert!((preds[0].score - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_rows_response_indices() {
        let resp: ZeroShotResponse = serde_json::from_str(
            r#"[{"label": "first", "score": 0.6}, {"label": "second", "score": 0.4}]"#,
        )
        .unwrap();

        let preds = attach_indices(&hyps(), resp).unwrap();
        assert_eq!(preds[0].index, 0);
        assert_eq!(preds[1].index, 1);
    }

    #[test]
    fn test_unknown_label_is_malformed() {
        let resp: ZeroShotResponse =
            serde_json::from_str(r#"{"labels": ["third"], "scores": [1.0]}"#).unwrap();

        let err = attach_indices(&hyps(), resp).unwrap_err();
        assert!(matches!(err, OracleError::Malformed(_)));
    }
}
