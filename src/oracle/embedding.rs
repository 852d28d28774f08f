use std::sync::Mutex;

use anyhow::{Result, bail};
use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tracing::debug;

use super::{OracleError, Prediction, ZeroShotOracle, rank};
use crate::config::config::OracleCfg;

/// Local zero-shot scorer built on a sentence-embedding model.
///
/// The headline and every hypothesis are embedded in one batch; cosine
/// similarities are turned into a distribution with a temperature softmax, so
/// the scores of one call sum to 1.0 like an entailment classifier's.
pub struct EmbeddingOracle {
    // fastembed needs exclusive access while running inference
    model: Mutex<TextEmbedding>,
    model_name: String,
    temperature: f64,
}

impl EmbeddingOracle {
    pub fn new(cfg: &OracleCfg) -> Result<Self> {
        let model = TextEmbedding::try_new(
            InitOptions::new(model_from_name(&cfg.model)?).with_show_download_progress(true),
        )?;

        Ok(Self {
            model: Mutex::new(model),
            model_name: cfg.model.clone(),
            temperature: cfg.temperature,
        })
    }
}

fn model_from_name(name: &str) -> Result<EmbeddingModel> {
    Ok(match name.to_ascii_lowercase().as_str() {
        "all-minilm-l6-v2" => EmbeddingModel::AllMiniLML6V2,
        "all-minilm-l12-v2" => EmbeddingModel::AllMiniLML12V2,
        "bge-small-en-v1.5" => EmbeddingModel::BGESmallENV15,
        "bge-base-en-v1.5" => EmbeddingModel::BGEBaseENV15,
        "bge-large-en-v1.5" => EmbeddingModel::BGELargeENV15,
        other => bail!("unsupported embedding model: {}", other),
    })
}

#[async_trait]
impl ZeroShotOracle for EmbeddingOracle {
    async fn score(
        &self,
        text: &str,
        hypotheses: &[String],
    ) -> Result<Vec<Prediction>, OracleError> {
        if hypotheses.is_empty() {
            return Ok(Vec::new());
        }

        let mut batch = Vec::with_capacity(hypotheses.len() + 1);
        batch.push(text.to_string());
        batch.extend(hypotheses.iter().cloned());

        let embeddings = {
            let mut model = self
                .model
                .lock()
                .map_err(|_| OracleError::Unavailable("embedding model lock poisoned".into()))?;
            model
                .embed(batch, None)
                .map_err(|e| OracleError::Failure(e.to_string()))?
        };

        let (head, rest) = embeddings
            .split_first()
            .ok_or_else(|| OracleError::Malformed("empty embedding batch".into()))?;
        if rest.len() != hypotheses.len() {
            return Err(OracleError::Malformed(format!(
                "expected {} hypothesis embeddings, got {}",
                hypotheses.len(),
                rest.len()
            )));
        }

        let sims: Vec<f64> = rest.iter().map(|h| cosine(head, h)).collect();
        let probs = softmax(&sims, self.temperature);
        debug!(model = %self.model_name, ?sims, "embedding oracle scored");

        Ok(rank(hypotheses, &probs))
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0_f64;
    let mut na = 0.0_f64;
    let mut nb = 0.0_f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot / (na.sqrt() * nb.sqrt())
}

fn softmax(values: &[f64], temperature: f64) -> Vec<f64> {
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = values
        .iter()
        .map(|v| ((v - max) / temperature).exp())
        .collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}
