//! Zero-shot entailment scoring.
//!
//! The oracle is an opaque collaborator: given a headline and a set of
//! candidate statements it returns one probability per statement, ranked by
//! descending score and summing to 1.0 over the set. Callers never rely on the
//! returned order; every [`Prediction`] carries the index of the hypothesis it
//! scores, and [`HypothesisSet`] maps that index back to a typed key.

pub mod embedding;
pub mod hypotheses;
pub mod remote;
#[cfg(test)]
pub mod testing;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::config::config::{OracleBackend, OracleCfg};

pub use hypotheses::HypothesisSet;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle unavailable: {0}")]
    Unavailable(String),

    #[error("oracle call failed: {0}")]
    Failure(String),

    #[error("malformed oracle response: {0}")]
    Malformed(String),
}

/// Score for one hypothesis of a single oracle call.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Position of the hypothesis in the slice passed to [`ZeroShotOracle::score`].
    pub index: usize,
    pub label: String,
    pub score: f64,
}

#[async_trait]
pub trait ZeroShotOracle: Send + Sync {
    /// Score `text` against every hypothesis. Predictions come back sorted by
    /// descending score.
    async fn score(&self, text: &str, hypotheses: &[String])
    -> Result<Vec<Prediction>, OracleError>;

    fn name(&self) -> &str;
}

/// Turns raw per-hypothesis scores into ranked predictions.
pub(crate) fn rank(hypotheses: &[String], scores: &[f64]) -> Vec<Prediction> {
    let mut out: Vec<Prediction> = hypotheses
        .iter()
        .zip(scores)
        .enumerate()
        .map(|(index, (label, score))| Prediction {
            index,
            label: label.clone(),
            score: *score,
        })
        .collect();

    out.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    out
}

/// Load the configured backend once; the handle is shared read-only by every detector.
pub fn build_oracle(cfg: &OracleCfg) -> Result<Arc<dyn ZeroShotOracle>> {
    info!(backend = ?cfg.backend, model = %cfg.model, "Loading zero-shot oracle");
    let oracle: Arc<dyn ZeroShotOracle> = match cfg.backend {
        OracleBackend::Embedding => Arc::new(embedding::EmbeddingOracle::new(cfg)?),
        OracleBackend::Remote => Arc::new(remote::RemoteOracle::new(cfg)?),
    };
    Ok(oracle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_sorts_descending_and_keeps_index() {
        let hyps = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let ranked = rank(&hyps, &[0.2, 0.7, 0.1]);

        assert_eq!(ranked[0].index, 1);
        assert_eq!(ranked[0].label, "b");
        assert_eq!(ranked[1].index, 0);
        assert_eq!(ranked[2].index, 2);
    }
}
