//! Deterministic oracle doubles for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{OracleError, Prediction, ZeroShotOracle, rank};

type Affinity = dyn Fn(&str, &str) -> f64 + Send + Sync;

/// Scores each hypothesis with a caller-supplied affinity `f(text, hypothesis)`
/// and normalizes the affinities of one call so they sum to 1.0.
pub struct ScriptedOracle {
    affinity: Box<Affinity>,
    calls: AtomicUsize,
}

impl ScriptedOracle {
    pub fn new(affinity: impl Fn(&str, &str) -> f64 + Send + Sync + 'static) -> Self {
        Self {
            affinity: Box::new(affinity),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ZeroShotOracle for ScriptedOracle {
    async fn score(
        &self,
        text: &str,
        hypotheses: &[String],
    ) -> Result<Vec<Prediction>, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let raw: Vec<f64> = hypotheses
            .iter()
            .map(|h| (self.affinity)(text, h).max(0.0))
            .collect();
        let total: f64 = raw.iter().sum();

        let scores: Vec<f64> = if total > 0.0 {
            raw.iter().map(|r| r / total).collect()
        } else {
            vec![1.0 / hypotheses.len().max(1) as f64; hypotheses.len()]
        };

        Ok(rank(hypotheses, &scores))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Always fails, as a model that could not be loaded would.
pub struct FailingOracle;

#[async_trait]
impl ZeroShotOracle for FailingOracle {
    async fn score(&self, _: &str, _: &[String]) -> Result<Vec<Prediction>, OracleError> {
        Err(OracleError::Unavailable("model not loaded".into()))
    }

    fn name(&self) -> &str {
        "failing"
    }
}
