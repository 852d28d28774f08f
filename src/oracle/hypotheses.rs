//! Typed candidate-label sets.

use std::fmt::Debug;

use super::{OracleError, ZeroShotOracle};

/// Ordered, mutually exclusive hypotheses bound to detector-specific keys.
///
/// Order only matters for tie-breaks: when two keys score the same,
/// [`HypothesisScores::best`] returns the one declared first.
#[derive(Debug, Clone)]
pub struct HypothesisSet<K> {
    keys: Vec<K>,
    texts: Vec<String>,
}

impl<K: Copy + Eq + Debug> HypothesisSet<K> {
    pub fn new<S: Into<String>>(entries: impl IntoIterator<Item = (K, S)>) -> Self {
        let (keys, texts) = entries
            .into_iter()
            .map(|(k, s)| (k, s.into()))
            .unzip();
        Self { keys, texts }
    }

    pub async fn evaluate(
        &self,
        oracle: &dyn ZeroShotOracle,
        text: &str,
    ) -> Result<HypothesisScores<K>, OracleError> {
        let predictions = oracle.score(text, &self.texts).await?;

        let mut scores = vec![0.0; self.keys.len()];
        for p in predictions {
            let slot = scores.get_mut(p.index).ok_or_else(|| {
                OracleError::Malformed(format!(
                    "prediction index {} outside hypothesis set of {}",
                    p.index,
                    self.keys.len()
                ))
            })?;
            *slot = p.score;
        }

        Ok(HypothesisScores {
            scores: self.keys.iter().copied().zip(scores).collect(),
        })
    }
}

/// Scores of one oracle call, readable by key.
#[derive(Debug, Clone, PartialEq)]
pub struct HypothesisScores<K> {
    scores: Vec<(K, f64)>,
}

impl<K: Copy + Eq> HypothesisScores<K> {
    pub fn get(&self, key: K) -> f64 {
        self.scores
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, s)| *s)
            .unwrap_or(0.0)
    }

    pub fn best(&self) -> Option<(K, f64)> {
        let mut best: Option<(K, f64)> = None;
        for &(k, s) in &self.scores {
            match best {
                Some((_, b)) if s <= b => {}
                _ => best = Some((k, s)),
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::testing::ScriptedOracle;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Side {
        Yes,
        No,
    }

    #[tokio::test]
    async fn test_scores_read_by_key_not_position() {
        // The oracle ranks "no" first; the score for Yes must still be found.
        let oracle = ScriptedOracle::new(|_, hyp| if hyp.contains("no") { 3.0 } else { 1.0 });
        let set = HypothesisSet::new([(Side::Yes, "yes it is"), (Side::No, "no it is not")]);

        let scores = set.evaluate(&oracle, "anything").await.unwrap();
        assert!((scores.get(Side::Yes) - 0.25).abs() < 1e-9);
        assert!((scores.get(Side::No) - 0.75).abs() < 1e-9);
        assert_eq!(scores.best(), Some((Side::No, 0.75)));
    }

    #[tokio::test]
    async fn test_best_tie_prefers_declaration_order() {
        let oracle = ScriptedOracle::new(|_, _| 1.0);
        let set = HypothesisSet::new([(Side::No, "first"), (Side::Yes, "second")]);

        let scores = set.evaluate(&oracle, "anything").await.unwrap();
        assert_eq!(scores.best().map(|(k, _)| k), Some(Side::No));
    }
}
