//! Forward-looking and hedging language in a headline.

use serde::Serialize;

use crate::features::normalizers::clean_headline;
use crate::features::patterns::{PatternLibrary, SignalKind};

const HEDGE_PENALTY: f64 = 0.25;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    pub is_forward_looking: bool,
    pub hedging_terms: Vec<String>,
    /// 1.0 for unhedged statements, reduced per hedging term, floored at 0.
    pub certainty: f64,
}

impl ForecastResult {
    pub fn none() -> Self {
        Self {
            is_forward_looking: false,
            hedging_terms: Vec::new(),
            certainty: 0.0,
        }
    }
}

pub struct ForecastAnalyzer {
    patterns: &'static PatternLibrary,
}

impl Default for ForecastAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl ForecastAnalyzer {
    pub fn new() -> Self {
        Self {
            patterns: PatternLibrary::shared(),
        }
    }

    pub fn analyze(&self, headline: Option<&str>) -> ForecastResult {
        let Some(text) = clean_headline(headline) else {
            return ForecastResult::none();
        };

        let signals = self.patterns.scan(&text);
        let hedging_terms: Vec<String> = signals
            .tags(SignalKind::Hedging)
            .into_iter()
            .map(str::to_string)
            .collect();

        // a hedged statement is about something that has not happened yet
        let is_forward_looking =
            signals.has(SignalKind::ForwardLooking) || !hedging_terms.is_empty();
        let certainty = (1.0 - HEDGE_PENALTY * hedging_terms.len() as f64).max(0.0);

        ForecastResult {
            is_forward_looking,
            hedging_terms,
            certainty,
        }
    }
}
