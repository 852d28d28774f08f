//! Routine-vs-material assessment.
//!
//! Two signals, fused by priority:
//!   - materiality: transaction size against the company's size metric. A
//!     strongly immaterial amount (-2) makes the headline routine outright.
//!   - semantic: the oracle's mass on "recurring scheduled event", used when
//!     materiality does not decide.
//!
//! Process stage is reported as metadata and never changes the decision.

use std::sync::Arc;

use tracing::debug;

use crate::core::types::RoutineResult;
use crate::detectors::materiality::{self, CompanyTable};
use crate::features::normalizers::clean_headline;
use crate::features::patterns::{PatternLibrary, SignalKind, Signals};
use crate::features::value_extractor::{ExtractedValue, ValueExtractor, ValueKind};
use crate::oracle::{HypothesisSet, OracleError, ZeroShotOracle};

/// `is_routine` needs a routine score strictly above this.
pub const ROUTINE_THRESHOLD: f64 = 0.5;
/// Materiality score at or below which the headline is routine regardless of the oracle.
pub const MATERIALITY_OVERRIDE: i8 = -2;

const PATTERN_KINDS: [SignalKind; 8] = [
    SignalKind::Frequency,
    SignalKind::RoutineEvent,
    SignalKind::Transaction,
    SignalKind::StageEarly,
    SignalKind::StageOngoing,
    SignalKind::StageCompleted,
    SignalKind::Superlative,
    SignalKind::Special,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Nature {
    Transformational,
    Recurring,
}

/// Largest plain dollar amount; per-share prices and percentages never count.
pub fn transaction_amount(values: &[ExtractedValue]) -> Option<f64> {
    values
        .iter()
        .filter(|v| v.kind == ValueKind::Money)
        .map(|v| v.amount)
        .fold(None, |acc: Option<f64>, a| Some(acc.map_or(a, |b| b.max(a))))
}

pub(crate) fn pattern_labels(signals: &Signals) -> Vec<String> {
    signals.labels(&PATTERN_KINDS)
}

pub struct RoutineOperationDetector {
    oracle: Arc<dyn ZeroShotOracle>,
    extractor: ValueExtractor,
    patterns: &'static PatternLibrary,
    companies: Arc<CompanyTable>,
    nature: HypothesisSet<Nature>,
}

impl RoutineOperationDetector {
    pub fn new(oracle: Arc<dyn ZeroShotOracle>, companies: Arc<CompanyTable>) -> Self {
        let nature = HypothesisSet::new([
            (
                Nature::Transformational,
                "This is a major one-time transformational corporate event such as a large acquisition, merger, asset sale, or restructuring.",
            ),
            (
                Nature::Recurring,
                "This is a recurring scheduled corporate event such as a regular dividend, an annual meeting, or a routine regulatory filing.",
            ),
        ]);

        Self {
            oracle,
            extractor: ValueExtractor::new(),
            patterns: PatternLibrary::shared(),
            companies,
            nature,
        }
    }

    pub async fn detect(
        &self,
        headline: Option<&str>,
        company_symbol: Option<&str>,
    ) -> Result<RoutineResult, OracleError> {
        let Some(text) = clean_headline(headline) else {
            return Ok(RoutineResult::none());
        };

        let routine_score = self
            .nature
            .evaluate(self.oracle.as_ref(), &text)
            .await?
            .get(Nature::Recurring);

        let signals = self.patterns.scan(&text);
        let transaction_value = transaction_amount(&self.extractor.extract(&text));
        let materiality =
            materiality::assess(&self.companies, company_symbol, transaction_value);

        // Hard financial proportion first, the semantic read second.
        let is_routine = match materiality {
            Some(m) if m.score <= MATERIALITY_OVERRIDE => true,
            _ => routine_score > ROUTINE_THRESHOLD,
        };

        debug!(
            routine_score,
            ?transaction_value,
            ?materiality,
            is_routine,
            "routine assessment"
        );

        Ok(RoutineResult {
            routine_score,
            detected_patterns: pattern_labels(&signals),
            transaction_value,
            process_stage: signals.process_stage(),
            is_routine,
            materiality_score: materiality.map(|m| m.score),
            materiality_ratio: materiality.and_then(|m| m.ratio),
        })
    }
}
