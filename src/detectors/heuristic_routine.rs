//! Lexical routine scoring, kept as an alternative policy to the oracle-backed
//! detector. Overrides (superlatives, completion verbs, "special") veto a
//! routine verdict; materiality is reported but never decides.

use std::sync::Arc;

use tracing::debug;

use crate::core::types::RoutineResult;
use crate::detectors::materiality::{self, CompanyTable};
use crate::detectors::routine::{pattern_labels, transaction_amount, ROUTINE_THRESHOLD};
use crate::features::normalizers::clean_headline;
use crate::features::patterns::{PatternLibrary, SignalKind, Signals};
use crate::features::value_extractor::ValueExtractor;

const FREQUENCY_WEIGHT: f64 = 0.35;
const ROUTINE_EVENT_WEIGHT: f64 = 0.15;

pub struct HeuristicRoutineDetector {
    extractor: ValueExtractor,
    patterns: &'static PatternLibrary,
    companies: Arc<CompanyTable>,
}

impl HeuristicRoutineDetector {
    pub fn new(companies: Arc<CompanyTable>) -> Self {
        Self {
            extractor: ValueExtractor::new(),
            patterns: PatternLibrary::shared(),
            companies,
        }
    }

    pub fn detect(&self, headline: Option<&str>, company_symbol: Option<&str>) -> RoutineResult {
        let Some(text) = clean_headline(headline) else {
            return RoutineResult::none();
        };

        let signals = self.patterns.scan(&text);
        let routine_score = lexical_score(&signals);
        let overridden = has_override(&signals);

        let transaction_value = transaction_amount(&self.extractor.extract(&text));
        let materiality =
            materiality::assess(&self.companies, company_symbol, transaction_value);

        let is_routine = !overridden && routine_score > ROUTINE_THRESHOLD;
        debug!(routine_score, overridden, is_routine, "heuristic routine assessment");

        RoutineResult {
            routine_score,
            detected_patterns: pattern_labels(&signals),
            transaction_value,
            process_stage: signals.process_stage(),
            is_routine,
            materiality_score: materiality.map(|m| m.score),
            materiality_ratio: materiality.and_then(|m| m.ratio),
        }
    }
}

fn lexical_score(signals: &Signals) -> f64 {
    let frequency = signals.count(SignalKind::Frequency) as f64;
    let events = signals.count(SignalKind::RoutineEvent) as f64;
    (FREQUENCY_WEIGHT * frequency + ROUTINE_EVENT_WEIGHT * events).min(1.0)
}

fn has_override(signals: &Signals) -> bool {
    signals.has(SignalKind::Superlative)
        || signals.has(SignalKind::StageCompleted)
        || signals.has(SignalKind::Special)
}
