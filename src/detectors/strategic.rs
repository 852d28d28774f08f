//! Strategic catalyst detection: leadership changes, partnerships, product
//! launches, merger agreements, rebrandings and clinical trial readouts.
//!
//! No numbers are fused here. Headlines framed around dollar amounts or
//! financial results belong to the quantitative detector and are dropped
//! before the oracle is consulted.

use std::sync::Arc;

use tracing::debug;

use crate::core::types::{StrategicCatalystResult, StrategicType};
use crate::detectors::passes;
use crate::features::normalizers::clean_headline;
use crate::features::patterns::{PatternLibrary, SignalKind};
use crate::features::value_extractor::{ValueExtractor, ValueKind};
use crate::oracle::{HypothesisSet, OracleError, ZeroShotOracle};

pub const PRESENCE_THRESHOLD: f64 = 0.5;
pub const TYPE_THRESHOLD: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Presence {
    Strategic,
    Other,
}

pub struct StrategicCatalystDetector {
    oracle: Arc<dyn ZeroShotOracle>,
    extractor: ValueExtractor,
    patterns: &'static PatternLibrary,
    presence: HypothesisSet<Presence>,
    types: HypothesisSet<StrategicType>,
}

impl StrategicCatalystDetector {
    pub fn new(oracle: Arc<dyn ZeroShotOracle>) -> Self {
        let presence = HypothesisSet::new([
            (
                Presence::Strategic,
                "This headline announces a specific strategic corporate event such as a leadership change, partnership, product launch, merger agreement, rebranding, or clinical trial result.",
            ),
            (
                Presence::Other,
                "This headline is about financial results, a routine announcement, or general commentary.",
            ),
        ]);

        let types = HypothesisSet::new([
            (
                StrategicType::ExecutiveChanges,
                "The company appoints, replaces, or loses a chief executive, board member, or other senior executive.",
            ),
            (
                StrategicType::StrategicPartnership,
                "The company forms a strategic partnership, collaboration, or alliance with another organization.",
            ),
            (
                StrategicType::ProductLaunch,
                "The company launches or unveils a new product or service, and the product is the main subject even if a partner is named.",
            ),
            (
                StrategicType::MergerAgreement,
                "The company signs a merger or acquisition agreement to combine with or buy another company.",
            ),
            (
                StrategicType::Rebranding,
                "The company rebrands, changes its name, or restructures its corporate organization.",
            ),
            (
                StrategicType::ClinicalTrialResults,
                "The company reports results from a clinical trial of a drug or medical treatment.",
            ),
        ]);

        Self {
            oracle,
            extractor: ValueExtractor::new(),
            patterns: PatternLibrary::shared(),
            presence,
            types,
        }
    }

    pub async fn detect(
        &self,
        headline: Option<&str>,
    ) -> Result<StrategicCatalystResult, OracleError> {
        let Some(text) = clean_headline(headline) else {
            return Ok(StrategicCatalystResult::none());
        };

        if self.is_primarily_quantitative(&text) {
            debug!("quantitative framing, skipping strategic classification");
            return Ok(StrategicCatalystResult::none());
        }

        let presence_score = self
            .presence
            .evaluate(self.oracle.as_ref(), &text)
            .await?
            .get(Presence::Strategic);

        if !passes(presence_score, PRESENCE_THRESHOLD) {
            debug!(presence_score, "no strategic catalyst");
            return Ok(StrategicCatalystResult::none());
        }

        let scores = self.types.evaluate(self.oracle.as_ref(), &text).await?;
        let (subtype, confidence) = match scores.best() {
            Some((kind, score)) if passes(score, TYPE_THRESHOLD) => (kind, score),
            Some((_, score)) => (StrategicType::Mixed, score),
            None => (StrategicType::Mixed, 0.0),
        };

        debug!(presence_score, subtype = subtype.as_str(), confidence, "strategic catalyst");

        Ok(StrategicCatalystResult {
            has_catalyst: true,
            subtype: Some(subtype),
            confidence,
        })
    }

    /// Dollar amounts or earnings/revenue language mean the headline is a
    /// financial result or deal-size story first.
    fn is_primarily_quantitative(&self, text: &str) -> bool {
        let has_money = self
            .extractor
            .extract(text)
            .iter()
            .any(|v| matches!(v.kind, ValueKind::Money | ValueKind::PerShare));

        has_money || self.patterns.scan(text).has(SignalKind::FinancialResult)
    }
}
