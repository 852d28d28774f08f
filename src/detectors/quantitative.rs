//! Quantitative catalyst detection.
//!
//! One pass per headline:
//!   1. presence   - does the headline announce a concrete financial event?
//!   2. extraction - dollar amounts / percentages from the text
//!   3. type       - dividend / acquisition / buyback / earnings / guidance
//!   4. fusion     - confidence from presence, type and value count
//!   5. gating     - presence without any extracted value is a false positive

use std::sync::Arc;

use tracing::debug;

use crate::core::types::{QuantitativeCatalystResult, QuantitativeType};
use crate::detectors::{Probe, passes};
use crate::features::normalizers::clean_headline;
use crate::features::value_extractor::ValueExtractor;
use crate::oracle::{HypothesisSet, OracleError, ZeroShotOracle};

pub const PRESENCE_THRESHOLD: f64 = 0.85;
pub const TYPE_THRESHOLD: f64 = 0.6;
const MULTI_VALUE_BONUS: f64 = 0.1;
const NO_VALUE_PENALTY: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Presence {
    Catalyst,
    Commentary,
}

fn presence_hypotheses() -> HypothesisSet<Presence> {
    HypothesisSet::new([
        (
            Presence::Catalyst,
            "This headline announces a specific financial event with dollar amounts, such as a deal price, dividend, share buyback, or reported earnings.",
        ),
        (
            Presence::Commentary,
            "This headline is vague or general commentary without a specific financial event.",
        ),
    ])
}

/// Each type is probed with a directional pair: the "is" side names who moves
/// the money and in which direction, so sales, capital raises and revenue-only
/// updates fall on the "is not" side.
const TYPE_PROBES: [(QuantitativeType, &str, &str); 5] = [
    (
        QuantitativeType::Dividend,
        "The company is returning capital to its shareholders by declaring, paying, or raising a dividend.",
        "This is not a dividend paid to shareholders; it may be a securities offering, private placement, convertible note, or other capital raise.",
    ),
    (
        QuantitativeType::Acquisition,
        "The company is the buyer, acquiring or agreeing to purchase another company, business, or asset.",
        "The company is not the buyer; it is selling, divesting, or disposing of a business or asset, or this is not an acquisition.",
    ),
    (
        QuantitativeType::Buyback,
        "The company is returning capital to its shareholders by repurchasing its own shares.",
        "This is not a share repurchase; the company may be issuing or selling securities to raise capital.",
    ),
    (
        QuantitativeType::Earnings,
        "The company reports bottom-line profit, net income, or earnings per share for a period.",
        "This is not a profit or net income report; it is about revenue, bookings, subscriptions, or something else.",
    ),
    (
        QuantitativeType::Guidance,
        "The company issues, raises, or cuts its financial guidance or outlook for a future period.",
        "This is not forward financial guidance or an outlook from the company.",
    ),
];

pub struct QuantitativeCatalystDetector {
    oracle: Arc<dyn ZeroShotOracle>,
    extractor: ValueExtractor,
    presence: HypothesisSet<Presence>,
    type_probes: Vec<(QuantitativeType, HypothesisSet<Probe>)>,
}

impl QuantitativeCatalystDetector {
    pub fn new(oracle: Arc<dyn ZeroShotOracle>) -> Self {
        Self {
            oracle,
            extractor: ValueExtractor::new(),
            presence: presence_hypotheses(),
            type_probes: TYPE_PROBES
                .iter()
                .map(|&(kind, is, is_not)| {
                    (kind, HypothesisSet::new([(Probe::Is, is), (Probe::IsNot, is_not)]))
                })
                .collect(),
        }
    }

    pub async fn detect(
        &self,
        headline: Option<&str>,
    ) -> Result<QuantitativeCatalystResult, OracleError> {
        let Some(text) = clean_headline(headline) else {
            return Ok(QuantitativeCatalystResult::none());
        };

        // 1. Presence, read off the catalyst hypothesis whatever the ranking.
        let presence_score = self
            .presence
            .evaluate(self.oracle.as_ref(), &text)
            .await?
            .get(Presence::Catalyst);

        if !passes(presence_score, PRESENCE_THRESHOLD) {
            debug!(presence_score, "no quantitative catalyst");
            return Ok(QuantitativeCatalystResult::none());
        }

        // 2. Extraction
        let values = self.extractor.extract_display(&text);

        // 5 (early). Presence without numbers: likely a false positive, keep a
        // penalized confidence so it stays distinguishable from a clear negative.
        if values.is_empty() {
            debug!(presence_score, "presence passed but no values extracted");
            return Ok(QuantitativeCatalystResult {
                confidence: presence_score * NO_VALUE_PENALTY,
                ..QuantitativeCatalystResult::none()
            });
        }

        // 3. Type
        let (catalyst_type, type_score) = self.classify_type(&text).await?;

        // 4. Fusion
        let mut confidence = 0.5 * presence_score + 0.5 * type_score;
        if values.len() > 1 {
            confidence = (confidence + MULTI_VALUE_BONUS).min(1.0);
        }

        debug!(
            presence_score,
            type_score,
            catalyst_type = catalyst_type.as_str(),
            ?values,
            "quantitative catalyst"
        );

        Ok(QuantitativeCatalystResult {
            has_catalyst: true,
            catalyst_type: Some(catalyst_type),
            values,
            confidence,
        })
    }

    /// Best-scoring type; `Mixed` when even the best is below the type threshold.
    async fn classify_type(&self, text: &str) -> Result<(QuantitativeType, f64), OracleError> {
        let mut best = (QuantitativeType::Mixed, 0.0);

        for (kind, probe) in &self.type_probes {
            let score = probe
                .evaluate(self.oracle.as_ref(), text)
                .await?
                .get(Probe::Is);
            if score > best.1 {
                best = (*kind, score);
            }
        }

        if passes(best.1, TYPE_THRESHOLD) {
            Ok(best)
        } else {
            Ok((QuantitativeType::Mixed, best.1))
        }
    }
}
