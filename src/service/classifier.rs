//! Classification service: the core headline classifiers (temporal, opinion,
//! company relevance) plus the catalyst and routine detectors behind one
//! shared oracle.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::config::config::RoutinePolicy;
use crate::core::types::{
    HeadlineReport, OpinionResult, QuantitativeCatalystResult, RelevanceResult, RoutineResult,
    StrategicCatalystResult, TemporalCategory, TemporalResult,
};
use crate::detectors::forecast::ForecastAnalyzer;
use crate::detectors::heuristic_routine::HeuristicRoutineDetector;
use crate::detectors::materiality::CompanyTable;
use crate::detectors::quantitative::QuantitativeCatalystDetector;
use crate::detectors::routine::RoutineOperationDetector;
use crate::detectors::strategic::StrategicCatalystDetector;
use crate::detectors::{Probe, passes};
use crate::features::normalizers::clean_headline;
use crate::oracle::{HypothesisSet, OracleError, ZeroShotOracle};
use crate::service::batch::BatchItem;

pub const OPINION_THRESHOLD: f64 = 0.5;
pub const RELEVANCE_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stance {
    Opinion,
    Factual,
}

enum RoutineEngine {
    Semantic(RoutineOperationDetector),
    Heuristic(HeuristicRoutineDetector),
}

pub struct ClassificationService {
    oracle: Arc<dyn ZeroShotOracle>,
    temporal: HypothesisSet<TemporalCategory>,
    opinion: HypothesisSet<Stance>,
    quantitative: QuantitativeCatalystDetector,
    strategic: StrategicCatalystDetector,
    routine: RoutineEngine,
    forecast: ForecastAnalyzer,
}

impl ClassificationService {
    pub fn new(
        oracle: Arc<dyn ZeroShotOracle>,
        companies: Arc<CompanyTable>,
        policy: RoutinePolicy,
    ) -> Self {
        info!(oracle = oracle.name(), ?policy, companies = companies.len(), "building classifier");

        let routine = match policy {
            RoutinePolicy::Semantic => {
                RoutineEngine::Semantic(RoutineOperationDetector::new(oracle.clone(), companies))
            }
            RoutinePolicy::Heuristic => {
                RoutineEngine::Heuristic(HeuristicRoutineDetector::new(companies))
            }
        };

        Self {
            temporal: HypothesisSet::new([
                (TemporalCategory::Past, "This event already happened in the past."),
                (TemporalCategory::Present, "This event is happening right now."),
                (TemporalCategory::Future, "This event is expected to happen in the future."),
            ]),
            opinion: HypothesisSet::new([
                (
                    Stance::Opinion,
                    "This headline expresses an opinion, analysis, or recommendation.",
                ),
                (Stance::Factual, "This headline reports a fact or an event."),
            ]),
            quantitative: QuantitativeCatalystDetector::new(oracle.clone()),
            strategic: StrategicCatalystDetector::new(oracle.clone()),
            routine,
            forecast: ForecastAnalyzer::new(),
            oracle,
        }
    }

    pub async fn classify_temporal(&self, headline: Option<&str>) -> Result<TemporalResult, OracleError> {
        let Some(text) = clean_headline(headline) else {
            return Ok(TemporalResult {
                category: TemporalCategory::Present,
                confidence: 0.0,
            });
        };

        let scores = self.temporal.evaluate(self.oracle.as_ref(), &text).await?;
        let (category, confidence) = scores
            .best()
            .unwrap_or((TemporalCategory::Present, 0.0));
        Ok(TemporalResult {
            category,
            confidence,
        })
    }

    pub async fn classify_opinion(&self, headline: Option<&str>) -> Result<OpinionResult, OracleError> {
        let Some(text) = clean_headline(headline) else {
            return Ok(OpinionResult {
                is_opinion: false,
                confidence: 0.0,
            });
        };

        let confidence = self
            .opinion
            .evaluate(self.oracle.as_ref(), &text)
            .await?
            .get(Stance::Opinion);
        Ok(OpinionResult {
            is_opinion: passes(confidence, OPINION_THRESHOLD),
            confidence,
        })
    }

    pub async fn classify_company_relevance(
        &self,
        headline: Option<&str>,
        company: Option<&str>,
    ) -> Result<RelevanceResult, OracleError> {
        let company = company.map(str::trim).filter(|c| !c.is_empty());
        let (Some(text), Some(company)) = (clean_headline(headline), company) else {
            return Ok(RelevanceResult {
                is_relevant: false,
                confidence: 0.0,
            });
        };

        // company-specific, so built per call
        let relevance = HypothesisSet::new([
            (Probe::Is, format!("This headline is primarily about {company}.")),
            (Probe::IsNot, format!("This headline is not primarily about {company}.")),
        ]);
        let confidence = relevance
            .evaluate(self.oracle.as_ref(), &text)
            .await?
            .get(Probe::Is);
        Ok(RelevanceResult {
            is_relevant: passes(confidence, RELEVANCE_THRESHOLD),
            confidence,
        })
    }

    pub async fn detect_quantitative_catalyst(
        &self,
        headline: Option<&str>,
    ) -> Result<QuantitativeCatalystResult, OracleError> {
        self.quantitative.detect(headline).await
    }

    pub async fn detect_strategic_catalyst(
        &self,
        headline: Option<&str>,
    ) -> Result<StrategicCatalystResult, OracleError> {
        self.strategic.detect(headline).await
    }

    pub async fn detect_routine_operation(
        &self,
        headline: Option<&str>,
        company_symbol: Option<&str>,
    ) -> Result<RoutineResult, OracleError> {
        match &self.routine {
            RoutineEngine::Semantic(d) => d.detect(headline, company_symbol).await,
            RoutineEngine::Heuristic(d) => Ok(d.detect(headline, company_symbol)),
        }
    }

    /// Full report for one headline. Relevance is only assessed when a symbol is given.
    pub async fn classify(
        &self,
        headline: &str,
        symbol: Option<&str>,
    ) -> Result<HeadlineReport, OracleError> {
        let symbol = symbol.map(str::trim).filter(|s| !s.is_empty());
        let text = clean_headline(Some(headline));
        let input = text.as_deref();

        let temporal = self.classify_temporal(input).await?;
        let opinion = self.classify_opinion(input).await?;
        let relevance = match symbol {
            Some(s) => Some(self.classify_company_relevance(input, Some(s)).await?),
            None => None,
        };
        let quantitative = self.detect_quantitative_catalyst(input).await?;
        let strategic = self.detect_strategic_catalyst(input).await?;
        let routine = self.detect_routine_operation(input, symbol).await?;
        let forecast = self.forecast.analyze(input);

        debug!(
            headline,
            quantitative = quantitative.has_catalyst,
            strategic = strategic.has_catalyst,
            routine = routine.is_routine,
            "classified"
        );

        Ok(HeadlineReport {
            headline: text.unwrap_or_default(),
            symbol: symbol.map(str::to_string),
            temporal,
            opinion,
            relevance,
            quantitative,
            strategic,
            routine,
            forecast,
            classified_at: Utc::now(),
        })
    }

    /// Items are processed in order; the first oracle error aborts the batch.
    pub async fn classify_batch(&self, items: &[BatchItem]) -> Result<Vec<HeadlineReport>, OracleError> {
        let mut reports = Vec::with_capacity(items.len());
        for item in items {
            reports.push(self.classify(&item.headline, item.symbol.as_deref()).await?);
        }
        info!(count = reports.len(), "batch classified");
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::QuantitativeType;
    use crate::oracle::testing::{FailingOracle, ScriptedOracle};

    const ABOUT: &str = "This headline is primarily about ";

    /// Keyword-driven stand-in covering every hypothesis the service asks.
    fn newsroom_oracle() -> ScriptedOracle {
        ScriptedOracle::new(|text, hyp| {
            let t = text.to_lowercase();
            let any = |words: &[&str]| words.iter().any(|w| t.contains(w));

            if hyp.contains("in the future") {
                return if any(&["will", "expects", "plans"]) { 8.0 } else { 1.0 };
            }
            if hyp.contains("already happened") {
                return if any(&["reported", "completed", "posted"]) { 8.0 } else { 1.0 };
            }
            if hyp.contains("right now") {
                return 2.0;
            }
            if hyp.contains("expresses an opinion") {
                return if any(&["why", "should", "analyst"]) { 8.0 } else { 1.0 };
            }
            if hyp.contains("reports a fact") {
                return 2.0;
            }
            if hyp.contains("is not primarily about") {
                return 2.0;
            }
            if let Some(company) = hyp.strip_prefix(ABOUT) {
                let company = company.trim_end_matches('.').to_lowercase();
                return if t.contains(&company) { 8.0 } else { 1.0 };
            }
            if hyp.contains("announces a specific financial event") {
                return if t.contains('$') { 19.0 } else { 1.0 };
            }
            if hyp.contains("vague or general") {
                return 1.0;
            }
            if hyp.contains("The company is the buyer") {
                return if any(&["acquire", "buy"]) { 9.0 } else { 1.0 };
            }
            if hyp.contains("recurring scheduled") {
                return if any(&["quarterly", "regular"]) { 9.0 } else { 1.0 };
            }
            if hyp.contains("transformational") {
                return 3.0;
            }
            1.0
        })
    }

    fn service(oracle: Arc<dyn ZeroShotOracle>, policy: RoutinePolicy) -> ClassificationService {
        ClassificationService::new(oracle, Arc::new(CompanyTable::builtin()), policy)
    }

    #[tokio::test]
    async fn test_temporal() {
        let svc = service(Arc::new(newsroom_oracle()), RoutinePolicy::Semantic);

        let r = svc.classify_temporal(Some("Acme will open a new plant")).await.unwrap();
        assert_eq!(r.category, TemporalCategory::Future);
        assert!((r.confidence - 8.0 / 11.0).abs() < 1e-9);

        let r = svc.classify_temporal(Some("Acme reported a loss")).await.unwrap();
        assert_eq!(r.category, TemporalCategory::Past);

        let r = svc.classify_temporal(Some("Acme shares trade flat")).await.unwrap();
        assert_eq!(r.category, TemporalCategory::Present);
    }

    #[tokio::test]
    async fn test_empty_inputs_skip_the_oracle() {
        let oracle = Arc::new(newsroom_oracle());
        let svc = service(oracle.clone(), RoutinePolicy::Semantic);

        let t = svc.classify_temporal(None).await.unwrap();
        assert_eq!(t.category, TemporalCategory::Present);
        assert_eq!(t.confidence, 0.0);
        assert!(!svc.classify_opinion(Some("   ")).await.unwrap().is_opinion);
        let rel = svc
            .classify_company_relevance(Some("Acme wins contract"), Some(" "))
            .await
            .unwrap();
        assert!(!rel.is_relevant);
        assert_eq!(rel.confidence, 0.0);

        let report = svc.classify("", Some("FNMA")).await.unwrap();
        assert_eq!(report.headline, "");
        assert_eq!(report.routine, RoutineResult::none());
        assert_eq!(report.quantitative, QuantitativeCatalystResult::none());
        assert_eq!(oracle.calls(), 0);
    }

    #[tokio::test]
    async fn test_opinion() {
        let svc = service(Arc::new(newsroom_oracle()), RoutinePolicy::Semantic);

        let r = svc
            .classify_opinion(Some("Why Acme stock should double"))
            .await
            .unwrap();
        assert!(r.is_opinion);

        let r = svc.classify_opinion(Some("Acme names new CFO")).await.unwrap();
        assert!(!r.is_opinion);
        assert!((r.confidence - 1.0 / 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_opinion_threshold_inclusive() {
        let svc = service(Arc::new(ScriptedOracle::new(|_, _| 1.0)), RoutinePolicy::Semantic);
        let r = svc.classify_opinion(Some("Acme names new CFO")).await.unwrap();
        assert_eq!(r.confidence, 0.5);
        assert!(r.is_opinion);
    }

    #[tokio::test]
    async fn test_company_relevance() {
        let svc = service(Arc::new(newsroom_oracle()), RoutinePolicy::Semantic);

        let r = svc
            .classify_company_relevance(Some("Acme wins Navy contract"), Some("Acme"))
            .await
            .unwrap();
        assert!(r.is_relevant);
        assert!((r.confidence - 0.8).abs() < 1e-9);

        let r = svc
            .classify_company_relevance(Some("Beta wins Navy contract"), Some("Acme"))
            .await
            .unwrap();
        assert!(!r.is_relevant);
    }

    #[tokio::test]
    async fn test_routine_policy_dispatch() {
        let headline = Some("Fannie Mae prices $560.5M multifamily mortgage securitization");

        let semantic = service(Arc::new(newsroom_oracle()), RoutinePolicy::Semantic);
        let r = semantic.detect_routine_operation(headline, Some("FNMA")).await.unwrap();
        assert!(r.is_routine);

        // lexical policy: no routine wording, materiality does not override
        let oracle = Arc::new(newsroom_oracle());
        let heuristic = service(oracle.clone(), RoutinePolicy::Heuristic);
        let r = heuristic.detect_routine_operation(headline, Some("FNMA")).await.unwrap();
        assert_eq!(r.materiality_score, Some(-2));
        assert!(!r.is_routine);
        assert_eq!(oracle.calls(), 0);
    }

    #[tokio::test]
    async fn test_classify_report() {
        let svc = service(Arc::new(newsroom_oracle()), RoutinePolicy::Semantic);
        let report = svc
            .classify("  Acme to acquire  Beta for $1.2B  ", Some("acme"))
            .await
            .unwrap();

        assert_eq!(report.headline, "Acme to acquire Beta for $1.2B");
        assert_eq!(report.symbol.as_deref(), Some("acme"));
        assert!(report.relevance.unwrap().is_relevant);
        assert!(report.quantitative.has_catalyst);
        assert_eq!(
            report.quantitative.catalyst_type,
            Some(QuantitativeType::Acquisition)
        );
        assert_eq!(report.quantitative.values, vec!["$1.2B"]);
        // dollar amounts route away from the strategic detector
        assert!(!report.strategic.has_catalyst);
        assert_eq!(report.routine.transaction_value, Some(1.2e9));
        assert_eq!(report.routine.materiality_score, Some(0));
        assert!(!report.routine.is_routine);
        assert!(!report.forecast.is_forward_looking);
    }

    #[tokio::test]
    async fn test_classify_without_symbol_has_no_relevance() {
        let svc = service(Arc::new(newsroom_oracle()), RoutinePolicy::Semantic);
        let report = svc.classify("Acme will open a new plant", None).await.unwrap();

        assert!(report.relevance.is_none());
        assert!(report.symbol.is_none());
        assert_eq!(report.temporal.category, TemporalCategory::Future);
        assert!(report.forecast.is_forward_looking);
        assert_eq!(report.routine.materiality_score, None);
    }

    #[tokio::test]
    async fn test_batch_preserves_order() {
        let svc = service(Arc::new(newsroom_oracle()), RoutinePolicy::Semantic);
        let items = vec![
            BatchItem::new("Acme reported a loss", None),
            BatchItem::new("Acme declares regular quarterly dividend", Some("ACME")),
        ];

        let reports = svc.classify_batch(&items).await.unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].headline, "Acme reported a loss");
        assert!(reports[1].routine.is_routine);
    }

    #[tokio::test]
    async fn test_batch_fails_fast() {
        let svc = service(Arc::new(FailingOracle), RoutinePolicy::Semantic);
        let items = vec![
            BatchItem::new("Acme reported a loss", None),
            BatchItem::new("Beta names CEO", None),
        ];
        assert!(matches!(
            svc.classify_batch(&items).await,
            Err(OracleError::Unavailable(_))
        ));
        assert!(svc.classify_batch(&[]).await.unwrap().is_empty());
    }
}
