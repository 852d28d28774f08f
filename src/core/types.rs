use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::detectors::forecast::ForecastResult;

// ----------- Shared enums -----------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStage {
    Early,
    Ongoing,
    Completed,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantitativeType {
    Dividend,
    Acquisition,
    Buyback,
    Earnings,
    Guidance,
    /// Presence confirmed but no single type cleared the type threshold.
    Mixed,
}

impl QuantitativeType {
    pub fn as_str(self) -> &'static str {
        match self {
            QuantitativeType::Dividend => "dividend",
            QuantitativeType::Acquisition => "acquisition",
            QuantitativeType::Buyback => "buyback",
            QuantitativeType::Earnings => "earnings",
            QuantitativeType::Guidance => "guidance",
            QuantitativeType::Mixed => "mixed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategicType {
    ExecutiveChanges,
    StrategicPartnership,
    ProductLaunch,
    MergerAgreement,
    Rebranding,
    ClinicalTrialResults,
    Mixed,
}

impl StrategicType {
    pub fn as_str(self) -> &'static str {
        match self {
            StrategicType::ExecutiveChanges => "executive_changes",
            StrategicType::StrategicPartnership => "strategic_partnership",
            StrategicType::ProductLaunch => "product_launch",
            StrategicType::MergerAgreement => "merger_agreement",
            StrategicType::Rebranding => "rebranding",
            StrategicType::ClinicalTrialResults => "clinical_trial_results",
            StrategicType::Mixed => "mixed",
        }
    }
}

// ----------- Detector results -----------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuantitativeCatalystResult {
    pub has_catalyst: bool,
    #[serde(rename = "type")]
    pub catalyst_type: Option<QuantitativeType>,
    pub values: Vec<String>,
    pub confidence: f64,
}

impl QuantitativeCatalystResult {
    pub fn none() -> Self {
        Self {
            has_catalyst: false,
            catalyst_type: None,
            values: Vec::new(),
            confidence: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategicCatalystResult {
    pub has_catalyst: bool,
    pub subtype: Option<StrategicType>,
    pub confidence: f64,
}

impl StrategicCatalystResult {
    pub fn none() -> Self {
        Self {
            has_catalyst: false,
            subtype: None,
            confidence: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutineResult {
    /// Semantic (or lexical, for the heuristic policy) routine confidence.
    pub routine_score: f64,
    pub detected_patterns: Vec<String>,
    pub transaction_value: Option<f64>,
    pub process_stage: ProcessStage,
    pub is_routine: bool,
    /// -2 strongly immaterial, -1 mildly immaterial, 0 material or no evidence.
    /// Only present when a ticker was supplied.
    pub materiality_score: Option<i8>,
    pub materiality_ratio: Option<f64>,
}

impl RoutineResult {
    pub fn none() -> Self {
        Self {
            routine_score: 0.0,
            detected_patterns: Vec::new(),
            transaction_value: None,
            process_stage: ProcessStage::Unknown,
            is_routine: false,
            materiality_score: None,
            materiality_ratio: None,
        }
    }
}

// ----------- Core classification results -----------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalCategory {
    Past,
    Present,
    Future,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemporalResult {
    pub category: TemporalCategory,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpinionResult {
    pub is_opinion: bool,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelevanceResult {
    pub is_relevant: bool,
    pub confidence: f64,
}

/// Everything the service knows about one headline.
#[derive(Debug, Clone, Serialize)]
pub struct HeadlineReport {
    pub headline: String,
    pub symbol: Option<String>,
    pub temporal: TemporalResult,
    pub opinion: OpinionResult,
    pub relevance: Option<RelevanceResult>,
    pub quantitative: QuantitativeCatalystResult,
    pub strategic: StrategicCatalystResult,
    pub routine: RoutineResult,
    pub forecast: ForecastResult,
    pub classified_at: DateTime<Utc>,
}
