//! Company-size-aware materiality.
//!
//! A transaction amount is compared with the company's balance sheet, falling
//! back to revenue and then market cap, so asset-heavy entities (banks, GSEs)
//! are judged against their assets rather than their revenue.

use std::collections::HashMap;
use std::fs;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Below this ratio a transaction is strongly immaterial (-2).
pub const STRONGLY_IMMATERIAL_RATIO: f64 = 0.005;
/// Below this ratio a transaction is mildly immaterial (-1).
pub const MILDLY_IMMATERIAL_RATIO: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompanyContext {
    #[serde(rename = "marketCap", default)]
    pub market_cap: f64,
    #[serde(rename = "annualRevenue", default)]
    pub annual_revenue: f64,
    #[serde(rename = "totalAssets", default)]
    pub total_assets: f64,
}

impl CompanyContext {
    pub fn new(market_cap: f64, annual_revenue: f64, total_assets: f64) -> Self {
        Self {
            market_cap,
            annual_revenue,
            total_assets,
        }
    }

    /// Denominator for the materiality ratio: assets, then revenue, then market cap.
    pub fn size_metric(&self) -> f64 {
        if self.total_assets > 0.0 {
            self.total_assets
        } else if self.annual_revenue > 0.0 {
            self.annual_revenue
        } else {
            self.market_cap
        }
    }
}

/// Static ticker -> financial profile lookup, read-only once built.
#[derive(Debug, Clone, Default)]
pub struct CompanyTable {
    companies: HashMap<String, CompanyContext>,
}

impl CompanyTable {
    /// Small built-in table of well-known issuers (USD, approximate).
    pub fn builtin() -> Self {
        let mut companies = HashMap::new();

        // GSEs and banks: balance sheet dwarfs revenue
        companies.insert("FNMA".into(), CompanyContext::new(10e9, 30e9, 4.3e12));
        companies.insert("FMCC".into(), CompanyContext::new(8e9, 23e9, 3.3e12));
        companies.insert("JPM".into(), CompanyContext::new(680e9, 160e9, 4.0e12));
        companies.insert("BAC".into(), CompanyContext::new(330e9, 100e9, 3.3e12));
        companies.insert("WFC".into(), CompanyContext::new(250e9, 82e9, 1.9e12));

        // Large caps
        companies.insert("AAPL".into(), CompanyContext::new(3.5e12, 391e9, 365e9));
        companies.insert("MSFT".into(), CompanyContext::new(3.1e12, 245e9, 512e9));
        companies.insert("AMZN".into(), CompanyContext::new(2.2e12, 638e9, 625e9));
        companies.insert("T".into(), CompanyContext::new(190e9, 122e9, 395e9));
        companies.insert("VZ".into(), CompanyContext::new(180e9, 135e9, 385e9));
        companies.insert("TMUS".into(), CompanyContext::new(260e9, 81e9, 208e9));
        companies.insert("PFE".into(), CompanyContext::new(145e9, 63e9, 213e9));

        // Mid / small caps
        companies.insert("SATS".into(), CompanyContext::new(8e9, 15.8e9, 57e9));
        companies.insert("GSAT".into(), CompanyContext::new(3.5e9, 0.25e9, 1.0e9));
        companies.insert("INDP".into(), CompanyContext::new(15e6, 0.0, 20e6));

        Self { companies }
    }

    /// Parse `{"TICKER": {"marketCap": .., "annualRevenue": .., "totalAssets": ..}}`.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let parsed: HashMap<String, CompanyContext> =
            serde_json::from_str(raw).context("parsing company table")?;

        let companies = parsed
            .into_iter()
            .map(|(ticker, ctx)| (ticker.trim().to_ascii_uppercase(), ctx))
            .collect();
        Ok(Self { companies })
    }

    /// Built-in table, with entries from `path` (if non-empty) replacing or adding tickers.
    pub fn load(path: &str) -> Result<Self> {
        let mut table = Self::builtin();
        if path.is_empty() {
            return Ok(table);
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading company table {}", path))?;
        let extra = Self::from_json_str(&raw)?;
        info!("Loaded {} companies from {}", extra.len(), path);

        table.companies.extend(extra.companies);
        Ok(table)
    }

    pub fn get(&self, symbol: &str) -> Option<&CompanyContext> {
        self.companies.get(&symbol.trim().to_ascii_uppercase())
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Materiality {
    pub score: i8,
    pub ratio: Option<f64>,
}

impl Materiality {
    /// Ticker supplied but nothing to measure.
    pub fn no_evidence() -> Self {
        Self {
            score: 0,
            ratio: None,
        }
    }
}

pub fn score_for_ratio(ratio: f64) -> i8 {
    if ratio < STRONGLY_IMMATERIAL_RATIO {
        -2
    } else if ratio < MILDLY_IMMATERIAL_RATIO {
        -1
    } else {
        0
    }
}

/// `None` when no ticker was supplied; neutral when the ticker is unknown, no
/// amount was extracted, or the company has no usable size metric.
pub fn assess(table: &CompanyTable, symbol: Option<&str>, amount: Option<f64>) -> Option<Materiality> {
    let symbol = symbol.map(str::trim).filter(|s| !s.is_empty())?;

    let (Some(ctx), Some(amount)) = (table.get(symbol), amount) else {
        return Some(Materiality::no_evidence());
    };

    let metric = ctx.size_metric();
    if metric <= 0.0 {
        return Some(Materiality::no_evidence());
    }

    let ratio = amount / metric;
    Some(Materiality {
        score: score_for_ratio(ratio),
        ratio: Some(ratio),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_metric_priority() {
        assert_eq!(CompanyContext::new(1.0, 2.0, 3.0).size_metric(), 3.0);
        assert_eq!(CompanyContext::new(1.0, 2.0, 0.0).size_metric(), 2.0);
        assert_eq!(CompanyContext::new(1.0, 0.0, 0.0).size_metric(), 1.0);
    }

    #[test]
    fn test_score_for_ratio_bands() {
        assert_eq!(score_for_ratio(0.0001), -2);
        assert_eq!(score_for_ratio(0.005), -1);
        assert_eq!(score_for_ratio(0.049), -1);
        assert_eq!(score_for_ratio(0.05), 0);
        assert_eq!(score_for_ratio(0.4), 0);
    }

    #[test]
    fn test_fnma_judged_against_assets() {
        let table = CompanyTable::builtin();
        let m = assess(&table, Some("fnma"), Some(560.5e6)).unwrap();
        assert_eq!(m.score, -2);
        assert!(m.ratio.unwrap() < 0.001);
    }

    #[test]
    fn test_no_ticker_no_assessment() {
        let table = CompanyTable::builtin();
        assert_eq!(assess(&table, None, Some(1e9)), None);
        assert_eq!(assess(&table, Some("  "), Some(1e9)), None);
    }

    #[test]
    fn test_missing_data_is_neutral() {
        let table = CompanyTable::builtin();
        assert_eq!(
            assess(&table, Some("ZZZZ"), Some(1e9)),
            Some(Materiality::no_evidence())
        );
        assert_eq!(
            assess(&table, Some("AAPL"), None),
            Some(Materiality::no_evidence())
        );
    }

    #[test]
    fn test_json_table_merge() {
        let extra = CompanyTable::from_json_str(
            r#"{" acme ": {"marketCap": 1e9, "annualRevenue": 5e8, "totalAssets": 0}}"#,
        )
        .unwrap();
        let ctx = extra.get("ACME").unwrap();
        assert_eq!(ctx.size_metric(), 5e8);
        assert_eq!(extra.len(), 1);
    }

    #[test]
    fn test_load_without_path_is_builtin() {
        let table = CompanyTable::load("").unwrap();
        assert!(table.get("FNMA").is_some());
        assert!(!table.is_empty());
    }
}
