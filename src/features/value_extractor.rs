//! value_extractor.rs
//!
//! Deterministic extraction of monetary amounts and percentages from headlines:
//!   - ranges ("between $50M and $100M") collapse to their midpoint
//!   - abbreviated magnitudes ($3.5B, €200m, $10K, $1.2bn, $40mln)
//!   - word magnitudes ($2 billion)
//!   - bare amounts ($1, $400,000), rendered per share when the text says so
//!   - percentages, only when the headline talks about a financial metric
//!
//! `$` and `€` are treated as the same currency.

use aho_corasick::AhoCorasick;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::Serialize;

/// How far past a bare amount "per share" may appear.
const PER_SHARE_LOOKAHEAD_CHARS: usize = 30;

/// Keywords that make percentages meaningful; without one of them a
/// percentage is usually a stock move ("Stock Up 10%").
const PERCENT_KEYWORDS: &[&str] = &[
    "dividend", "yield", "growth", "return", "margin", "beat", "miss", "eps", "earnings",
    "revenue", "guidance",
];

// A number, optionally with thousands separators and decimals.
const NUM: &str = r"(\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?)";
// Magnitude suffixes, longest first.
const UNIT: &str = r"(bn|mln|mn|[bmk])";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Money,
    PerShare,
    Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedValue {
    /// USD-equivalent magnitude, or the percentage number for `Percent`.
    pub amount: f64,
    pub kind: ValueKind,
    /// Canonical rendering, e.g. "$3.5B", "$37.50/Share", "10%".
    pub display: String,
    /// Byte offset in the source text.
    #[serde(skip)]
    pub start: usize,
}

pub struct ValueExtractor {
    re_range: Regex,
    re_abbrev: Regex,
    re_word: Regex,
    re_bare: Regex,
    re_percent: Regex,
    ac_percent_gate: AhoCorasick,
}

impl Default for ValueExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueExtractor {
    pub fn new() -> Self {
        lazy_static! {
            static ref RE_RANGE: Regex = Regex::new(&format!(
                r"(?i)\bbetween\s+[$€]\s?{NUM}\s?{UNIT}?\s+and\s+[$€]\s?{NUM}\s?{UNIT}?\b(\s*/\s*share\b)?"
            ))
            .unwrap();
            static ref RE_ABBREV: Regex =
                Regex::new(&format!(r"(?i)[$€]\s?{NUM}\s?{UNIT}\b")).unwrap();
            static ref RE_WORD: Regex =
                Regex::new(&format!(r"(?i)[$€]\s?{NUM}\s+(thousand|million|billion)\b")).unwrap();
            static ref RE_BARE: Regex =
                Regex::new(&format!(r"(?i)[$€]\s?{NUM}(\s*/\s*share\b)?")).unwrap();
            static ref RE_PERCENT: Regex = Regex::new(r"(\d+(?:\.\d+)?)\s?%").unwrap();
            static ref AC_PERCENT_GATE: AhoCorasick = AhoCorasick::builder()
                .ascii_case_insensitive(true)
                .build(PERCENT_KEYWORDS)
                .expect("failed to build AC for percent keywords");
        }

        Self {
            re_range: RE_RANGE.clone(),
            re_abbrev: RE_ABBREV.clone(),
            re_word: RE_WORD.clone(),
            re_bare: RE_BARE.clone(),
            re_percent: RE_PERCENT.clone(),
            ac_percent_gate: AC_PERCENT_GATE.clone(),
        }
    }

    /// All values in order of appearance.
    pub fn extract(&self, text: &str) -> Vec<ExtractedValue> {
        let mut claimed: Vec<(usize, usize)> = Vec::new();
        let mut out = Vec::new();

        // Ranges first so their endpoints are not reported on their own.
        for caps in self.re_range.captures_iter(text) {
            let Some(m) = caps.get(0) else { continue };
            let upper_unit = caps.get(4).map(|u| u.as_str());
            let lower_unit = caps.get(2).map(|u| u.as_str()).or(upper_unit);

            let (Some(lo), Some(hi)) = (
                scaled(caps.get(1).map(|c| c.as_str()), lower_unit),
                scaled(caps.get(3).map(|c| c.as_str()), upper_unit),
            ) else {
                continue;
            };

            let mid = (lo + hi) / 2.0;
            let per_share = caps.get(5).is_some() || per_share_follows(text, m.end());
            let (kind, display) = if per_share {
                (ValueKind::PerShare, format!("${:.2}/Share", mid))
            } else {
                (ValueKind::Money, format_magnitude(mid))
            };

            claimed.push((m.start(), m.end()));
            out.push(ExtractedValue {
                amount: mid,
                kind,
                display,
                start: m.start(),
            });
        }

        for re in [&self.re_abbrev, &self.re_word] {
            for caps in re.captures_iter(text) {
                let Some(m) = caps.get(0) else { continue };
                if overlaps(&claimed, m.start(), m.end()) {
                    continue;
                }
                let Some(amount) =
                    scaled(caps.get(1).map(|c| c.as_str()), caps.get(2).map(|c| c.as_str()))
                else {
                    continue;
                };

                claimed.push((m.start(), m.end()));
                out.push(ExtractedValue {
                    amount,
                    kind: ValueKind::Money,
                    display: format_magnitude(amount),
                    start: m.start(),
                });
            }
        }

        for caps in self.re_bare.captures_iter(text) {
            let Some(m) = caps.get(0) else { continue };
            if overlaps(&claimed, m.start(), m.end()) {
                continue;
            }
            if let Some(v) = self.bare_value(text, &caps) {
                claimed.push((m.start(), m.end()));
                out.push(v);
            }
        }

        if self.ac_percent_gate.is_match(text) {
            for caps in self.re_percent.captures_iter(text) {
                let Some(m) = caps.get(0) else { continue };
                let raw = &caps[1];
                if let Ok(v) = raw.parse::<f64>() {
                    out.push(ExtractedValue {
                        amount: v,
                        kind: ValueKind::Percent,
                        display: format!("{}%", raw),
                        start: m.start(),
                    });
                }
            }
        }

        out.sort_by_key(|v| v.start);
        out
    }

    /// Display strings only, in order of appearance.
    pub fn extract_display(&self, text: &str) -> Vec<String> {
        self.extract(text).into_iter().map(|v| v.display).collect()
    }

    fn bare_value(&self, text: &str, caps: &Captures) -> Option<ExtractedValue> {
        let m = caps.get(0)?;
        // "$1.2bln", "$5x": an unrecognized suffix, not a plain dollar amount
        if text[m.end()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_alphanumeric())
        {
            return None;
        }

        let raw = caps.get(1)?.as_str();
        let amount = parse_number(raw)?;
        let per_share = caps.get(2).is_some() || per_share_follows(text, m.end());

        let (kind, display) = if per_share {
            (ValueKind::PerShare, format!("${}/Share", raw))
        } else {
            (ValueKind::Money, format!("${}", raw))
        };

        Some(ExtractedValue {
            amount,
            kind,
            display,
            start: m.start(),
        })
    }
}

fn per_share_follows(text: &str, end: usize) -> bool {
    let after: String = text[end..]
        .chars()
        .take(PER_SHARE_LOOKAHEAD_CHARS)
        .collect();
    after.to_lowercase().contains("per share")
}

fn overlaps(claimed: &[(usize, usize)], start: usize, end: usize) -> bool {
    claimed.iter().any(|&(s, e)| start < e && s < end)
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse::<f64>().ok()
}

fn multiplier(unit: &str) -> f64 {
    match unit.to_ascii_lowercase().as_str() {
        "k" | "thousand" => 1e3,
        "m" | "mn" | "mln" | "million" => 1e6,
        "b" | "bn" | "billion" => 1e9,
        _ => 1.0,
    }
}

fn scaled(raw: Option<&str>, unit: Option<&str>) -> Option<f64> {
    let v = parse_number(raw?)?;
    Some(v * unit.map(multiplier).unwrap_or(1.0))
}

const MAGNITUDES: [(f64, &str); 4] = [(1e9, "B"), (1e6, "M"), (1e3, "K"), (1.0, "")];

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// "$3.5B", "$560.5M", "$75M", "$400K".
pub fn format_magnitude(amount: f64) -> String {
    let mut tier = MAGNITUDES
        .iter()
        .position(|&(unit, _)| amount >= unit)
        .unwrap_or(MAGNITUDES.len() - 1);
    let mut scaled = round2(amount / MAGNITUDES[tier].0);

    // 999.999M rounds to 1000M; step up to the next unit
    if tier > 0 && scaled >= 1000.0 {
        tier -= 1;
        scaled = round2(amount / MAGNITUDES[tier].0);
    }
    let suffix = MAGNITUDES[tier].1;

    let fixed = format!("{:.2}", scaled);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("${}{}", trimmed, suffix)
}
