//! patterns.rs
//!
//! Lexical signal sets matched over normalized headline text:
//!   - process stage (begins / continues / completes)
//!   - frequency and recurrence ("quarterly", "regular")
//!   - routine corporate events (dividend declarations, filings, meetings)
//!   - conditional / hedging and forward-looking language
//!   - superlative and "special" override language
//!   - transaction and financial-result keywords
//!
//! Every set is an Aho-Corasick automaton; matches must sit on word boundaries.

use aho_corasick::{AhoCorasick, MatchKind};
use lazy_static::lazy_static;
use serde::Serialize;

use crate::core::types::ProcessStage;
use crate::features::normalizers::normalize_for_matching;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    StageEarly,
    StageOngoing,
    StageCompleted,
    Frequency,
    RoutineEvent,
    Hedging,
    ForwardLooking,
    Superlative,
    Special,
    Transaction,
    FinancialResult,
}

impl SignalKind {
    pub fn prefix(self) -> &'static str {
        match self {
            SignalKind::StageEarly | SignalKind::StageOngoing | SignalKind::StageCompleted => {
                "stage"
            }
            SignalKind::Frequency => "frequency",
            SignalKind::RoutineEvent => "routine_event",
            SignalKind::Hedging => "hedging",
            SignalKind::ForwardLooking => "forward_looking",
            SignalKind::Superlative => "superlative",
            SignalKind::Special => "special",
            SignalKind::Transaction => "transaction",
            SignalKind::FinancialResult => "financial_result",
        }
    }
}

const STAGE_EARLY: &[&str] = &[
    "begins", "begin", "starts", "start", "initiates", "initiate", "commences", "kicks off",
];
const STAGE_ONGOING: &[&str] = &[
    "continues", "continue", "continuing", "ongoing", "progresses", "underway", "in progress",
];
const STAGE_COMPLETED: &[&str] = &[
    "completes", "completed", "complete", "closes", "closed", "finalizes", "finalized",
    "concludes",
];
const FREQUENCY: &[&str] = &[
    "quarterly", "annual", "annually", "monthly", "weekly", "semi-annual", "semiannual",
    "regular", "recurring", "routine", "scheduled", "periodic", "customary",
];
const ROUTINE_EVENT: &[&str] = &[
    "dividend", "declares", "annual meeting", "shareholder meeting", "board meeting", "files",
    "filing", "10-k", "10-q", "8-k", "conference call", "investor day", "distribution",
    "presentation",
];
const HEDGING: &[&str] = &[
    "may", "might", "could", "considering", "considers", "exploring", "explores", "reportedly",
    "in talks", "potential", "possible", "plans to", "weighs", "mulls", "rumored", "said to",
];
const FORWARD_LOOKING: &[&str] = &[
    "expects", "expected", "forecasts", "forecast", "sees", "guides", "outlook", "projects",
    "targets", "will", "anticipates", "plans",
];
// "record" alone would hit "holders of record" on every dividend notice.
const SUPERLATIVE: &[&str] = &[
    "record high", "record highs", "record quarter", "record quarterly", "record year",
    "record annual", "record revenue", "record revenues", "record earnings", "record profit",
    "record sales", "record results", "record payout", "record-breaking", "all-time high",
    "largest", "biggest", "first-ever", "first ever", "historic", "unprecedented",
    "all-time", "transformational", "landmark",
];
const SPECIAL: &[&str] = &["special"];
const TRANSACTION: &[&str] = &[
    "acquire", "acquires", "acquisition", "merger", "merge", "buyback", "repurchase", "divest",
    "divests", "divestiture", "sells", "sale", "offering", "spin-off", "spinoff",
    "tender offer", "stake",
];
const FINANCIAL_RESULT: &[&str] = &[
    "earnings", "revenue", "revenues", "eps", "net income", "net loss", "profit",
    "quarterly results", "financial results", "guidance", "dividend", "buyback",
    "share repurchase",
];

struct PatternSet {
    kind: SignalKind,
    ac: AhoCorasick,
    phrases: &'static [&'static str],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    pub kind: SignalKind,
    pub tag: &'static str,
    /// Byte offset in the normalized text.
    pub start: usize,
}

/// Matches of one headline, in order of appearance within each kind.
#[derive(Debug, Clone, Default)]
pub struct Signals {
    matches: Vec<PatternMatch>,
}

impl Signals {
    pub fn has(&self, kind: SignalKind) -> bool {
        self.matches.iter().any(|m| m.kind == kind)
    }

    pub fn count(&self, kind: SignalKind) -> usize {
        self.matches.iter().filter(|m| m.kind == kind).count()
    }

    pub fn tags(&self, kind: SignalKind) -> Vec<&'static str> {
        self.matches
            .iter()
            .filter(|m| m.kind == kind)
            .map(|m| m.tag)
            .collect()
    }

    /// "kind:tag" labels for the requested kinds, ordered by position in text.
    pub fn labels(&self, kinds: &[SignalKind]) -> Vec<String> {
        let mut picked: Vec<&PatternMatch> = self
            .matches
            .iter()
            .filter(|m| kinds.contains(&m.kind))
            .collect();
        picked.sort_by_key(|m| m.start);
        picked
            .into_iter()
            .map(|m| format!("{}:{}", m.kind.prefix(), m.tag))
            .collect()
    }

    pub fn process_stage(&self) -> ProcessStage {
        if self.has(SignalKind::StageEarly) {
            ProcessStage::Early
        } else if self.has(SignalKind::StageOngoing) {
            ProcessStage::Ongoing
        } else if self.has(SignalKind::StageCompleted) {
            ProcessStage::Completed
        } else {
            ProcessStage::Unknown
        }
    }
}

pub struct PatternLibrary {
    sets: Vec<PatternSet>,
}

impl Default for PatternLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternLibrary {
    pub fn new() -> Self {
        let sets = [
            (SignalKind::StageEarly, STAGE_EARLY),
            (SignalKind::StageOngoing, STAGE_ONGOING),
            (SignalKind::StageCompleted, STAGE_COMPLETED),
            (SignalKind::Frequency, FREQUENCY),
            (SignalKind::RoutineEvent, ROUTINE_EVENT),
            (SignalKind::Hedging, HEDGING),
            (SignalKind::ForwardLooking, FORWARD_LOOKING),
            (SignalKind::Superlative, SUPERLATIVE),
            (SignalKind::Special, SPECIAL),
            (SignalKind::Transaction, TRANSACTION),
            (SignalKind::FinancialResult, FINANCIAL_RESULT),
        ]
        .into_iter()
        .map(|(kind, phrases)| PatternSet {
            kind,
            ac: build_automaton(phrases),
            phrases,
        })
        .collect();

        Self { sets }
    }

    /// Shared instance; the automata are immutable once built.
    pub fn shared() -> &'static PatternLibrary {
        lazy_static! {
            static ref LIBRARY: PatternLibrary = PatternLibrary::new();
        }
        &LIBRARY
    }

    pub fn scan(&self, text: &str) -> Signals {
        let normalized = normalize_for_matching(text);
        let bytes = normalized.as_bytes();
        let mut matches = Vec::new();

        for set in &self.sets {
            for m in set.ac.find_iter(&normalized) {
                if !on_word_boundary(bytes, m.start(), m.end()) {
                    continue;
                }
                matches.push(PatternMatch {
                    kind: set.kind,
                    tag: set.phrases[m.pattern().as_usize()],
                    start: m.start(),
                });
            }
        }

        Signals { matches }
    }
}

fn build_automaton(phrases: &[&str]) -> AhoCorasick {
    AhoCorasick::builder()
        .match_kind(MatchKind::LeftmostLongest)
        .build(phrases)
        .expect("failed to build AC for signal patterns")
}

fn on_word_boundary(bytes: &[u8], start: usize, end: usize) -> bool {
    let before = start == 0 || !bytes[start - 1].is_ascii_alphanumeric();
    let after = end == bytes.len() || !bytes[end].is_ascii_alphanumeric();
    before && after
}
