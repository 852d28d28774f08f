//! Batch input: one headline per line, optionally suffixed with `|TICKER`.

use std::io::BufRead;

use anyhow::{Context, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    pub headline: String,
    pub symbol: Option<String>,
}

impl BatchItem {
    pub fn new(headline: &str, symbol: Option<&str>) -> Self {
        Self {
            headline: headline.to_string(),
            symbol: symbol.map(str::to_string),
        }
    }

    /// `None` for blank lines and `#` comments. A ticker on the line wins over
    /// `default_symbol`.
    pub fn parse_line(line: &str, default_symbol: Option<&str>) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let (headline, symbol) = match line.rsplit_once('|') {
            Some((h, s)) => (h.trim(), Some(s.trim()).filter(|s| !s.is_empty())),
            None => (line, None),
        };
        if headline.is_empty() {
            return None;
        }

        Some(Self::new(headline, symbol.or(default_symbol)))
    }
}

pub fn read_items(reader: impl BufRead, default_symbol: Option<&str>) -> Result<Vec<BatchItem>> {
    let mut items = Vec::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading input line {}", n + 1))?;
        if let Some(item) = BatchItem::parse_line(&line, default_symbol) {
            items.push(item);
        }
    }
    Ok(items)
}
