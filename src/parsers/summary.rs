/// Parser for Istanbul / NYC `coverage-summary.json` (the `json-summary`
/// reporter).
///
/// The format is a JSON object keyed by file path, plus a `"total"` entry:
///   `{ "total": { "lines": { "total": 10, "covered": 6, "skipped": 0, "pct": 60 }, ... }, "/src/a.js": { ... } }`
///
/// Older Istanbul versions write `"pct": "Unknown"` when `total` is zero.
use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

use super::Parser;
use crate::error::Result;

/// Key of the aggregate entry in a summary report.
pub const TOTAL_KEY: &str = "total";

/// Arithmetic mean, 0.0 for no values.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// One metric row: `{ total, covered, skipped, pct }`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SummaryMetric {
    pub total: u64,
    pub covered: u64,
    #[serde(default)]
    pub skipped: u64,
    #[serde(deserialize_with = "deserialize_pct")]
    pub pct: f64,
}

/// The four metrics Istanbul reports per file.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct FileSummary {
    pub lines: SummaryMetric,
    pub statements: SummaryMetric,
    pub functions: SummaryMetric,
    pub branches: SummaryMetric,
}

/// A parsed summary report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryReport {
    pub total: Option<FileSummary>,
    pub files: BTreeMap<String, FileSummary>,
}

impl SummaryReport {
    /// Line coverage of the `total` entry, 0.0 without one.
    #[must_use]
    pub fn total_line_coverage(&self) -> f64 {
        self.total.map_or(0.0, |t| t.lines.pct)
    }

    /// Branch coverage of the `total` entry, 0.0 without one.
    #[must_use]
    pub fn total_branch_coverage(&self) -> f64 {
        self.total.map_or(0.0, |t| t.branches.pct)
    }

    /// Unweighted mean of the per-file line percentages.
    #[must_use]
    pub fn mean_line_coverage(&self) -> f64 {
        let pcts: Vec<f64> = self.files.values().map(|f| f.lines.pct).collect();
        mean(&pcts)
    }
}

pub struct SummaryParser;

impl Parser for SummaryParser {
    type Output = SummaryReport;

    fn parse(&self, input: &[u8]) -> Result<SummaryReport> {
        parse(input)
    }
}

/// Parse a summary report from raw bytes.
pub fn parse(input: &[u8]) -> Result<SummaryReport> {
    let mut entries: BTreeMap<String, FileSummary> = serde_json::from_slice(input)?;
    let total = entries.remove(TOTAL_KEY);
    log::debug!("parsed summary report with {} file(s)", entries.len());
    Ok(SummaryReport {
        total,
        files: entries,
    })
}

fn deserialize_pct<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Pct {
        Number(f64),
        Text(String),
    }

    match Pct::deserialize(deserializer)? {
        Pct::Number(n) => Ok(n),
        Pct::Text(s) if s == "Unknown" => Ok(0.0),
        Pct::Text(s) => Err(serde::de::Error::custom(format!("invalid pct '{s}'"))),
    }
}
