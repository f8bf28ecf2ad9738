/// Auto-detection of Istanbul report kinds.
///
/// Strategy:
///   1. Check the file name for the reporters' default output names
///   2. Peek at the first bytes of the file content
///   3. Fall back to CLI --format override (handled by caller)
use std::path::Path;

use crate::error::CovlensError;
use crate::parsers::sniff_head;

/// Supported report kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `coverage-final.json` from the `json` reporter.
    Final,
    /// `coverage-summary.json` from the `json-summary` reporter.
    Summary,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Final => "final",
            Format::Summary => "summary",
        }
    }
}

impl std::str::FromStr for Format {
    type Err = CovlensError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "final" => Ok(Format::Final),
            "summary" => Ok(Format::Summary),
            _ => Err(CovlensError::Parse(format!(
                "Unknown format: '{}'. Supported: final, summary",
                s
            ))),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detect the report kind from file name and content.
pub fn detect_format(path: &Path, content: &[u8]) -> Option<Format> {
    if let Some(fmt) = detect_by_name(path) {
        return Some(fmt);
    }
    detect_by_content(content)
}

fn detect_by_name(path: &Path) -> Option<Format> {
    let name = path.file_name()?.to_str()?.to_lowercase();
    match name.as_str() {
        "coverage-final.json" => Some(Format::Final),
        "coverage-summary.json" => Some(Format::Summary),
        _ => None,
    }
}

fn detect_by_content(content: &[u8]) -> Option<Format> {
    let head = sniff_head(content);
    let trimmed = head.trim_start();
    if !trimmed.starts_with('{') {
        return None;
    }

    // "s" alone is too generic, so require both metadata tables.
    if trimmed.contains("\"statementMap\"") && trimmed.contains("\"fnMap\"") {
        return Some(Format::Final);
    }
    if trimmed.contains("\"lines\"") && trimmed.contains("\"pct\"") {
        return Some(Format::Summary);
    }

    None
}
