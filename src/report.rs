//! Read-only query facade over a parsed coverage report.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use crate::error::Result;
use crate::model::FileCoverageRecord;
use crate::parsers::istanbul;

/// One parsed `coverage-final.json`: file path → coverage record.
///
/// There is no mutation API. To pick up a rewritten report, parse it again
/// and swap the old value for the new one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverageReport {
    files: BTreeMap<String, FileCoverageRecord>,
}

impl CoverageReport {
    pub(crate) fn from_records(files: BTreeMap<String, FileCoverageRecord>) -> Self {
        Self { files }
    }

    /// Read and parse the report at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read(path)?;
        let report = istanbul::parse(&content)?;
        log::debug!(
            "loaded {} file record(s) from {}",
            report.len(),
            path.display()
        );
        Ok(report)
    }

    /// Parse a report from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        istanbul::parse_reader(reader)
    }

    /// The record for `path`, matched exactly as written in the report.
    /// No separator or case normalization is applied.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&FileCoverageRecord> {
        self.files.get(path)
    }

    /// Every record, ordered by path.
    #[must_use]
    pub fn all_records(&self) -> &BTreeMap<String, FileCoverageRecord> {
        &self.files
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// `(covered, total)` statements across every file.
    #[must_use]
    pub fn statement_counts(&self) -> (u64, u64) {
        self.sum_counts(FileCoverageRecord::statement_counts)
    }

    /// `(covered, total)` functions across every file.
    #[must_use]
    pub fn function_counts(&self) -> (u64, u64) {
        self.sum_counts(FileCoverageRecord::function_counts)
    }

    /// `(covered, total)` branch arms across every file.
    #[must_use]
    pub fn branch_counts(&self) -> (u64, u64) {
        self.sum_counts(FileCoverageRecord::branch_counts)
    }

    fn sum_counts(&self, counts: impl Fn(&FileCoverageRecord) -> (u64, u64)) -> (u64, u64) {
        self.files.values().map(counts).fold((0, 0), |acc, (c, t)| (acc.0 + c, acc.1 + t))
    }
}
