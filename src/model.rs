//! Typed in-memory representation of an Istanbul `coverage-final.json`
//! report. Every value here is built once by the parser and never mutated
//! afterwards.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Compute a coverage rate, returning 0.0 when the total is zero.
#[must_use]
pub fn rate(covered: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        covered as f64 / total as f64
    }
}

/// Same as [`rate`], scaled to 0–100.
#[must_use]
pub fn percent(covered: u64, total: u64) -> f64 {
    rate(covered, total) * 100.0
}

/// A point in source text. Lines are 1-based, columns 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

/// A span between two positions. `end` is not guaranteed to follow `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Location {
    pub start: Position,
    pub end: Position,
}

/// One statically declared function or method (`fnMap` entry).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FunctionMeta {
    pub name: String,
    /// Span of the declaration (name and signature).
    #[serde(rename = "decl")]
    pub declaration: Location,
    /// Span of the whole body.
    #[serde(rename = "loc")]
    pub body: Location,
    pub line: u32,
}

/// One branching construct (`branchMap` entry).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BranchMeta {
    /// "if", "switch", "binary-expr", "cond-expr", "default-arg", ...
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "loc")]
    pub location: Location,
    /// One location per arm, in the same order as the `b` counts.
    #[serde(rename = "locations")]
    pub arms: Vec<Location>,
    pub line: u32,
}

/// Coverage data for a single instrumented file.
///
/// Statements, functions and branches each use their own index space.
/// A hit count with no matching metadata entry (or the reverse) is simply
/// "no data" for that index.
#[derive(Debug, Clone, PartialEq)]
pub struct FileCoverageRecord {
    pub path: String,
    pub schema_version: Option<String>,
    pub content_hash: Option<String>,

    pub statement_locations: BTreeMap<u32, Location>,
    pub statement_hits: BTreeMap<u32, u64>,

    pub function_metas: BTreeMap<u32, FunctionMeta>,
    pub function_hits: BTreeMap<u32, u64>,

    pub branch_metas: BTreeMap<u32, BranchMeta>,
    /// One count per arm of the matching `BranchMeta`.
    pub branch_hits: BTreeMap<u32, Vec<u64>>,

    /// Share of statements executed at least once, 0–100.
    pub statement_pct: f64,
    /// Share of functions executed at least once, 0–100.
    pub function_pct: f64,
    /// Share of branch arms taken at least once, 0–100.
    pub branch_pct: f64,
}

impl FileCoverageRecord {
    /// `(covered, total)` over the statement hit table.
    #[must_use]
    pub fn statement_counts(&self) -> (u64, u64) {
        covered_of(self.statement_hits.values().copied())
    }

    /// `(covered, total)` over the function hit table.
    #[must_use]
    pub fn function_counts(&self) -> (u64, u64) {
        covered_of(self.function_hits.values().copied())
    }

    /// `(covered, total)` over every arm of every branch.
    #[must_use]
    pub fn branch_counts(&self) -> (u64, u64) {
        covered_of(self.branch_hits.values().flatten().copied())
    }
}

fn covered_of(counts: impl Iterator<Item = u64>) -> (u64, u64) {
    counts.fold((0, 0), |(covered, total), count| {
        (covered + u64::from(count > 0), total + 1)
    })
}
