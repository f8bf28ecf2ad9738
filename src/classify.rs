//! Per-line coverage verdicts.
//!
//! Each statement, function and branch is attributed to exactly one source
//! line through its metadata entry:
//!
//!   - statement → `statement_locations[i].start.line`
//!   - function  → `function_metas[i].line`
//!   - branch    → `branch_metas[i].line`
//!
//! Hit counts are joined to metadata by index. The hit tables are never
//! indexed by line number: statement `4` says nothing about line 4.

use std::collections::BTreeMap;
use std::fmt;

use crate::model::FileCoverageRecord;

/// Classification of one source line.
///
/// A line with no instrumentation at all (a comment, a closing brace) is
/// reported as `Uncovered`: the report cannot tell "never executed" apart
/// from "not instrumented".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineVerdict {
    /// A statement or function attributed to the line ran at least once.
    Covered,
    /// Only branch data is positive: at least one arm attributed to the line
    /// was taken. Branch data alone never makes a line `Covered`.
    PartiallyCovered,
    /// Nothing attributed to the line has a non-zero count.
    Uncovered,
}

impl LineVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineVerdict::Covered => "covered",
            LineVerdict::PartiallyCovered => "partial",
            LineVerdict::Uncovered => "uncovered",
        }
    }
}

impl fmt::Display for LineVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Classify a single line. Never fails; line 0 or a line past the end of
/// the file is `Uncovered`.
#[must_use]
pub fn classify(record: &FileCoverageRecord, line: u32) -> LineVerdict {
    if line == 0 {
        return LineVerdict::Uncovered;
    }

    let statement_hit = record.statement_locations.iter().any(|(idx, loc)| {
        loc.start.line == line && hit_count(&record.statement_hits, idx) > 0
    });
    let function_hit = record.function_metas.iter().any(|(idx, meta)| {
        meta.line == line && hit_count(&record.function_hits, idx) > 0
    });
    if statement_hit || function_hit {
        return LineVerdict::Covered;
    }

    let arm_taken = record.branch_metas.iter().any(|(idx, meta)| {
        meta.line == line && arms_taken(&record.branch_hits, idx)
    });
    if arm_taken {
        LineVerdict::PartiallyCovered
    } else {
        LineVerdict::Uncovered
    }
}

/// Verdicts for lines `1..=line_count`, in order.
#[must_use]
pub fn classify_lines(record: &FileCoverageRecord, line_count: u32) -> Vec<LineVerdict> {
    let index = LineIndex::new(record);
    (1..=line_count).map(|line| index.verdict(line)).collect()
}

fn hit_count(hits: &BTreeMap<u32, u64>, idx: &u32) -> u64 {
    hits.get(idx).copied().unwrap_or(0)
}

fn arms_taken(hits: &BTreeMap<u32, Vec<u64>>, idx: &u32) -> bool {
    hits.get(idx).is_some_and(|arms| arms.iter().any(|&count| count > 0))
}

/// What the report says about one line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct LineSignals {
    executed: bool,
    arm_taken: bool,
}

impl LineSignals {
    fn verdict(self) -> LineVerdict {
        if self.executed {
            LineVerdict::Covered
        } else if self.arm_taken {
            LineVerdict::PartiallyCovered
        } else {
            LineVerdict::Uncovered
        }
    }
}

/// Line attribution for one record, built in a single pass so a whole file
/// can be classified without rescanning every table per line.
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    lines: BTreeMap<u32, LineSignals>,
}

impl LineIndex {
    #[must_use]
    pub fn new(record: &FileCoverageRecord) -> Self {
        let mut lines: BTreeMap<u32, LineSignals> = BTreeMap::new();

        for (idx, loc) in &record.statement_locations {
            lines.entry(loc.start.line).or_default().executed |=
                hit_count(&record.statement_hits, idx) > 0;
        }
        for (idx, meta) in &record.function_metas {
            lines.entry(meta.line).or_default().executed |=
                hit_count(&record.function_hits, idx) > 0;
        }
        for (idx, meta) in &record.branch_metas {
            lines.entry(meta.line).or_default().arm_taken |=
                arms_taken(&record.branch_hits, idx);
        }

        // Line 0 is never a valid source line.
        lines.remove(&0);

        Self { lines }
    }

    #[must_use]
    pub fn verdict(&self, line: u32) -> LineVerdict {
        self.lines
            .get(&line)
            .map_or(LineVerdict::Uncovered, |signals| signals.verdict())
    }

    /// Lines with at least one statement, function or branch attributed.
    pub fn instrumented_lines(&self) -> impl Iterator<Item = u32> + '_ {
        self.lines.keys().copied()
    }

    /// The highest attributed line, if any.
    #[must_use]
    pub fn last_line(&self) -> Option<u32> {
        self.lines.keys().next_back().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BranchMeta, FunctionMeta, Location, Position};

    fn loc(line: u32) -> Location {
        Location {
            start: Position { line, column: 0 },
            end: Position { line, column: 10 },
        }
    }

    fn empty_record() -> FileCoverageRecord {
        FileCoverageRecord {
            path: "a.js".to_string(),
            schema_version: None,
            content_hash: None,
            statement_locations: BTreeMap::new(),
            statement_hits: BTreeMap::new(),
            function_metas: BTreeMap::new(),
            function_hits: BTreeMap::new(),
            branch_metas: BTreeMap::new(),
            branch_hits: BTreeMap::new(),
            statement_pct: 0.0,
            function_pct: 0.0,
            branch_pct: 0.0,
        }
    }

    fn with_statement(
        mut record: FileCoverageRecord,
        idx: u32,
        line: u32,
        count: u64,
    ) -> FileCoverageRecord {
        record.statement_locations.insert(idx, loc(line));
        record.statement_hits.insert(idx, count);
        record
    }

    fn with_function(
        mut record: FileCoverageRecord,
        idx: u32,
        line: u32,
        count: u64,
    ) -> FileCoverageRecord {
        record.function_metas.insert(
            idx,
            FunctionMeta {
                name: format!("fn{idx}"),
                declaration: loc(line),
                body: loc(line),
                line,
            },
        );
        record.function_hits.insert(idx, count);
        record
    }

    fn with_branch(
        mut record: FileCoverageRecord,
        idx: u32,
        line: u32,
        arms: &[u64],
    ) -> FileCoverageRecord {
        record.branch_metas.insert(
            idx,
            BranchMeta {
                kind: "if".to_string(),
                location: loc(line),
                arms: arms.iter().map(|_| loc(line)).collect(),
                line,
            },
        );
        record.branch_hits.insert(idx, arms.to_vec());
        record
    }

    /// Both classification paths must agree.
    fn verdict(record: &FileCoverageRecord, line: u32) -> LineVerdict {
        let direct = classify(record, line);
        assert_eq!(direct, LineIndex::new(record).verdict(line));
        direct
    }

    #[test]
    fn test_statement_hit_is_covered() {
        let record = with_statement(empty_record(), 0, 5, 1);
        assert_eq!(verdict(&record, 5), LineVerdict::Covered);
        assert_eq!(verdict(&record, 6), LineVerdict::Uncovered);
    }

    #[test]
    fn test_statement_outranks_branch() {
        let record = with_branch(with_statement(empty_record(), 0, 7, 3), 0, 7, &[3, 0]);
        assert_eq!(verdict(&record, 7), LineVerdict::Covered);
    }

    #[test]
    fn test_function_hit_is_covered() {
        let record = with_function(empty_record(), 0, 12, 2);
        assert_eq!(verdict(&record, 12), LineVerdict::Covered);
    }

    #[test]
    fn test_branch_arms() {
        let none = with_branch(empty_record(), 0, 3, &[0, 0]);
        assert_eq!(verdict(&none, 3), LineVerdict::Uncovered);

        let one = with_branch(empty_record(), 0, 3, &[5, 0]);
        assert_eq!(verdict(&one, 3), LineVerdict::PartiallyCovered);

        // Every arm taken is still only partial without a statement hit.
        let all = with_branch(empty_record(), 0, 3, &[5, 5]);
        assert_eq!(verdict(&all, 3), LineVerdict::PartiallyCovered);
    }

    #[test]
    fn test_zero_hits_everywhere_is_uncovered() {
        let record = with_branch(
            with_function(with_statement(empty_record(), 0, 9, 0), 0, 9, 0),
            0,
            9,
            &[0, 0, 0],
        );
        assert_eq!(verdict(&record, 9), LineVerdict::Uncovered);
    }

    #[test]
    fn test_any_statement_on_line_is_enough() {
        let record = with_statement(with_statement(empty_record(), 0, 4, 0), 1, 4, 2);
        assert_eq!(verdict(&record, 4), LineVerdict::Covered);
    }

    #[test]
    fn test_index_is_not_line_number() {
        // Statement 4 sits on line 1; statement 1 sits on line 4 and never ran.
        let record = with_statement(with_statement(empty_record(), 4, 1, 9), 1, 4, 0);
        assert_eq!(verdict(&record, 1), LineVerdict::Covered);
        assert_eq!(verdict(&record, 4), LineVerdict::Uncovered);
    }

    #[test]
    fn test_missing_hits_or_metadata() {
        let mut record = empty_record();
        // Location without a hit entry.
        record.statement_locations.insert(0, loc(2));
        // Hit entry without a location.
        record.statement_hits.insert(1, 7);
        // Branch meta without counts.
        record = {
            let mut r = with_branch(record, 0, 3, &[1]);
            r.branch_hits.clear();
            r
        };
        for line in 1..=10 {
            assert_eq!(verdict(&record, line), LineVerdict::Uncovered);
        }
    }

    #[test]
    fn test_out_of_range_lines() {
        let record = with_statement(empty_record(), 0, 1, 1);
        assert_eq!(verdict(&record, 0), LineVerdict::Uncovered);
        assert_eq!(verdict(&record, u32::MAX), LineVerdict::Uncovered);
    }

    #[test]
    fn test_line_zero_metadata_never_matches() {
        let record = with_statement(empty_record(), 0, 0, 4);
        assert_eq!(verdict(&record, 0), LineVerdict::Uncovered);
        assert_eq!(LineIndex::new(&record).last_line(), None);
    }

    #[test]
    fn test_classify_lines() {
        let record = with_branch(
            with_function(with_statement(empty_record(), 0, 1, 1), 0, 2, 0),
            0,
            3,
            &[1, 0],
        );
        assert_eq!(
            classify_lines(&record, 4),
            vec![
                LineVerdict::Covered,
                LineVerdict::Uncovered,
                LineVerdict::PartiallyCovered,
                LineVerdict::Uncovered,
            ]
        );
        assert!(classify_lines(&record, 0).is_empty());
    }

    #[test]
    fn test_line_index_bounds() {
        let record = with_branch(with_statement(empty_record(), 0, 8, 1), 0, 3, &[0]);
        let index = LineIndex::new(&record);
        assert_eq!(index.instrumented_lines().collect::<Vec<_>>(), vec![3, 8]);
        assert_eq!(index.last_line(), Some(8));
        assert_eq!(LineIndex::new(&empty_record()).last_line(), None);
    }

    #[test]
    fn test_verdict_display() {
        assert_eq!(LineVerdict::Covered.to_string(), "covered");
        assert_eq!(LineVerdict::PartiallyCovered.to_string(), "partial");
        assert_eq!(LineVerdict::Uncovered.to_string(), "uncovered");
    }
}
