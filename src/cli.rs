//! Command handler functions for the covlens CLI.
//!
//! Each `cmd_*` function returns its output as a `String`, making them easy
//! to test without capturing stdout.

use std::fmt::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::classify::{LineIndex, LineVerdict};
use crate::detect::{detect_format, Format};
use crate::error::CovlensError;
use crate::model::percent;
use crate::parsers::summary::SummaryParser;
use crate::parsers::Parser;
use crate::report::CoverageReport;

fn load_report(report_path: &Path) -> Result<CoverageReport> {
    CoverageReport::load(report_path)
        .with_context(|| format!("Failed to load coverage report {}", report_path.display()))
}

pub fn cmd_files(report_path: &Path, sort_by_coverage: bool) -> Result<String> {
    let report = load_report(report_path)?;
    let mut records: Vec<_> = report.all_records().values().collect();

    if sort_by_coverage {
        records.sort_by(|a, b| a.statement_pct.total_cmp(&b.statement_pct));
    }

    let mut out = String::new();
    writeln!(
        out,
        "{:<60} {:>8} {:>8} {:>8}",
        "FILE", "STMTS", "BRANCH", "FUNCS"
    )
    .unwrap();
    writeln!(out, "{}", "-".repeat(87)).unwrap();

    for r in records {
        writeln!(
            out,
            "{:<60} {:>7.1}% {:>7.1}% {:>7.1}%",
            r.path, r.statement_pct, r.branch_pct, r.function_pct
        )
        .unwrap();
    }

    Ok(out)
}

pub fn cmd_lines(
    report_path: &Path,
    source_file: &str,
    line_count: Option<u32>,
    uncovered: bool,
) -> Result<String> {
    let report = load_report(report_path)?;
    let record = report
        .lookup(source_file)
        .with_context(|| format!("No coverage data for '{}'", source_file))?;

    let index = LineIndex::new(record);
    let line_count = line_count.or_else(|| index.last_line()).unwrap_or(0);
    if line_count == 0 {
        return Ok(format!("No instrumented lines in '{}'\n", source_file));
    }

    if uncovered {
        let uncovered_lines: Vec<u32> = (1..=line_count)
            .filter(|&line| index.verdict(line) == LineVerdict::Uncovered)
            .collect();

        if uncovered_lines.is_empty() {
            return Ok(format!("No uncovered lines in '{}'\n", source_file));
        }

        let mut out = String::new();
        writeln!(out, "Uncovered lines in '{}':", source_file).unwrap();
        writeln!(out, "  {}", format_line_ranges(&uncovered_lines)).unwrap();
        writeln!(out, "  ({} lines)", uncovered_lines.len()).unwrap();
        Ok(out)
    } else {
        let mut out = String::new();
        writeln!(out, "{:>6}  {:<10}", "LINE", "VERDICT").unwrap();
        writeln!(out, "{}", "-".repeat(20)).unwrap();
        for line in 1..=line_count {
            let verdict = index.verdict(line);
            let marker = match verdict {
                LineVerdict::Covered => "✓",
                LineVerdict::PartiallyCovered => "~",
                LineVerdict::Uncovered => "✗",
            };
            writeln!(out, "{:>6}  {:<10}  {}", line, verdict, marker).unwrap();
        }
        Ok(out)
    }
}

pub fn cmd_summary(report_path: &Path, format: Option<&str>) -> Result<String> {
    let content = std::fs::read(report_path)
        .with_context(|| format!("Failed to read {}", report_path.display()))?;

    let format = match format {
        Some(f) => f.parse::<Format>()?,
        None => detect_format(report_path, &content).ok_or(CovlensError::UnknownFormat)?,
    };

    let mut out = String::new();
    writeln!(out, "Report:     {}", report_path.display()).unwrap();
    writeln!(out, "Format:     {}", format).unwrap();

    match format {
        Format::Final => {
            let report = crate::parsers::istanbul::IstanbulParser.parse(&content)?;
            writeln!(out, "Files:      {}", report.len()).unwrap();
            write_counts(&mut out, "Statements", report.statement_counts());
            write_counts(&mut out, "Branches", report.branch_counts());
            write_counts(&mut out, "Functions", report.function_counts());
        }
        Format::Summary => {
            let summary = SummaryParser.parse(&content)?;
            writeln!(out, "Files:      {}", summary.files.len()).unwrap();
            match summary.total {
                Some(total) => {
                    let lines = total.lines;
                    write_metric(
                        &mut out,
                        "Lines",
                        lines.covered,
                        lines.total,
                        summary.total_line_coverage(),
                    );
                    for (label, metric) in [
                        ("Statements", total.statements),
                        ("Branches", total.branches),
                        ("Functions", total.functions),
                    ] {
                        write_metric(&mut out, label, metric.covered, metric.total, metric.pct);
                    }
                }
                None => {
                    writeln!(
                        out,
                        "Lines:      {:.1}% (mean of files)",
                        summary.mean_line_coverage()
                    )
                    .unwrap();
                }
            }
        }
    }

    Ok(out)
}

fn write_counts(out: &mut String, label: &str, (covered, total): (u64, u64)) {
    write_metric(out, label, covered, total, percent(covered, total));
}

fn write_metric(out: &mut String, label: &str, covered: u64, total: u64, pct: f64) {
    if total == 0 {
        return;
    }
    let label = format!("{label}:");
    writeln!(out, "{label:<12}{covered}/{total} ({pct:.1}%)").unwrap();
}

/// Collapse sorted line numbers into "1, 3-4, 9" style ranges.
pub fn format_line_ranges(lines: &[u32]) -> String {
    let mut ranges: Vec<String> = Vec::new();
    let mut iter = lines.iter().copied();
    let Some(first) = iter.next() else {
        return String::new();
    };

    let (mut start, mut end) = (first, first);
    for line in iter {
        if line == end + 1 {
            end = line;
            continue;
        }
        ranges.push(format_range(start, end));
        start = line;
        end = line;
    }
    ranges.push(format_range(start, end));

    ranges.join(", ")
}

fn format_range(start: u32, end: u32) -> String {
    if start == end {
        format!("{}", start)
    } else {
        format!("{}-{}", start, end)
    }
}
