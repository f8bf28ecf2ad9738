/// Parser for Istanbul / NYC `coverage-final.json` format.
///
/// Reference: https://github.com/istanbuljs/istanbuljs
///
/// The format is a JSON object keyed by file path. Each value contains:
///   - `statementMap`: `{ "0": { "start": { "line": 1, "column": 0 }, "end": { "line": 1, "column": 30 } }, ... }`
///   - `s`:            `{ "0": 5, "1": 0, ... }` hit counts per statement
///   - `branchMap`:    `{ "0": { "loc": ..., "type": "if", "locations": [...], "line": 3 }, ... }`
///   - `b`:            `{ "0": [5, 0], ... }` hit counts per branch arm
///   - `fnMap`:        `{ "0": { "name": "foo", "decl": ..., "loc": ..., "line": 1 }, ... }`
///   - `f`:            `{ "0": 3, ... }` hit counts per function
///
/// Every entry is decoded into closed types; a missing table or a value of
/// the wrong type rejects the whole document.
use std::collections::BTreeMap;
use std::io::{BufReader, Read};

use serde::de::Error as _;
use serde::Deserialize;

use super::Parser;
use crate::error::Result;
use crate::model::*;
use crate::report::CoverageReport;

/// Istanbul / NYC JSON parser.
pub struct IstanbulParser;

impl Parser for IstanbulParser {
    type Output = CoverageReport;

    fn parse(&self, input: &[u8]) -> Result<CoverageReport> {
        parse(input)
    }
}

/// Parse Istanbul JSON from raw bytes.
pub fn parse(input: &[u8]) -> Result<CoverageReport> {
    parse_json(serde_json::Deserializer::from_slice(input))
}

/// Parse Istanbul JSON from any reader. Read failures surface as
/// `CovlensError::Io`, decode failures as `CovlensError::MalformedReport`.
/// Blank input is not an object and is rejected as malformed.
pub fn parse_reader<R: Read>(reader: R) -> Result<CoverageReport> {
    parse_json(serde_json::Deserializer::from_reader(BufReader::new(reader)))
}

fn parse_json<'de, R>(mut deser: serde_json::Deserializer<R>) -> Result<CoverageReport>
where
    R: serde_json::de::Read<'de>,
{
    let files = serde::Deserializer::deserialize_map(&mut deser, ReportVisitor)?;
    deser.end()?;
    log::debug!("parsed Istanbul report with {} file(s)", files.len());
    Ok(CoverageReport::from_records(files))
}

/// Serde visitor that walks the top-level `{ path: entry }` map one entry
/// at a time, rejecting duplicate paths.
struct ReportVisitor;

impl<'de> serde::de::Visitor<'de> for ReportVisitor {
    type Value = BTreeMap<String, FileCoverageRecord>;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("an Istanbul JSON object keyed by file path")
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut files = BTreeMap::new();
        while let Some(file_path) = map.next_key::<String>()? {
            // Propagated as-is so read failures keep their I/O category.
            let entry: RawFileEntry = map.next_value()?;
            if files.contains_key(&file_path) {
                return Err(A::Error::custom(format!("duplicate file path '{file_path}'")));
            }
            let record = entry.into_record(file_path.clone());
            files.insert(file_path, record);
        }
        Ok(files)
    }
}

/// One file entry exactly as it appears in the JSON.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFileEntry {
    path: String,
    statement_map: BTreeMap<u32, Location>,
    fn_map: BTreeMap<u32, FunctionMeta>,
    branch_map: BTreeMap<u32, BranchMeta>,
    s: BTreeMap<u32, u64>,
    f: BTreeMap<u32, u64>,
    b: BTreeMap<u32, Vec<u64>>,
    #[serde(rename = "_coverageSchema")]
    coverage_schema: Option<String>,
    hash: Option<String>,
}

impl RawFileEntry {
    /// Project the raw tables into a record keyed by `key`, the path the
    /// report uses as its map key.
    fn into_record(self, key: String) -> FileCoverageRecord {
        if self.path != key {
            log::debug!("entry '{}' declares path '{}'; keeping the key", key, self.path);
        }

        let mut record = FileCoverageRecord {
            path: key,
            schema_version: self.coverage_schema,
            content_hash: self.hash,
            statement_locations: self.statement_map,
            statement_hits: self.s,
            function_metas: self.fn_map,
            function_hits: self.f,
            branch_metas: self.branch_map,
            branch_hits: self.b,
            statement_pct: 0.0,
            function_pct: 0.0,
            branch_pct: 0.0,
        };

        let (covered, total) = record.statement_counts();
        record.statement_pct = percent(covered, total);
        let (covered, total) = record.function_counts();
        record.function_pct = percent(covered, total);
        let (covered, total) = record.branch_counts();
        record.branch_pct = percent(covered, total);

        record
    }
}
