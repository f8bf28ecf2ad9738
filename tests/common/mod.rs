use covlens::model::FileCoverageRecord;
use covlens::CoverageReport;

pub const FIXTURE: &[u8] = include_bytes!("../fixtures/coverage-final.json");

/// Parse the shared `coverage-final.json` fixture.
pub fn fixture_report() -> CoverageReport {
    covlens::parsers::istanbul::parse(FIXTURE).unwrap()
}

/// Parse an inline report and return its only record.
pub fn single_record(input: &str) -> FileCoverageRecord {
    let report = covlens::parsers::istanbul::parse(input.as_bytes()).unwrap();
    assert_eq!(report.len(), 1);
    report.all_records().values().next().unwrap().clone()
}
