pub mod classify;
pub mod cli;
pub mod detect;
pub mod error;
pub mod model;
pub mod parsers;
pub mod report;

pub use classify::{classify, classify_lines, LineIndex, LineVerdict};
pub use report::CoverageReport;
