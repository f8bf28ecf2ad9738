use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use covlens::cli;

/// covlens: per-line verdicts from Istanbul/NYC coverage reports.
#[derive(Parser)]
#[command(name = "covlens", version, about)]
struct Cli {
    /// Path to the coverage report.
    #[arg(
        long,
        global = true,
        env = "COVLENS_REPORT",
        default_value = "coverage/coverage-final.json"
    )]
    report: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List per-file statement, branch and function coverage.
    Files {
        /// Sort by statement coverage ascending (show worst files first).
        #[arg(long)]
        sort_by_coverage: bool,
    },

    /// Show the verdict for every line of a source file.
    Lines {
        /// The source file path, exactly as it appears in the report.
        source_file: String,

        /// Number of lines in the source file (default: last instrumented line).
        #[arg(long)]
        line_count: Option<u32>,

        /// Show only uncovered lines, as compact ranges.
        #[arg(long)]
        uncovered: bool,
    },

    /// Show totals for a final or summary report.
    Summary {
        /// Override format detection (final, summary).
        #[arg(long)]
        format: Option<String>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Cli::parse();

    let output = match args.command {
        Commands::Files { sort_by_coverage } => cli::cmd_files(&args.report, sort_by_coverage)?,
        Commands::Lines {
            source_file,
            line_count,
            uncovered,
        } => cli::cmd_lines(&args.report, &source_file, line_count, uncovered)?,
        Commands::Summary { format } => cli::cmd_summary(&args.report, format.as_deref())?,
    };

    print!("{output}");
    Ok(())
}
