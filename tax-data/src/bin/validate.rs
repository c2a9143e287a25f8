use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tax_data::{load_document, year_from_path};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

/// Validate tax reference data files.
///
/// Each file must be named after its tax year (e.g. `2025.json`) and hold a
/// document with `taxBrackets` and `standardDeductions` sections keyed by
/// filing status. Bracket tables must start at 0, be contiguous, and end
/// with a single unbounded bracket.
#[derive(Parser, Debug)]
#[command(name = "tax-data-validate")]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON documents to check
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .init();
}

fn check(path: &Path) -> Result<usize> {
    let year = year_from_path(path)?;
    let tables = load_document(path, year)?.into_tables(year)?;
    debug!(year, path = %path.display(), "validated");
    Ok(tables.filing_statuses().len())
}

/// Checks every file, printing one ok/FAIL line each. Returns the number
/// of failures.
fn check_all(files: &[PathBuf]) -> usize {
    let mut failures = 0;

    for path in files {
        match check(path) {
            Ok(statuses) => println!("ok    {} ({statuses} filing statuses)", path.display()),
            Err(e) => {
                failures += 1;
                error!(path = %path.display(), "validation failed");
                println!("FAIL  {}: {e:#}", path.display());
            }
        }
    }

    failures
}

fn main() -> ExitCode {
    init_tracing();

    let args = Args::parse();
    let failures = check_all(&args.files);
    if failures > 0 {
        println!("{failures} of {} files failed validation.", args.files.len());
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
