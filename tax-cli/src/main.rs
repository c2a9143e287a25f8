use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tax_core::{FilingStatus, TaxDataProvider};
use tracing::debug;

use tax_cli::app;
use tax_cli::config::AppConfig;
use tax_cli::csv_loader;
use tax_cli::logging;
use tax_cli::report::render_bracket_table;
use tax_cli::request::{RequestInput, RequestPolicy};
use tax_cli::utils::{parse_decimal, parse_optional_decimal};

/// Progressive federal income tax calculator.
///
/// Applies the bracket table for the tax year and filing status to income
/// after deductions, subtracts credits, and reports the per-bracket
/// breakdown and effective rate.
#[derive(Debug, Parser)]
#[command(name = "tax-calc", version, about)]
struct Cli {
    /// Config file (default: ./tax-calc.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory of `<year>.json` tax data documents to use instead of the
    /// builtin data.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log filter such as `debug` or `tax_core=trace`. RUST_LOG wins.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Calculate tax for a single request.
    Calculate {
        /// Gross income, e.g. 75000 or "$75,000.00".
        #[arg(long)]
        income: String,

        /// single, marriedJoint, marriedSeparate, headOfHousehold (or S, MFJ, MFS, HOH).
        #[arg(long, value_parser = parse_status)]
        status: Option<FilingStatus>,

        /// Total deductions; the standard deduction when omitted.
        #[arg(long)]
        deductions: Option<String>,

        #[arg(long, default_value = "0")]
        credits: String,

        /// Tax year; the newest supported year when omitted.
        #[arg(long)]
        year: Option<i32>,
    },

    /// Calculate every request in a CSV file.
    Batch {
        file: PathBuf,
    },

    /// List supported tax years and their standard deductions.
    Years,

    /// Show the bracket table for a year and filing status.
    Brackets {
        #[arg(long)]
        year: Option<i32>,

        #[arg(long, value_parser = parse_status)]
        status: Option<FilingStatus>,
    },
}

fn parse_status(s: &str) -> Result<FilingStatus, String> {
    FilingStatus::parse(s).ok_or_else(|| format!("unknown filing status '{s}'"))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn calculate(
    provider: &dyn TaxDataProvider,
    config: &AppConfig,
    format: OutputFormat,
    input: RequestInput,
) -> Result<ExitCode> {
    let report = app::calculate(provider, &input, &RequestPolicy::from(config))?;
    match format {
        OutputFormat::Text => print!("{report}"),
        OutputFormat::Json => print_json(&report)?,
    }
    Ok(ExitCode::SUCCESS)
}

fn batch(
    provider: &dyn TaxDataProvider,
    config: &AppConfig,
    format: OutputFormat,
    file: &Path,
) -> Result<ExitCode> {
    let inputs = csv_loader::load_from_file(file, config.default_status)
        .with_context(|| format!("cannot load requests from '{}'", file.display()))?;
    let entries = app::run_batch(provider, &inputs, &RequestPolicy::from(config));
    let failures = entries.iter().filter(|e| !e.is_ok()).count();

    match format {
        OutputFormat::Text => {
            for entry in &entries {
                match (&entry.report, &entry.error) {
                    (Some(report), _) => println!("{:>4}  {}", entry.row, report.summary_line()),
                    (None, Some(error)) => println!("{:>4}  FAIL {error}", entry.row),
                    (None, None) => {}
                }
            }
            if failures > 0 {
                println!("{failures} of {} rows failed.", entries.len());
            }
        }
        OutputFormat::Json => print_json(&entries)?,
    }

    Ok(if failures > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn brackets(
    provider: &dyn TaxDataProvider,
    config: &AppConfig,
    format: OutputFormat,
    year: Option<i32>,
    status: Option<FilingStatus>,
) -> Result<ExitCode> {
    let year = year.unwrap_or_else(|| provider.default_year());
    if !provider.is_supported_year(year) {
        bail!(
            "tax year {year} is not supported; available years: {:?}",
            provider.available_years()
        );
    }
    let status = status.unwrap_or(config.default_status);
    let table = provider.tax_brackets(year, status)?;
    match format {
        OutputFormat::Text => print!("{}", render_bracket_table(year, status, table)),
        OutputFormat::Json => print_json(&table)?,
    }
    Ok(ExitCode::SUCCESS)
}

fn run(cli: Cli) -> Result<ExitCode> {
    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    let config = AppConfig::discover(cli.config.as_deref(), &cwd)?;

    let level = cli.log_level.as_deref().or(config.log.level.as_deref());
    logging::init_logging(level, config.log.file.as_deref())?;
    debug!(?config, "configuration resolved");

    let data_dir = cli.data_dir.as_deref().or(config.data_dir.as_deref());
    let provider = app::load_provider(data_dir)?;

    match cli.command {
        Command::Calculate {
            income,
            status,
            deductions,
            credits,
            year,
        } => {
            let input = RequestInput {
                income: parse_decimal(&income).context("--income")?,
                filing_status: status.unwrap_or(config.default_status),
                deductions: match deductions.as_deref() {
                    Some(text) => parse_optional_decimal(text).context("--deductions")?,
                    None => None,
                },
                credits: parse_decimal(&credits).context("--credits")?,
                year,
            };
            calculate(&provider, &config, cli.format, input)
        }
        Command::Batch { file } => batch(&provider, &config, cli.format, &file),
        Command::Years => {
            let summaries = app::year_summaries(&provider);
            match cli.format {
                OutputFormat::Text => print!("{}", app::render_year_summaries(&summaries)),
                OutputFormat::Json => print_json(&summaries)?,
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Brackets { year, status } => {
            brackets(&provider, &config, cli.format, year, status)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "tax-calc failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
