//! CSV loader for batch calculation requests.
//!
//! ## CSV Format
//!
//! Headers are matched by name, so column order does not matter. Header
//! names are case-sensitive.
//!
//! | Column          | Required | Notes                                              |
//! |-----------------|----------|----------------------------------------------------|
//! | `income`        | yes      | currency text such as `$75,000.00` is accepted     |
//! | `filing_status` | no       | `single`, `marriedJoint`, ... or `S`, `MFJ`, `MFS`, `HOH`; empty uses the default status |
//! | `deductions`    | no       | empty means "standard deduction"                   |
//! | `credits`       | no       | empty means 0                                      |
//! | `year`          | no       | empty means the newest supported year              |
//!
//! ### Example
//!
//! ```csv
//! income,filing_status,deductions,credits,year
//! 75000.00,S,14600.00,,2025
//! "$150,000",MFJ,,1000,
//! ```
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tax_core::FilingStatus;

use crate::request::RequestInput;
use crate::utils::{ParseDecimalError, parse_decimal, parse_optional_decimal};

/// Mirrors the CSV layout. Cells stay text so that currency formatting
/// can be stripped by [`parse_decimal`].
#[derive(Debug, Deserialize)]
struct CsvRow {
    income: String,
    #[serde(default)]
    filing_status: String,
    #[serde(default)]
    deductions: String,
    #[serde(default)]
    credits: String,
    #[serde(default)]
    year: String,
}

/// Errors that can occur while loading or converting CSV data.
///
/// `row` is 1-based, not counting the header.
#[derive(Debug, thiserror::Error)]
pub enum CsvLoadError {
    /// Bad structure, missing `income` column, unreadable input, etc.
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    #[error("unrecognised filing status '{status}' on row {row}")]
    InvalidFilingStatus { status: String, row: usize },

    #[error("invalid {field} on row {row}: {source}")]
    InvalidAmount {
        field: &'static str,
        row: usize,
        #[source]
        source: ParseDecimalError,
    },

    #[error("invalid year '{value}' on row {row}")]
    InvalidYear { value: String, row: usize },
}

fn amount_error(
    field: &'static str,
    row: usize,
) -> impl FnOnce(ParseDecimalError) -> CsvLoadError {
    move |source| CsvLoadError::InvalidAmount { field, row, source }
}

fn convert_row(
    row: CsvRow,
    row_number: usize,
    default_status: FilingStatus,
) -> Result<RequestInput, CsvLoadError> {
    let filing_status = if row.filing_status.is_empty() {
        default_status
    } else {
        FilingStatus::parse(&row.filing_status).ok_or_else(|| {
            CsvLoadError::InvalidFilingStatus {
                status: row.filing_status.clone(),
                row: row_number,
            }
        })?
    };

    let year = if row.year.is_empty() {
        None
    } else {
        Some(row.year.parse::<i32>().map_err(|_| CsvLoadError::InvalidYear {
            value: row.year.clone(),
            row: row_number,
        })?)
    };

    Ok(RequestInput {
        income: parse_decimal(&row.income).map_err(amount_error("income", row_number))?,
        filing_status,
        deductions: parse_optional_decimal(&row.deductions)
            .map_err(amount_error("deductions", row_number))?,
        credits: parse_decimal(&row.credits).map_err(amount_error("credits", row_number))?,
        year,
    })
}

/// Parses CSV from `input` and returns the rows in file order.
///
/// # Errors
///
/// * [`CsvLoadError::Parse`] if the CSV is structurally invalid.
/// * [`CsvLoadError::InvalidFilingStatus`], [`CsvLoadError::InvalidAmount`]
///   or [`CsvLoadError::InvalidYear`] for the first bad cell.
pub fn load_from_reader<R: Read>(
    input: R,
    default_status: FilingStatus,
) -> Result<Vec<RequestInput>, CsvLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(input);

    let rows = reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(idx, result)| convert_row(result?, idx + 1, default_status))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(rows = rows.len(), "loaded batch requests");
    Ok(rows)
}

pub fn load_from_str(
    input: &str,
    default_status: FilingStatus,
) -> Result<Vec<RequestInput>, CsvLoadError> {
    load_from_reader(input.as_bytes(), default_status)
}

/// Opens `path` and delegates to [`load_from_reader`]. A missing file is
/// reported as [`CsvLoadError::Parse`] wrapping the I/O error.
pub fn load_from_file(
    path: &Path,
    default_status: FilingStatus,
) -> Result<Vec<RequestInput>, CsvLoadError> {
    let file = File::open(path).map_err(csv::Error::from)?;
    load_from_reader(file, default_status)
}
