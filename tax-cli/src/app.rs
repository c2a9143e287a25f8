//! Glue between the provider, request preparation, the engine and reports.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Serialize;
use tax_core::{FilingStatus, TaxCalculationEngine, TaxDataProvider};
use tax_data::{StaticTaxData, TaxDataLoadError};
use tracing::{info, warn};

use crate::report::{TaxReport, format_currency};
use crate::request::{RequestError, RequestInput, RequestPolicy, prepare_request};

/// Loads `<year>.json` documents from `data_dir`, or the builtin datasets.
pub fn load_provider(data_dir: Option<&Path>) -> Result<StaticTaxData, TaxDataLoadError> {
    let data = match data_dir {
        Some(dir) => StaticTaxData::from_dir(dir)?,
        None => StaticTaxData::builtin()?,
    };
    info!(
        years = ?data.available_years(),
        source = %data_dir.map_or_else(|| "builtin".to_string(), |d| d.display().to_string()),
        "tax data loaded"
    );
    Ok(data)
}

/// Prepares `input`, runs the engine and wraps the result in a report.
pub fn calculate<P: TaxDataProvider + ?Sized>(
    provider: &P,
    input: &RequestInput,
    policy: &RequestPolicy,
) -> Result<TaxReport, RequestError> {
    let request = prepare_request(provider, input, policy)?;
    let result = TaxCalculationEngine::new(provider).calculate(&request)?;
    Ok(TaxReport::new(request, result))
}

/// Outcome of one batch row. Exactly one of `report` and `error` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchEntry {
    /// 1-based, not counting the CSV header.
    pub row: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<TaxReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchEntry {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Calculates every row independently; a failing row does not stop the rest.
pub fn run_batch<P: TaxDataProvider + ?Sized>(
    provider: &P,
    inputs: &[RequestInput],
    policy: &RequestPolicy,
) -> Vec<BatchEntry> {
    inputs
        .iter()
        .enumerate()
        .map(|(idx, input)| {
            let row = idx + 1;
            match calculate(provider, input, policy) {
                Ok(report) => BatchEntry {
                    row,
                    report: Some(report),
                    error: None,
                },
                Err(e) => {
                    warn!(row, error = %e, "batch row failed");
                    BatchEntry {
                        row,
                        report: None,
                        error: Some(e.to_string()),
                    }
                }
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearSummary {
    pub year: i32,
    pub is_default: bool,
    /// Only the statuses the provider has data for.
    pub standard_deductions: BTreeMap<FilingStatus, Decimal>,
}

pub fn year_summaries<P: TaxDataProvider + ?Sized>(provider: &P) -> Vec<YearSummary> {
    let default_year = provider.default_year();
    provider
        .available_years()
        .into_iter()
        .map(|year| YearSummary {
            year,
            is_default: year == default_year,
            standard_deductions: FilingStatus::all()
                .iter()
                .filter_map(|status| {
                    provider
                        .standard_deduction(year, *status)
                        .ok()
                        .map(|amount| (*status, amount))
                })
                .collect(),
        })
        .collect()
}

pub fn render_year_summaries(summaries: &[YearSummary]) -> String {
    let mut out = String::new();
    for summary in summaries {
        let marker = if summary.is_default { " (default)" } else { "" };
        let _ = writeln!(out, "{}{marker}", summary.year);
        for (status, amount) in &summary.standard_deductions {
            let _ = writeln!(
                out,
                "  {:<28}{:>14}",
                status.label(),
                format_currency(*amount)
            );
        }
    }
    out
}
