use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{FilingStatus, TaxBracket};

/// Lookup failures for reference data.
///
/// Both variants mean the caller passed a year or status that was never
/// validated against the loaded data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaxDataError {
    #[error("no tax data available for year {0}")]
    UnknownTaxYear(i32),

    #[error("no '{status}' tax data available for year {year}")]
    UnknownFilingStatus { year: i32, status: FilingStatus },
}

/// Read-only source of bracket tables and standard deductions, keyed by
/// (year, filing status).
///
/// Implementations are built once and never mutated afterwards, so they can
/// be shared across threads without locking.
pub trait TaxDataProvider: Send + Sync {
    /// Supported years in ascending order. Never empty.
    fn available_years(&self) -> Vec<i32>;

    /// The most recent supported year.
    fn default_year(&self) -> i32;

    fn tax_brackets(
        &self,
        year: i32,
        filing_status: FilingStatus,
    ) -> Result<&[TaxBracket], TaxDataError>;

    fn standard_deduction(
        &self,
        year: i32,
        filing_status: FilingStatus,
    ) -> Result<Decimal, TaxDataError>;

    fn is_supported_year(
        &self,
        year: i32,
    ) -> bool {
        self.available_years().contains(&year)
    }
}
