//! Turns raw user input into a [`TaxCalculationRequest`].
//!
//! The engine trusts its request, so the checks that belong to the calling
//! layer live here: amounts must not be negative, the year must be one the
//! provider knows (or be replaced according to [`YearPolicy`]), and missing
//! or too-small deductions become the standard deduction.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tax_core::{FilingStatus, TaxCalculationRequest, TaxDataError, TaxDataProvider};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{AppConfig, YearPolicy};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("{field} must not be negative (got {amount})")]
    Negative { field: &'static str, amount: Decimal },

    #[error("tax year {year} is not supported; available years: {available:?}")]
    UnsupportedYear { year: i32, available: Vec<i32> },

    #[error(transparent)]
    Data(#[from] TaxDataError),
}

/// Values as collected from the command line or a CSV row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestInput {
    pub income: Decimal,
    pub filing_status: FilingStatus,
    /// `None` means "use the standard deduction".
    pub deductions: Option<Decimal>,
    pub credits: Decimal,
    /// `None` means "use the provider's default year".
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestPolicy {
    pub year_policy: YearPolicy,
    pub standard_deduction_floor: bool,
}

impl Default for RequestPolicy {
    fn default() -> Self {
        Self {
            year_policy: YearPolicy::Reject,
            standard_deduction_floor: true,
        }
    }
}

impl From<&AppConfig> for RequestPolicy {
    fn from(config: &AppConfig) -> Self {
        Self {
            year_policy: config.year_policy,
            standard_deduction_floor: config.standard_deduction_floor,
        }
    }
}

fn ensure_non_negative(
    field: &'static str,
    amount: Decimal,
) -> Result<(), RequestError> {
    if amount < Decimal::ZERO {
        Err(RequestError::Negative { field, amount })
    } else {
        Ok(())
    }
}

/// Picks the year to calculate for.
pub fn resolve_year<P: TaxDataProvider + ?Sized>(
    provider: &P,
    requested: Option<i32>,
    policy: YearPolicy,
) -> Result<i32, RequestError> {
    let Some(year) = requested else {
        return Ok(provider.default_year());
    };

    if provider.is_supported_year(year) {
        return Ok(year);
    }

    match policy {
        YearPolicy::Reject => Err(RequestError::UnsupportedYear {
            year,
            available: provider.available_years(),
        }),
        YearPolicy::Latest => {
            let fallback = provider.default_year();
            warn!(requested = year, using = fallback, "unsupported tax year, using latest");
            Ok(fallback)
        }
    }
}

/// Validates `input` and fills in the year and deductions.
///
/// # Errors
///
/// * [`RequestError::Negative`] for a negative income, deduction or credit.
/// * [`RequestError::UnsupportedYear`] under [`YearPolicy::Reject`].
/// * [`RequestError::Data`] when the provider lacks the filing status.
pub fn prepare_request<P: TaxDataProvider + ?Sized>(
    provider: &P,
    input: &RequestInput,
    policy: &RequestPolicy,
) -> Result<TaxCalculationRequest, RequestError> {
    ensure_non_negative("income", input.income)?;
    ensure_non_negative("credits", input.credits)?;
    if let Some(deductions) = input.deductions {
        ensure_non_negative("deductions", deductions)?;
    }

    let year = resolve_year(provider, input.year, policy.year_policy)?;
    let standard = provider.standard_deduction(year, input.filing_status)?;

    let deductions = match input.deductions {
        None => standard,
        Some(supplied) if policy.standard_deduction_floor && supplied < standard => {
            debug!(%supplied, %standard, "raising deductions to standard deduction");
            standard
        }
        Some(supplied) => supplied,
    };

    Ok(TaxCalculationRequest {
        income: input.income,
        filing_status: input.filing_status,
        deductions,
        credits: input.credits,
        year,
    })
}
