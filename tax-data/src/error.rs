use std::path::PathBuf;

use rust_decimal::Decimal;
use tax_core::FilingStatus;
use thiserror::Error;

/// A rule broken by a bracket list. Indices are 0-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BracketError {
    #[error("bracket list is empty")]
    Empty,

    #[error("first bracket starts at {0}, expected 0")]
    NonZeroStart(Decimal),

    #[error("bracket {index} has rate {rate} outside [0, 1]")]
    RateOutOfRange { index: usize, rate: Decimal },

    #[error("bracket {0} is unbounded but is not the last bracket")]
    UnboundedNotLast(usize),

    #[error("last bracket must be unbounded")]
    LastBounded,

    #[error("bracket {index} has max {max} not above its min {min}")]
    EmptyWidth {
        index: usize,
        min: Decimal,
        max: Decimal,
    },

    #[error("bracket {index} ends at {max} but bracket {next} starts at {next_min}")]
    Gap {
        index: usize,
        max: Decimal,
        next: usize,
        next_min: Decimal,
    },
}

/// Errors raised while loading or validating reference data.
#[derive(Debug, Error)]
pub enum TaxDataLoadError {
    #[error("cannot read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in tax data for {year}: {source}")]
    Json {
        year: i32,
        #[source]
        source: serde_json::Error,
    },

    #[error("'{}' is not named after a tax year (expected e.g. 2025.json)", .0.display())]
    InvalidFileName(PathBuf),

    #[error("invalid {status} brackets for {year}: {reason}")]
    InvalidBrackets {
        year: i32,
        status: FilingStatus,
        #[source]
        reason: BracketError,
    },

    #[error("negative {status} standard deduction for {year}: {amount}")]
    InvalidStandardDeduction {
        year: i32,
        status: FilingStatus,
        amount: Decimal,
    },

    #[error(
        "tax data for {year} lists brackets for {brackets:?} but standard deductions for {deductions:?}"
    )]
    MismatchedStatuses {
        year: i32,
        brackets: Vec<FilingStatus>,
        deductions: Vec<FilingStatus>,
    },

    #[error("tax year {0} supplied more than once")]
    DuplicateYear(i32),

    #[error("no tax years loaded")]
    NoYears,
}
