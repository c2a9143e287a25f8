//! Per-year reference data documents.
//!
//! ## Format
//!
//! ```json
//! {
//!   "taxBrackets": {
//!     "single": [
//!       { "rate": 0.10, "minIncome": 0, "maxIncome": 11925 },
//!       { "rate": 0.37, "minIncome": 11925, "maxIncome": null }
//!     ]
//!   },
//!   "standardDeductions": { "single": 14600 }
//! }
//! ```
//!
//! Both sections are keyed by filing status (`single`, `marriedJoint`,
//! `marriedSeparate`, `headOfHousehold`) and must name the same statuses.
//! A `null` or missing `maxIncome` marks the unbounded top bracket.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tax_core::{FilingStatus, TaxBracket, UpperBound};

use crate::{BracketError, TaxDataLoadError};

/// One bracket entry as it appears in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBracketRecord {
    pub rate: Decimal,
    pub min_income: Decimal,
    #[serde(default)]
    pub max_income: Option<Decimal>,
}

impl From<&TaxBracketRecord> for TaxBracket {
    fn from(record: &TaxBracketRecord) -> Self {
        TaxBracket::new(
            record.rate,
            record.min_income,
            UpperBound::from(record.max_income),
        )
    }
}

/// A complete reference document for one tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxYearDocument {
    pub tax_brackets: BTreeMap<FilingStatus, Vec<TaxBracketRecord>>,
    pub standard_deductions: BTreeMap<FilingStatus, Decimal>,
}

impl TaxYearDocument {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Validates the document and converts it into lookup tables.
    ///
    /// # Errors
    ///
    /// Returns [`TaxDataLoadError`] if the sections disagree on filing
    /// statuses, a standard deduction is negative, or any bracket list
    /// breaks the table rules checked by [`validate_brackets`].
    pub fn into_tables(
        self,
        year: i32,
    ) -> Result<TaxYearTables, TaxDataLoadError> {
        let bracket_statuses: BTreeSet<_> = self.tax_brackets.keys().copied().collect();
        let deduction_statuses: BTreeSet<_> = self.standard_deductions.keys().copied().collect();
        if bracket_statuses != deduction_statuses {
            return Err(TaxDataLoadError::MismatchedStatuses {
                year,
                brackets: bracket_statuses.into_iter().collect(),
                deductions: deduction_statuses.into_iter().collect(),
            });
        }

        let mut tables = TaxYearTables::default();

        for (status, records) in &self.tax_brackets {
            validate_brackets(records).map_err(|reason| TaxDataLoadError::InvalidBrackets {
                year,
                status: *status,
                reason,
            })?;
            tables
                .brackets
                .insert(*status, records.iter().map(TaxBracket::from).collect());
        }

        for (status, amount) in self.standard_deductions {
            if amount < Decimal::ZERO {
                return Err(TaxDataLoadError::InvalidStandardDeduction {
                    year,
                    status,
                    amount,
                });
            }
            tables.standard_deductions.insert(status, amount);
        }

        Ok(tables)
    }
}

/// Checks that a bracket list forms a contiguous table starting at zero
/// with exactly one unbounded bracket at the end.
///
/// Reports the first rule broken, in table order.
pub fn validate_brackets(records: &[TaxBracketRecord]) -> Result<(), BracketError> {
    let Some(first) = records.first() else {
        return Err(BracketError::Empty);
    };
    if first.min_income != Decimal::ZERO {
        return Err(BracketError::NonZeroStart(first.min_income));
    }

    let last_index = records.len() - 1;
    for (index, record) in records.iter().enumerate() {
        if record.rate < Decimal::ZERO || record.rate > Decimal::ONE {
            return Err(BracketError::RateOutOfRange {
                index,
                rate: record.rate,
            });
        }

        match record.max_income {
            None if index != last_index => return Err(BracketError::UnboundedNotLast(index)),
            None => {}
            Some(_) if index == last_index => return Err(BracketError::LastBounded),
            Some(max) => {
                if max <= record.min_income {
                    return Err(BracketError::EmptyWidth {
                        index,
                        min: record.min_income,
                        max,
                    });
                }
                let next_min = records[index + 1].min_income;
                if next_min != max {
                    return Err(BracketError::Gap {
                        index,
                        max,
                        next: index + 1,
                        next_min,
                    });
                }
            }
        }
    }

    Ok(())
}

/// Validated lookup tables for one year.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxYearTables {
    pub(crate) brackets: HashMap<FilingStatus, Vec<TaxBracket>>,
    pub(crate) standard_deductions: HashMap<FilingStatus, Decimal>,
}

impl TaxYearTables {
    pub fn brackets(
        &self,
        status: FilingStatus,
    ) -> Option<&[TaxBracket]> {
        self.brackets.get(&status).map(Vec::as_slice)
    }

    pub fn standard_deduction(
        &self,
        status: FilingStatus,
    ) -> Option<Decimal> {
        self.standard_deductions.get(&status).copied()
    }

    /// Filing statuses present in this year's data, in declaration order.
    pub fn filing_statuses(&self) -> Vec<FilingStatus> {
        let mut statuses: Vec<_> = self.brackets.keys().copied().collect();
        statuses.sort_unstable();
        statuses
    }
}
