use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Upper limit of a bracket.
///
/// Serializes as a nullable amount so that `null` in reference data and in
/// JSON output means [`UpperBound::Unbounded`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<Decimal>", into = "Option<Decimal>")]
pub enum UpperBound {
    Bounded(Decimal),
    Unbounded,
}

impl UpperBound {
    pub fn amount(&self) -> Option<Decimal> {
        match self {
            Self::Bounded(amount) => Some(*amount),
            Self::Unbounded => None,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }
}

impl From<Option<Decimal>> for UpperBound {
    fn from(value: Option<Decimal>) -> Self {
        value.map_or(Self::Unbounded, Self::Bounded)
    }
}

impl From<UpperBound> for Option<Decimal> {
    fn from(value: UpperBound) -> Self {
        value.amount()
    }
}

impl fmt::Display for UpperBound {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Bounded(amount) => write!(f, "{amount}"),
            Self::Unbounded => f.write_str("unbounded"),
        }
    }
}

/// One marginal rate band. `min_income` is inclusive; the band covers
/// income up to `max_income`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub rate: Decimal,
    pub min_income: Decimal,
    pub max_income: UpperBound,
}

impl TaxBracket {
    pub fn new(
        rate: Decimal,
        min_income: Decimal,
        max_income: UpperBound,
    ) -> Self {
        Self {
            rate,
            min_income,
            max_income,
        }
    }

    /// Portion of `taxable_income` that falls inside this bracket.
    pub fn income_within(
        &self,
        taxable_income: Decimal,
    ) -> Decimal {
        if taxable_income <= self.min_income {
            return Decimal::ZERO;
        }

        match self.max_income {
            UpperBound::Unbounded => taxable_income - self.min_income,
            UpperBound::Bounded(max) => taxable_income.min(max) - self.min_income,
        }
    }
}
