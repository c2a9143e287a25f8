use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{FilingStatus, UpperBound};

/// Inputs for a single tax calculation.
///
/// Built by the caller; the engine reads it and never changes it. Sign
/// validation of the amounts is the caller's responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxCalculationRequest {
    pub income: Decimal,
    pub filing_status: FilingStatus,
    pub deductions: Decimal,
    pub credits: Decimal,
    pub year: i32,
}

/// Income and tax attributed to one bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketCalculation {
    pub rate: Decimal,
    pub min: Decimal,
    pub max: UpperBound,
    pub income_in_bracket: Decimal,
    pub tax_for_bracket: Decimal,
}

/// Outcome of a calculation. Bracket rows keep the order of the bracket table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxCalculationResult {
    pub taxable_income: Decimal,
    pub bracket_calculations: Vec<BracketCalculation>,
    pub total_tax: Decimal,
    pub tax_after_credits: Decimal,
}

impl TaxCalculationResult {
    /// Brackets that received some income.
    pub fn taxed_brackets(&self) -> impl Iterator<Item = &BracketCalculation> {
        self.bracket_calculations
            .iter()
            .filter(|b| b.income_in_bracket > Decimal::ZERO)
    }

    /// Rate of the highest bracket reached by taxable income.
    ///
    /// With zero taxable income this is the rate of the first bracket, which
    /// is where the next dollar would be taxed.
    pub fn marginal_rate(&self) -> Option<Decimal> {
        self.taxed_brackets()
            .last()
            .or_else(|| self.bracket_calculations.first())
            .map(|b| b.rate)
    }
}
