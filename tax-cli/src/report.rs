//! Text rendering of calculation results.

use std::fmt::{self, Write as _};

use num_format::{Locale, ToFormattedString};
use rust_decimal::Decimal;
use serde::Serialize;
use tax_core::calculations::common::{round_half_up, round_half_up_dp};
use tax_core::{
    FilingStatus, TaxBracket, TaxCalculationRequest, TaxCalculationResult, UpperBound,
    effective_rate,
};

/// A calculation together with the figures derived from it for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxReport {
    pub request: TaxCalculationRequest,
    pub result: TaxCalculationResult,
    pub effective_rate: Decimal,
    pub marginal_rate: Option<Decimal>,
}

impl TaxReport {
    pub fn new(
        request: TaxCalculationRequest,
        result: TaxCalculationResult,
    ) -> Self {
        let effective_rate = effective_rate(request.income, result.tax_after_credits);
        let marginal_rate = result.marginal_rate();
        Self {
            request,
            result,
            effective_rate,
            marginal_rate,
        }
    }

    /// One-line summary used by batch output.
    pub fn summary_line(&self) -> String {
        format!(
            "{} {:<16} income {:>14}  taxable {:>14}  tax {:>13}  after credits {:>13}  effective {:>6}",
            self.request.year,
            self.request.filing_status.as_str(),
            format_currency(self.request.income),
            format_currency(self.result.taxable_income),
            format_currency(self.result.total_tax),
            format_currency(self.result.tax_after_credits),
            format_percent(self.effective_rate, 1),
        )
    }
}

impl fmt::Display for TaxReport {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let request = &self.request;
        writeln!(
            f,
            "Tax year {} - {}",
            request.year,
            request.filing_status.label()
        )?;
        writeln!(f)?;
        writeln!(
            f,
            "{:<6}{:<32}{:>18}{:>14}",
            "Rate", "Bracket", "Income taxed", "Tax"
        )?;
        for row in &self.result.bracket_calculations {
            writeln!(
                f,
                "{:<6}{:<32}{:>18}{:>14}",
                format_percent(row.rate, 0),
                format_range(row.min, row.max),
                format_currency(row.income_in_bracket),
                format_currency(row.tax_for_bracket),
            )?;
        }
        writeln!(f)?;

        let lines = [
            ("Income", format_currency(request.income)),
            ("Deductions", format_currency(request.deductions)),
            ("Taxable income", format_currency(self.result.taxable_income)),
            ("Total tax", format_currency(self.result.total_tax)),
            ("Credits", format_currency(request.credits)),
            ("Tax after credits", format_currency(self.result.tax_after_credits)),
            ("Effective rate", format_percent(self.effective_rate, 1)),
            (
                "Marginal rate",
                self.marginal_rate
                    .map(|rate| format_percent(rate, 0))
                    .unwrap_or_else(|| "n/a".to_string()),
            ),
        ];
        for (label, value) in lines {
            writeln!(f, "{label:<20}{value:>16}")?;
        }
        Ok(())
    }
}

/// Formats an amount as US currency, e.g. `$1,234.56` or `-$5.00`.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = round_half_up(amount);
    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    let abs = rounded.abs();
    // trunc() leaves scale 0, so the mantissa is the integer value
    let whole = abs.trunc().mantissa();
    let cents = (abs.fract() * Decimal::ONE_HUNDRED).trunc().mantissa();
    format!("{sign}${}.{cents:02}", whole.to_formatted_string(&Locale::en))
}

/// Formats a fraction as a percentage with `decimals` places, e.g. `22%`.
pub fn format_percent(
    rate: Decimal,
    decimals: u32,
) -> String {
    let percent = round_half_up_dp(rate * Decimal::ONE_HUNDRED, decimals);
    format!("{:.*}%", decimals as usize, percent)
}

/// `$11,925.00 - $48,475.00`, or `$626,350.00 and up` for the top bracket.
pub fn format_range(
    min: Decimal,
    max: UpperBound,
) -> String {
    match max {
        UpperBound::Bounded(max) => {
            format!("{} - {}", format_currency(min), format_currency(max))
        }
        UpperBound::Unbounded => format!("{} and up", format_currency(min)),
    }
}

/// Bracket table for one (year, status) pair.
pub fn render_bracket_table(
    year: i32,
    status: FilingStatus,
    brackets: &[TaxBracket],
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Tax year {year} - {}", status.label());
    for bracket in brackets {
        let _ = writeln!(
            out,
            "  {:<6}{}",
            format_percent(bracket.rate, 0),
            format_range(bracket.min_income, bracket.max_income)
        );
    }
    out
}
