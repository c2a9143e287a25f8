//! Bracket apportionment engine.
//!
//! # Algorithm
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Look up the bracket table for (year, filing status) |
//! | 2    | Taxable income = income - deductions, minimum 0 |
//! | 3    | For each bracket, income in bracket = min(taxable, max) - min, or 0 below min |
//! | 4    | Tax for bracket = income in bracket × rate |
//! | 5    | Total tax = sum of bracket taxes, in table order |
//! | 6    | Tax after credits = total tax - credits, minimum 0 |
//!
//! # Example
//!
//! ```
//! use rust_decimal::Decimal;
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::apportion;
//! use tax_core::{TaxBracket, UpperBound};
//!
//! let brackets = vec![
//!     TaxBracket::new(dec!(0.10), dec!(0), UpperBound::Bounded(dec!(11925))),
//!     TaxBracket::new(dec!(0.12), dec!(11925), UpperBound::Bounded(dec!(48475))),
//!     TaxBracket::new(dec!(0.22), dec!(48475), UpperBound::Unbounded),
//! ];
//!
//! let rows = apportion(&brackets, dec!(60400));
//! let total: Decimal = rows.iter().map(|r| r.tax_for_bracket).sum();
//!
//! assert_eq!(rows[2].income_in_bracket, dec!(11925));
//! assert_eq!(total, dec!(8202.00));
//! ```

use rust_decimal::Decimal;

use crate::calculations::common::non_negative;
use crate::models::{BracketCalculation, TaxBracket, TaxCalculationRequest, TaxCalculationResult};
use crate::provider::{TaxDataError, TaxDataProvider};

/// Splits `taxable_income` across `brackets`, one row per bracket in table order.
pub fn apportion(
    brackets: &[TaxBracket],
    taxable_income: Decimal,
) -> Vec<BracketCalculation> {
    brackets
        .iter()
        .map(|bracket| {
            let income_in_bracket = bracket.income_within(taxable_income);
            BracketCalculation {
                rate: bracket.rate,
                min: bracket.min_income,
                max: bracket.max_income,
                income_in_bracket,
                tax_for_bracket: income_in_bracket * bracket.rate,
            }
        })
        .collect()
}

/// Final liability as a fraction of gross income; zero when income is not
/// positive.
pub fn effective_rate(
    income: Decimal,
    tax_after_credits: Decimal,
) -> Decimal {
    if income > Decimal::ZERO {
        tax_after_credits / income
    } else {
        Decimal::ZERO
    }
}

/// Calculator bound to a reference-data provider.
///
/// Holds no state of its own; every call to [`calculate`](Self::calculate)
/// is independent.
pub struct TaxCalculationEngine<'a, P: TaxDataProvider + ?Sized> {
    provider: &'a P,
}

impl<'a, P: TaxDataProvider + ?Sized> TaxCalculationEngine<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    /// Computes the bracket breakdown and totals for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`TaxDataError`] when the provider has no brackets for the
    /// requested year or filing status. The year is never substituted.
    pub fn calculate(
        &self,
        request: &TaxCalculationRequest,
    ) -> Result<TaxCalculationResult, TaxDataError> {
        let brackets = self
            .provider
            .tax_brackets(request.year, request.filing_status)?;

        let taxable_income = self.taxable_income(request.income, request.deductions);
        let bracket_calculations = apportion(brackets, taxable_income);
        let total_tax = self.total_tax(&bracket_calculations);
        let tax_after_credits = self.tax_after_credits(total_tax, request.credits);

        tracing::debug!(
            year = request.year,
            filing_status = %request.filing_status,
            %taxable_income,
            %total_tax,
            %tax_after_credits,
            "calculated tax"
        );

        Ok(TaxCalculationResult {
            taxable_income,
            bracket_calculations,
            total_tax,
            tax_after_credits,
        })
    }

    fn taxable_income(
        &self,
        income: Decimal,
        deductions: Decimal,
    ) -> Decimal {
        non_negative(income - deductions)
    }

    fn total_tax(
        &self,
        rows: &[BracketCalculation],
    ) -> Decimal {
        rows.iter()
            .fold(Decimal::ZERO, |sum, row| sum + row.tax_for_bracket)
    }

    fn tax_after_credits(
        &self,
        total_tax: Decimal,
        credits: Decimal,
    ) -> Decimal {
        non_negative(total_tax - credits)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{FilingStatus, UpperBound};

    /// Provider holding only the 2025 Single table.
    struct SingleOnlyProvider {
        tables: HashMap<(i32, FilingStatus), Vec<TaxBracket>>,
    }

    impl SingleOnlyProvider {
        fn new() -> Self {
            let mut tables = HashMap::new();
            tables.insert((2025, FilingStatus::Single), brackets_single_2025());
            Self { tables }
        }
    }

    impl TaxDataProvider for SingleOnlyProvider {
        fn available_years(&self) -> Vec<i32> {
            vec![2025]
        }

        fn default_year(&self) -> i32 {
            2025
        }

        fn tax_brackets(
            &self,
            year: i32,
            filing_status: FilingStatus,
        ) -> Result<&[TaxBracket], TaxDataError> {
            if year != 2025 {
                return Err(TaxDataError::UnknownTaxYear(year));
            }
            self.tables
                .get(&(year, filing_status))
                .map(Vec::as_slice)
                .ok_or(TaxDataError::UnknownFilingStatus {
                    year,
                    status: filing_status,
                })
        }

        fn standard_deduction(
            &self,
            year: i32,
            filing_status: FilingStatus,
        ) -> Result<Decimal, TaxDataError> {
            self.tax_brackets(year, filing_status)?;
            Ok(dec!(15000))
        }
    }

    fn bounded(
        rate: Decimal,
        min: Decimal,
        max: Decimal,
    ) -> TaxBracket {
        TaxBracket::new(rate, min, UpperBound::Bounded(max))
    }

    fn brackets_single_2025() -> Vec<TaxBracket> {
        vec![
            bounded(dec!(0.10), dec!(0), dec!(11925)),
            bounded(dec!(0.12), dec!(11925), dec!(48475)),
            bounded(dec!(0.22), dec!(48475), dec!(103350)),
            bounded(dec!(0.24), dec!(103350), dec!(197300)),
            bounded(dec!(0.32), dec!(197300), dec!(250525)),
            bounded(dec!(0.35), dec!(250525), dec!(626350)),
            TaxBracket::new(dec!(0.37), dec!(626350), UpperBound::Unbounded),
        ]
    }

    fn request(
        income: Decimal,
        deductions: Decimal,
        credits: Decimal,
    ) -> TaxCalculationRequest {
        TaxCalculationRequest {
            income,
            filing_status: FilingStatus::Single,
            deductions,
            credits,
            year: 2025,
        }
    }

    // =========================================================================
    // apportion tests
    // =========================================================================

    #[test]
    fn apportion_emits_one_row_per_bracket_in_order() {
        let brackets = brackets_single_2025();

        let rows = apportion(&brackets, dec!(60400));

        assert_eq!(rows.len(), 7);
        let mins: Vec<_> = rows.iter().map(|r| r.min).collect();
        let expected: Vec<_> = brackets.iter().map(|b| b.min_income).collect();
        assert_eq!(mins, expected);
    }

    #[test]
    fn apportion_copies_bracket_bounds_and_rates() {
        let brackets = brackets_single_2025();

        let rows = apportion(&brackets, dec!(1000));

        assert_eq!(rows[1].rate, dec!(0.12));
        assert_eq!(rows[1].max, UpperBound::Bounded(dec!(48475)));
        assert_eq!(rows[6].max, UpperBound::Unbounded);
    }

    #[test]
    fn apportion_zero_income_fills_nothing() {
        let rows = apportion(&brackets_single_2025(), Decimal::ZERO);

        assert!(rows.iter().all(|r| r.income_in_bracket == Decimal::ZERO));
        assert!(rows.iter().all(|r| r.tax_for_bracket == Decimal::ZERO));
    }

    #[test]
    fn apportion_income_on_boundary_fills_lower_bracket_exactly() {
        let rows = apportion(&brackets_single_2025(), dec!(11925));

        assert_eq!(rows[0].income_in_bracket, dec!(11925));
        assert_eq!(rows[1].income_in_bracket, Decimal::ZERO);
    }

    #[test]
    fn apportion_empty_table_yields_no_rows() {
        assert!(apportion(&[], dec!(50000)).is_empty());
    }

    // =========================================================================
    // effective_rate tests
    // =========================================================================

    #[test]
    fn effective_rate_divides_liability_by_gross_income() {
        assert_eq!(effective_rate(dec!(75000), dec!(8202)), dec!(0.10936));
    }

    #[test]
    fn effective_rate_is_zero_for_zero_income() {
        assert_eq!(effective_rate(Decimal::ZERO, Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn effective_rate_is_zero_for_negative_income() {
        assert_eq!(effective_rate(dec!(-100), dec!(10)), Decimal::ZERO);
    }

    // =========================================================================
    // helper tests
    // =========================================================================

    #[test]
    fn taxable_income_subtracts_deductions() {
        let provider = SingleOnlyProvider::new();
        let engine = TaxCalculationEngine::new(&provider);

        assert_eq!(engine.taxable_income(dec!(75000), dec!(14600)), dec!(60400));
    }

    #[test]
    fn taxable_income_floors_at_zero() {
        let provider = SingleOnlyProvider::new();
        let engine = TaxCalculationEngine::new(&provider);

        assert_eq!(engine.taxable_income(dec!(10000), dec!(15000)), Decimal::ZERO);
    }

    #[test]
    fn tax_after_credits_floors_at_zero() {
        let provider = SingleOnlyProvider::new();
        let engine = TaxCalculationEngine::new(&provider);

        assert_eq!(engine.tax_after_credits(dec!(500), dec!(10000)), Decimal::ZERO);
        assert_eq!(engine.tax_after_credits(dec!(8202), dec!(1000)), dec!(7202));
    }

    // =========================================================================
    // calculate tests
    // =========================================================================

    #[test]
    fn calculate_single_2025_standard_case() {
        let provider = SingleOnlyProvider::new();
        let engine = TaxCalculationEngine::new(&provider);

        let result = engine
            .calculate(&request(dec!(75000), dec!(14600), Decimal::ZERO))
            .unwrap();

        assert_eq!(result.taxable_income, dec!(60400));
        // 10%: 11925 -> 1192.50
        assert_eq!(result.bracket_calculations[0].tax_for_bracket, dec!(1192.50));
        // 12%: 36550 -> 4386.00
        assert_eq!(result.bracket_calculations[1].income_in_bracket, dec!(36550));
        assert_eq!(result.bracket_calculations[1].tax_for_bracket, dec!(4386.00));
        // 22%: 11925 of 54875 -> 2623.50
        assert_eq!(result.bracket_calculations[2].income_in_bracket, dec!(11925));
        assert_eq!(result.bracket_calculations[2].tax_for_bracket, dec!(2623.50));
        assert!(
            result.bracket_calculations[3..]
                .iter()
                .all(|r| r.income_in_bracket == Decimal::ZERO)
        );
        assert_eq!(result.total_tax, dec!(8202.00));
        assert_eq!(result.tax_after_credits, result.total_tax);
        assert_eq!(result.marginal_rate(), Some(dec!(0.22)));
    }

    #[test]
    fn calculate_zero_income() {
        let provider = SingleOnlyProvider::new();
        let engine = TaxCalculationEngine::new(&provider);

        let result = engine
            .calculate(&request(Decimal::ZERO, Decimal::ZERO, Decimal::ZERO))
            .unwrap();

        assert_eq!(result.taxable_income, Decimal::ZERO);
        assert_eq!(result.total_tax, Decimal::ZERO);
        assert_eq!(result.tax_after_credits, Decimal::ZERO);
        assert_eq!(result.taxed_brackets().count(), 0);
        assert_eq!(result.marginal_rate(), Some(dec!(0.10)));
        assert_eq!(
            effective_rate(Decimal::ZERO, result.tax_after_credits),
            Decimal::ZERO
        );
    }

    #[test]
    fn calculate_credits_exceeding_tax_floor_at_zero() {
        let provider = SingleOnlyProvider::new();
        let engine = TaxCalculationEngine::new(&provider);

        let result = engine
            .calculate(&request(dec!(5000), Decimal::ZERO, dec!(10000)))
            .unwrap();

        assert_eq!(result.total_tax, dec!(500.00));
        assert_eq!(result.tax_after_credits, Decimal::ZERO);
    }

    #[test]
    fn calculate_applies_partial_credits() {
        let provider = SingleOnlyProvider::new();
        let engine = TaxCalculationEngine::new(&provider);

        let result = engine
            .calculate(&request(dec!(75000), dec!(14600), dec!(2000)))
            .unwrap();

        assert_eq!(result.tax_after_credits, dec!(6202.00));
    }

    #[test]
    fn calculate_deductions_exceeding_income() {
        let provider = SingleOnlyProvider::new();
        let engine = TaxCalculationEngine::new(&provider);

        let result = engine
            .calculate(&request(dec!(10000), dec!(15000), Decimal::ZERO))
            .unwrap();

        assert_eq!(result.taxable_income, Decimal::ZERO);
        assert_eq!(result.total_tax, Decimal::ZERO);
    }

    #[test]
    fn calculate_unbounded_top_bracket_takes_excess() {
        let provider = SingleOnlyProvider::new();
        let engine = TaxCalculationEngine::new(&provider);

        let result = engine
            .calculate(&request(dec!(1000000), Decimal::ZERO, Decimal::ZERO))
            .unwrap();

        let top = result.bracket_calculations.last().unwrap();
        assert!(top.max.is_unbounded());
        assert_eq!(top.income_in_bracket, dec!(373650));
        assert_eq!(top.tax_for_bracket, dec!(138250.50));
        assert_eq!(result.total_tax, dec!(327020.25));
        assert_eq!(result.marginal_rate(), Some(dec!(0.37)));
    }

    #[test]
    fn calculate_income_sum_matches_taxable_income() {
        let provider = SingleOnlyProvider::new();
        let engine = TaxCalculationEngine::new(&provider);

        for income in [dec!(1), dec!(11925), dec!(48476), dec!(333333.33), dec!(2500000)] {
            let result = engine
                .calculate(&request(income, dec!(14600), Decimal::ZERO))
                .unwrap();
            let sum: Decimal = result
                .bracket_calculations
                .iter()
                .map(|r| r.income_in_bracket)
                .sum();

            assert_eq!(sum, result.taxable_income, "income {income}");
        }
    }

    #[test]
    fn calculate_is_idempotent() {
        let provider = SingleOnlyProvider::new();
        let engine = TaxCalculationEngine::new(&provider);
        let req = request(dec!(123456.78), dec!(15000), dec!(250));

        assert_eq!(engine.calculate(&req), engine.calculate(&req));
    }

    #[test]
    fn calculate_does_not_modify_request() {
        let provider = SingleOnlyProvider::new();
        let engine = TaxCalculationEngine::new(&provider);
        let req = request(dec!(90000), dec!(100000), dec!(50));
        let before = req.clone();

        engine.calculate(&req).unwrap();

        assert_eq!(req, before);
    }

    #[test]
    fn calculate_unknown_year_fails_without_fallback() {
        let provider = SingleOnlyProvider::new();
        let engine = TaxCalculationEngine::new(&provider);
        let mut req = request(dec!(75000), dec!(15000), Decimal::ZERO);
        req.year = 2019;

        assert_eq!(engine.calculate(&req), Err(TaxDataError::UnknownTaxYear(2019)));
    }

    #[test]
    fn calculate_unknown_filing_status_fails() {
        let provider = SingleOnlyProvider::new();
        let engine = TaxCalculationEngine::new(&provider);
        let mut req = request(dec!(75000), dec!(15000), Decimal::ZERO);
        req.filing_status = FilingStatus::HeadOfHousehold;

        assert_eq!(
            engine.calculate(&req),
            Err(TaxDataError::UnknownFilingStatus {
                year: 2025,
                status: FilingStatus::HeadOfHousehold,
            })
        );
    }

    #[test]
    fn calculate_through_dyn_provider() {
        let provider = SingleOnlyProvider::new();
        let dyn_provider: &dyn TaxDataProvider = &provider;
        let engine = TaxCalculationEngine::new(dyn_provider);

        let result = engine
            .calculate(&request(dec!(20000), Decimal::ZERO, Decimal::ZERO))
            .unwrap();

        // 1192.50 + (20000 - 11925) * 0.12 = 2161.50
        assert_eq!(result.total_tax, dec!(2161.50));
    }
}
