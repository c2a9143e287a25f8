mod filing_status;
mod tax_bracket;
mod tax_calculation;

pub use filing_status::FilingStatus;
pub use tax_bracket::{TaxBracket, UpperBound};
pub use tax_calculation::{BracketCalculation, TaxCalculationRequest, TaxCalculationResult};
