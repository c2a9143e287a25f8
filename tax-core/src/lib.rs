pub mod calculations;
pub mod models;
pub mod provider;

pub use calculations::{TaxCalculationEngine, effective_rate};
pub use models::*;
pub use provider::{TaxDataError, TaxDataProvider};
