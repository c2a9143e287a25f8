//! Progressive income tax calculation.
//!
//! The engine splits taxable income across an ordered bracket table,
//! taxes each slice at its marginal rate, and applies credits.

pub mod common;
pub mod engine;

pub use engine::{TaxCalculationEngine, apportion, effective_rate};
