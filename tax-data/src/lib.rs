//! Static reference data for the tax calculator: one JSON document per
//! tax year, validated at load and served through [`TaxDataProvider`].
//!
//! [`TaxDataProvider`]: tax_core::TaxDataProvider

pub mod document;
mod error;
mod store;

pub use document::{TaxBracketRecord, TaxYearDocument, TaxYearTables, validate_brackets};
pub use error::{BracketError, TaxDataLoadError};
pub use store::{StaticTaxData, load_document, year_from_path};
