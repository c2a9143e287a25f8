pub mod data_provider;

pub use data_provider::{TaxDataError, TaxDataProvider};
