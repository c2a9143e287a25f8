//! Command-line front end for the tax calculation engine: configuration,
//! logging, input parsing, request preparation and report rendering.

pub mod app;
pub mod config;
pub mod csv_loader;
pub mod logging;
pub mod report;
pub mod request;
pub mod utils;
