use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use thiserror::Error;

/// Anything that is not part of a plain decimal number.
static NON_NUMERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^0-9.\-]").unwrap_or_else(|e| unreachable!("static pattern: {e}"))
});

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error)]
pub enum ParseDecimalError {
    #[error("invalid amount '{input}': {source}")]
    Invalid {
        input: String,
        #[source]
        source: rust_decimal::Error,
    },

    #[error("invalid amount '{0}': no digits")]
    NoDigits(String),
}

/// Strips currency symbols, thousands separators and whitespace.
fn normalize_amount_input(s: &str) -> String {
    NON_NUMERIC.replace_all(s, "").into_owned()
}

/// Parses a currency-formatted string such as `"$75,000.00"` into a [`Decimal`].
///
/// Blank input is treated as 0. Input that contains no digits at all
/// (e.g. `"abc"`) is an error.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    if s.trim().is_empty() {
        return Ok(Decimal::ZERO);
    }

    let normalized = normalize_amount_input(s);
    if !normalized.chars().any(|c| c.is_ascii_digit()) {
        tracing::error!(input = %s, "amount has no digits");
        return Err(ParseDecimalError::NoDigits(s.to_string()));
    }

    normalized.parse().map_err(|e| {
        tracing::error!(input = %s, "invalid amount: {}", e);
        ParseDecimalError::Invalid {
            input: s.to_string(),
            source: e,
        }
    })
}

/// Parses an optional amount: blank input is `None`.
pub fn parse_optional_decimal(s: &str) -> Result<Option<Decimal>, ParseDecimalError> {
    if s.trim().is_empty() {
        Ok(None)
    } else {
        parse_decimal(s).map(Some)
    }
}
