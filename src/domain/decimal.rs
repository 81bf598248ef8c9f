//! Exact-decimal helpers.
//!
//! Every price, amount and balance in candlesim is a [`rust_decimal::Decimal`].
//! Binary floating point would drift across long fill sequences and never
//! appears in domain code.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use super::error::CandlesimError;

/// Parse a decimal string, tagging failures with the field they came from.
pub fn parse_decimal(field: &str, value: &str) -> Result<Decimal, CandlesimError> {
    Decimal::from_str(value.trim()).map_err(|_| CandlesimError::conversion(field, value))
}

/// Format a decimal to exactly two decimal places, rounding halves away from
/// zero.
pub fn format_fixed2(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}
