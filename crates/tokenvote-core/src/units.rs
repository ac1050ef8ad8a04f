//! Conversion between human-readable token amounts and base units.
//!
//! The token and the ballot both use the 18-decimal convention, so every
//! amount that crosses the chain boundary goes through [`to_base_units`] on
//! the way in and [`format_units`] on the way out.

use alloy::primitives::U256;
use rust_decimal::Decimal;

/// Decimals used by the voting token (and by `formatEther`-style output).
pub const TOKEN_DECIMALS: u32 = 18;

/// Parse a decimal string (e.g. "1.5") into a U256 with the given number of decimals.
///
/// `parse_units("1.5", 18)` → `U256(1_500_000_000_000_000_000)`.
pub fn parse_units(amount: &str, decimals: u32) -> Result<U256, String> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err("empty amount".to_string());
    }
    if amount.starts_with('-') {
        return Err("amount must not be negative".to_string());
    }

    let (integer, fractional) = match amount.split_once('.') {
        Some((i, f)) => (i, f),
        None => (amount, ""),
    };

    if fractional.len() > decimals as usize {
        return Err(format!(
            "too many decimal places: got {}, max {decimals}",
            fractional.len()
        ));
    }

    // Pad fractional part to `decimals` digits
    let padded = format!("{fractional:0<width$}", width = decimals as usize);
    let combined = format!("{integer}{padded}");

    let combined = combined.trim_start_matches('0');
    let combined = if combined.is_empty() { "0" } else { combined };

    U256::from_str_radix(combined, 10).map_err(|e| format!("invalid amount: {e}"))
}

/// Convert a U256 base-unit value to a decimal string with the given number of decimals.
///
/// Whole values keep a trailing `.0` (`1000000000000000000` → `"1.0"`).
pub fn format_units(value: U256, decimals: u32) -> String {
    let s = value.to_string();
    let decimals = decimals as usize;

    if s.len() <= decimals {
        if value.is_zero() {
            return "0.0".to_string();
        }
        let zeros = decimals - s.len();
        let fractional = s.trim_end_matches('0');
        format!("0.{}{fractional}", "0".repeat(zeros))
    } else {
        let integer_part = &s[..s.len() - decimals];
        let fractional = s[s.len() - decimals..].trim_end_matches('0');
        if fractional.is_empty() {
            format!("{integer_part}.0")
        } else {
            format!("{integer_part}.{fractional}")
        }
    }
}

/// Convert a human-unit token amount into base units (×10^18).
pub fn to_base_units(amount: Decimal) -> Result<U256, String> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err("amount must not be negative".to_string());
    }
    parse_units(&amount.normalize().to_string(), TOKEN_DECIMALS)
}

/// Format a base-unit token amount in human units.
pub fn format_token(value: U256) -> String {
    format_units(value, TOKEN_DECIMALS)
}

/// Serde adapter that keeps token amounts exact in JSON.
///
/// Amounts are written as JSON numbers without trailing zeros (`10`, `2.5`)
/// and read from either a JSON number or a numeric string.
pub mod exact_amount {
    use rust_decimal::Decimal;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(amount: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::arbitrary_precision::serialize(&amount.normalize(), serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        rust_decimal::serde::arbitrary_precision::deserialize(deserializer)
    }
}
