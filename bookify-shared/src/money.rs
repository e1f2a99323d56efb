//! Money helpers
//!
//! Amounts are carried as integer minor units (cents) everywhere in Bookify.
//! Payment providers expect decimal strings with two fraction digits, so this
//! module converts between the two representations.

use thiserror::Error;

/// Errors produced while parsing a decimal amount
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("amount is empty")]
    Empty,

    #[error("amount is not a valid decimal: {0}")]
    Malformed(String),

    #[error("amount has more than two fraction digits: {0}")]
    TooPrecise(String),

    #[error("amount is out of range: {0}")]
    OutOfRange(String),
}

/// Formats minor units as a decimal string with two fraction digits.
///
/// ```
/// use bookify_shared::money::format_cents;
///
/// assert_eq!(format_cents(12345), "123.45");
/// assert_eq!(format_cents(5), "0.05");
/// ```
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// Parses a decimal string such as `"120.5"` or `"99.99"` into minor units.
///
/// # Errors
///
/// Returns an error for empty input, non-digit characters, more than two
/// fraction digits or values that overflow `i64`.
pub fn parse_cents(value: &str) -> Result<i64, MoneyError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MoneyError::Empty);
    }

    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let (whole, fraction) = match digits.split_once('.') {
        Some((w, f)) => (w, f),
        None => (digits, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(MoneyError::Malformed(value.to_string()));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(MoneyError::Malformed(value.to_string()));
    }
    if fraction.len() > 2 {
        return Err(MoneyError::TooPrecise(value.to_string()));
    }

    let whole_units: i64 = if whole.is_empty() {
        0
    } else {
        whole
            .parse()
            .map_err(|_| MoneyError::OutOfRange(value.to_string()))?
    };
    let fraction_units: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().unwrap_or(0) * 10,
        _ => fraction.parse::<i64>().unwrap_or(0),
    };

    let cents = whole_units
        .checked_mul(100)
        .and_then(|c| c.checked_add(fraction_units))
        .ok_or_else(|| MoneyError::OutOfRange(value.to_string()))?;

    Ok(if negative { -cents } else { cents })
}
