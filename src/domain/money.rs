use std::fmt;

/// Money is represented as integer cents to avoid floating-point precision issues.
/// 1 unit = 100 cents, so 123.45 = 12345 cents.
pub type Cents = i64;

/// Largest amount accepted, 2^53 cents. Every value up to it survives the
/// trip through the `f64` used on the wire.
pub const MAX_AMOUNT_CENTS: Cents = 1 << 53;

/// Format cents as a human-readable amount.
/// Example: 5000 -> "50.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.abs();
    let units = abs_cents / 100;
    let remainder = abs_cents % 100;
    format!("{}{}.{:02}", sign, units, remainder)
}

/// Parse a decimal string into cents.
/// Example: "50.00" -> 5000, "12.5" -> 1250, "100" -> 10000
///
/// More than two fractional digits is rejected rather than truncated.
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    let (negative, input) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };

    let parts: Vec<&str> = input.split('.').collect();
    let cents = match parts.len() {
        1 => parse_units(parts[0])?.checked_mul(100),
        2 => {
            let units = if parts[0].is_empty() {
                0
            } else {
                parse_units(parts[0])?
            };

            let decimal_str = parts[1];
            if !decimal_str.chars().all(|c| c.is_ascii_digit()) {
                return Err(ParseCentsError::InvalidFormat);
            }
            let decimal_cents: i64 = match decimal_str.len() {
                0 => 0,
                // "5" means 50 cents
                1 => parse_units(decimal_str)? * 10,
                2 => parse_units(decimal_str)?,
                _ => return Err(ParseCentsError::TooPrecise),
            };

            units
                .checked_mul(100)
                .and_then(|c| c.checked_add(decimal_cents))
        }
        _ => return Err(ParseCentsError::InvalidFormat),
    }
    .ok_or(ParseCentsError::OutOfRange)?;

    Ok(if negative { -cents } else { cents })
}

fn parse_units(digits: &str) -> Result<i64, ParseCentsError> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ParseCentsError::InvalidFormat);
    }
    digits.parse().map_err(|_| ParseCentsError::OutOfRange)
}

/// Convert a JSON decimal number (e.g. `123.45`) into cents.
///
/// Goes through the shortest decimal text that round-trips to `value`, so
/// large amounts keep their exact cents.
pub fn cents_from_decimal(value: f64) -> Result<Cents, ParseCentsError> {
    if !value.is_finite() {
        return Err(ParseCentsError::InvalidFormat);
    }
    parse_cents(&value.to_string())
}

/// Convert cents into the decimal number used on the wire.
pub fn cents_to_decimal(cents: Cents) -> f64 {
    cents as f64 / 100.0
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCentsError {
    InvalidFormat,
    TooPrecise,
    OutOfRange,
}

impl fmt::Display for ParseCentsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCentsError::InvalidFormat => write!(f, "invalid money format"),
            ParseCentsError::TooPrecise => write!(f, "more than two decimal places"),
            ParseCentsError::OutOfRange => write!(f, "amount out of range"),
        }
    }
}

impl std::error::Error for ParseCentsError {}

/// Serde adapter that keeps amounts as cents in memory and decimals on the wire.
pub mod decimal {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    use super::{Cents, cents_from_decimal, cents_to_decimal};

    pub fn serialize<S: Serializer>(cents: &Cents, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(cents_to_decimal(*cents))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Cents, D::Error> {
        let value = f64::deserialize(deserializer)?;
        cents_from_decimal(value).map_err(D::Error::custom)
    }
}
