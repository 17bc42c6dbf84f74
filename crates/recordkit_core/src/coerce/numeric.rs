//! Integer, decimal and currency coercion.

use crate::model::value::Value;
use bigdecimal::BigDecimal;
use once_cell::sync::Lazy;
use regex::Regex;
use std::str::FromStr;

static INTEGER_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[+-]?\d+\s*$").expect("integer pattern must compile"));

// Digits with optional `,` separators and an optional fractional part.
static DECIMAL_BODY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\d+(?:,\d+)*)?(?:\.\d*)?$").expect("decimal pattern must compile")
});

/// Coerces to an integer; text must be an optional sign followed by digits.
///
/// Digit strings outside the `i64` range give `None`, so validation reports
/// `not_an_integer` for them rather than wrapping or saturating.
pub fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Integer(integer) => Some(*integer),
        Value::Text(text) if INTEGER_TEXT.is_match(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Coerces to an arbitrary-precision decimal.
pub fn decimal(value: &Value) -> Option<BigDecimal> {
    numeric(value, None)
}

/// Coerces to a decimal, tolerating a leading currency `symbol` after the sign.
pub fn currency(value: &Value, symbol: char) -> Option<BigDecimal> {
    numeric(value, Some(symbol))
}

fn numeric(value: &Value, symbol: Option<char>) -> Option<BigDecimal> {
    match value {
        Value::Integer(integer) => Some(BigDecimal::from(*integer)),
        Value::Decimal(decimal) => Some(decimal.clone()),
        Value::Float(float) if float.is_finite() => BigDecimal::from_str(&float.to_string()).ok(),
        Value::Text(text) => parse_decimal_text(text, symbol),
        _ => None,
    }
}

fn parse_decimal_text(text: &str, symbol: Option<char>) -> Option<BigDecimal> {
    let mut rest = text.trim();
    let mut sign = "";
    if let Some(stripped) = rest.strip_prefix('-') {
        sign = "-";
        rest = stripped.trim_start();
    } else if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped.trim_start();
    }
    if let Some(symbol) = symbol {
        if let Some(stripped) = rest.strip_prefix(symbol) {
            rest = stripped.trim_start();
        }
    }

    if !DECIMAL_BODY.is_match(rest) || !rest.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let digits: String = rest.chars().filter(|c| *c != ',').collect();
    let normalized = match digits.split_once('.') {
        Some((whole, fraction)) => format!(
            "{sign}{}.{}",
            if whole.is_empty() { "0" } else { whole },
            if fraction.is_empty() { "0" } else { fraction }
        ),
        None => format!("{sign}{digits}"),
    };
    BigDecimal::from_str(&normalized).ok()
}
