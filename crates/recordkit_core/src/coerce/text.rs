//! Boolean, string and enum coercion.

use crate::model::value::Value;
use bigdecimal::BigDecimal;

const TRUE_TOKENS: &[&str] = &["1", "true", "t"];

/// Coerces to a tri-state boolean: blank is `None`.
pub fn boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        blank if blank.is_blank() => None,
        Value::Text(text) => Some(TRUE_TOKENS.contains(&text.as_str())),
        Value::Integer(integer) => Some(*integer == 1),
        Value::Float(float) => Some(*float == 1.0),
        Value::Decimal(decimal) => Some(*decimal == BigDecimal::from(1)),
        _ => Some(false),
    }
}

/// Normalizes a string value: optional strip, blank becomes `None`.
///
/// Structured values (lists, maps, instances) are kept as their JSON text.
pub fn string(value: &Value, strip: bool) -> Option<String> {
    if value.is_blank() {
        return None;
    }
    let text = render(value);
    let text = if strip {
        text.trim().to_string()
    } else {
        text
    };
    (!text.trim().is_empty()).then_some(text)
}

/// Normalizes an enum candidate: blank becomes `None`, membership is checked
/// by the caller.
///
/// Structured values are kept as their JSON text so the membership rule can
/// report them.
pub fn enumeration(value: &Value) -> Option<String> {
    if value.is_blank() {
        return None;
    }
    Some(render(value))
}

fn render(value: &Value) -> String {
    value
        .scalar_text()
        .unwrap_or_else(|| value.to_json().to_string())
}
