//! Forgiving number handling
//!
//! The backend stores whatever the operator typed, so numeric fields may
//! arrive as numbers, numeric strings, floats or null. Everything that is
//! not a usable number collapses to zero.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Parse operator text as a number. Returns `None` for blank or garbage input.
pub fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse operator text as an integer, truncating any fractional part.
pub fn parse_int(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Ok(v) = text.parse::<i64>() {
        return Some(v);
    }
    parse_number(text).map(|v| v.trunc() as i64)
}

fn value_to_u32(value: &Value) -> u32 {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s),
        _ => None,
    };
    match number {
        Some(v) if v > 0.0 => v.min(u32::MAX as f64) as u32,
        _ => 0,
    }
}

/// Deserialize a non-negative counter, mapping anything unusable to 0
pub(crate) fn non_negative<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(value_to_u32).unwrap_or(0))
}

/// Like [`non_negative`] but keeps absence distinguishable
pub(crate) fn optional_positive<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(value_to_u32).filter(|v| *v > 0))
}
