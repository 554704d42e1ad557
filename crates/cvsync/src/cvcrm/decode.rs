//! Lenient decoding of CVDW field values.
//!
//! CVDW sends numbers as JSON numbers or strings and uses `""` and `null`
//! interchangeably for absent values. These helpers accept both and are
//! meant for `#[serde(default, deserialize_with = "...")]`.

use chrono::NaiveDate;
use serde::de::{self, Deserialize, Deserializer};
use serde_json::Value;

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// Trimmed, non-empty string form of a scalar value.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

pub(crate) fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.is_finite())
                .map(|f| f as i64)
        }),
        other => scalar_text(other)?.parse().ok(),
    }
}

pub(crate) fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        other => parse_decimal(&scalar_text(other)?),
    }
}

/// Parse `1234.56`, `1234,56` or `1.234,56`.
fn parse_decimal(text: &str) -> Option<f64> {
    if let Ok(v) = text.parse::<f64>() {
        return Some(v);
    }
    if text.contains(',') {
        let normalized = text.replace('.', "").replace(',', ".");
        return normalized.parse().ok();
    }
    None
}

pub(crate) fn value_to_date(value: &Value) -> Option<NaiveDate> {
    let text = scalar_text(value)?;
    // Timestamps like "2024-03-01 10:00:00" carry the date in the first 10 chars.
    let head = text.get(..10).unwrap_or(&text);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(head, fmt).ok())
}

/// Required upstream identifier. Fails when absent or unparsable.
pub fn id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_i64(&value)
        .ok_or_else(|| de::Error::custom(format!("invalid upstream id: {value}")))
}

pub fn opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_i64(&value))
}

pub fn opt_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_i64(&value).and_then(|v| i32::try_from(v).ok()))
}

pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_f64(&value))
}

pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_text(&value))
}

pub fn opt_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_date(&value))
}
