//! Tolerant deserializers for tool arguments
//!
//! Agents often send numbers as strings (`"650000000"`) or whole numbers as
//! floats (`123.0`). These helpers accept both and fail only when the value
//! really is not a number.

use serde::de::{self, Deserialize, Deserializer};
use serde_json::Value;
use std::fmt::Display;
use std::str::FromStr;

/// 2^64, the first float that no longer fits in a `u64`
const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;

fn float_of(value: &Value) -> Result<f64, String> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(format!("expected a number or numeric string, got {}", value)),
    }
}

fn unsigned_of(value: &Value) -> Result<u64, String> {
    let exact = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    if let Some(v) = exact {
        return Ok(v);
    }

    match float_of(value) {
        Ok(v) if v.fract() == 0.0 && v >= 0.0 && v < U64_LIMIT => Ok(v as u64),
        _ => Err(format!("expected a non-negative integer, got {}", value)),
    }
}

/// `None` for a missing, null or blank value
fn optional(value: Option<Value>) -> Option<Value> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        other => other,
    }
}

pub(crate) fn f64_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    float_of(&Value::deserialize(deserializer)?).map_err(de::Error::custom)
}

pub(crate) fn opt_f64_or_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    optional(Option::<Value>::deserialize(deserializer)?)
        .map(|v| float_of(&v))
        .transpose()
        .map_err(de::Error::custom)
}

pub(crate) fn u64_or_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    unsigned_of(&Value::deserialize(deserializer)?).map_err(de::Error::custom)
}

pub(crate) fn opt_u64_or_string<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    optional(Option::<Value>::deserialize(deserializer)?)
        .map(|v| unsigned_of(&v))
        .transpose()
        .map_err(de::Error::custom)
}

pub(crate) fn u32_or_string<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = u64_or_string(deserializer)?;
    u32::try_from(value).map_err(|_| de::Error::custom(format!("{} is out of range", value)))
}

fn parsed_of<T>(value: &Value) -> Result<T, String>
where
    T: FromStr,
    T::Err: Display,
{
    match value {
        Value::String(s) => s.parse().map_err(|e: T::Err| e.to_string()),
        other => Err(format!("expected a string, got {}", other)),
    }
}

/// Parse an optional keyword argument, treating blank as absent
pub(crate) fn opt_from_str<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    optional(Option::<Value>::deserialize(deserializer)?)
        .map(|v| parsed_of(&v))
        .transpose()
        .map_err(de::Error::custom)
}

/// Like [`opt_from_str`], falling back to `T::default()`
pub(crate) fn from_str_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
    T::Err: Display,
{
    opt_from_str(deserializer).map(Option::unwrap_or_default)
}
