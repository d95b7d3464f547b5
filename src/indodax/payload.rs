//! Ordered form payload for private API calls

use std::fmt;

use crate::error::IndodaxResult;

/// A scalar payload value
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    Integer(u64),
    Float(f64),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(n) => write!(f, "{}", n),
            Self::Float(x) => write!(f, "{}", x),
        }
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        Self::Integer(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Integer(u64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// Request fields in insertion order
///
/// The encoded form of this payload is both the POST body and the HMAC
/// input, so field order here is the order on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    fields: Vec<(String, ParamValue)>,
}

impl Payload {
    /// Start a payload for the given remote `method`
    pub fn new(method: &str) -> Self {
        Self {
            fields: vec![("method".to_string(), ParamValue::from(method))],
        }
    }

    /// Append a field, replacing an earlier value with the same name in place
    pub fn with(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Append a field only when a value was supplied
    pub fn with_opt<V: Into<ParamValue>>(self, name: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.with(name, v),
            None => self,
        }
    }

    /// Like [`Payload::with_opt`] but an empty string counts as not supplied
    pub fn with_opt_text(self, name: &str, value: Option<&str>) -> Self {
        self.with_opt(name, value.filter(|s| !s.is_empty()))
    }

    pub fn insert(&mut self, name: &str, value: impl Into<ParamValue>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == name)
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// The remote method name
    pub fn method(&self) -> Option<&str> {
        match self.get("method") {
            Some(ParamValue::Text(m)) => Some(m),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Add `timestamp` unless the caller already supplied `nonce` or `timestamp`
    ///
    /// Returns true when a timestamp was added.
    pub fn ensure_fresh(&mut self, now_ms: u64) -> bool {
        if self.contains("nonce") || self.contains("timestamp") {
            return false;
        }
        self.fields
            .push(("timestamp".to_string(), ParamValue::Integer(now_ms)));
        true
    }

    /// Encode as `application/x-www-form-urlencoded`
    pub fn encode(&self) -> IndodaxResult<String> {
        let pairs: Vec<(&str, String)> = self
            .fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.to_string()))
            .collect();
        Ok(serde_urlencoded::to_string(&pairs)?)
    }
}
