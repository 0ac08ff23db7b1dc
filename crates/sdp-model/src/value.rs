//! Typed document values.
//!
//! A [`Value`] is what the transformation core produces for each
//! attribute: a scalar, an ordered list of scalars, or an in-memory
//! date/time instant. `Null` stands in for a missing value only during
//! assembly; configured null sentinels are ordinary typed values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A transformed attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    String(String),
    Integer(i64),
    Float(f64),
    StringList(Vec<String>),
    IntegerList(Vec<i64>),
    FloatList(Vec<f64>),
    DateTime(DateTime<Utc>),
}

impl Value {
    /// Returns true for the `Null` variant.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the string content, if this is a `String` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extract the integer content, if this is an `Integer` value.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Extract the float content, if this is a `Float` value.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Length of the raw text representation, used for diagnostics.
    pub fn text_len(&self) -> usize {
        match self {
            Value::String(s) => s.len(),
            _ => 0,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::String(s) => write!(f, "{s}"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::StringList(vs) => write!(f, "[{}]", vs.join(", ")),
            Value::IntegerList(vs) => {
                let parts: Vec<String> = vs.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Value::FloatList(vs) => {
                let parts: Vec<String> = vs.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Value::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_accessors() {
        assert!(Value::Null.is_null());
        assert_eq!(Value::from("abc").as_str(), Some("abc"));
        assert_eq!(Value::from(42i64).as_integer(), Some(42));
        assert_eq!(Value::from(1.5f64).as_float(), Some(1.5));
        assert_eq!(Value::from("abc").as_integer(), None);
    }

    #[test]
    fn value_serializes_untagged() {
        let json = serde_json::to_string(&Value::IntegerList(vec![1, 2, 3])).unwrap();
        assert_eq!(json, "[1,2,3]");
        let json = serde_json::to_string(&Value::from("x")).unwrap();
        assert_eq!(json, "\"x\"");
    }
}
