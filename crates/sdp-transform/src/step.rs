//! Value transform steps and the step executor.
//!
//! A plan is an ordered list of [`TransformStep`] values: plain data,
//! never composed closures, interpreted by [`TransformStep::apply`]
//! over a small [`TransformValue`] record threaded through the
//! sequence. Every step short-circuits when the carried value has
//! already been resolved to null, which keeps the null flag monotonic:
//! once set, no later step alters the sentinel.

use serde::{Deserialize, Serialize};
use sdp_model::{AttributeDef, TableSchema, Value};

use crate::datetime;
use crate::error::{Result, TransformError};

/// Intermediate value threaded through one attribute's step sequence
/// for one record.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformValue {
    pub value: Value,
    /// Length of the raw input before any transformation; diagnostics only.
    pub original_length: usize,
    /// Monotonic: set at most once, never cleared by a later step.
    pub is_null: bool,
}

impl TransformValue {
    /// Seed a pipeline from a raw cell.
    ///
    /// An empty cell resolves to the attribute's sentinel immediately;
    /// placeholder detection for non-empty cells happens in the first
    /// cast step.
    pub fn from_raw(raw: &str, attribute: &AttributeDef) -> Self {
        if raw.is_empty() {
            Self {
                value: attribute.null_sentinel.clone(),
                original_length: 0,
                is_null: true,
            }
        } else {
            Self {
                value: Value::String(raw.to_owned()),
                original_length: raw.len(),
                is_null: false,
            }
        }
    }

    fn null(attribute: &AttributeDef, original_length: usize) -> Self {
        Self {
            value: attribute.null_sentinel.clone(),
            original_length,
            is_null: true,
        }
    }

    fn resolved(value: Value, original_length: usize) -> Self {
        Self {
            value,
            original_length,
            is_null: false,
        }
    }
}

/// One ordered element of an attribute's transform plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransformStep {
    CastString,
    CastInteger,
    CastFloat,
    CastIterableString,
    CastIterableInteger,
    CastIterableFloat,
    CastDateToObject,
    CastDateTimeToIso,
    CastDateToIso,
    NormalizeEnum,
    StripWhitespace,
    TruncateWidth,
}

impl TransformStep {
    /// Stable step name for logs and serialized plans.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CastString => "cast-string",
            Self::CastInteger => "cast-integer",
            Self::CastFloat => "cast-float",
            Self::CastIterableString => "cast-iterable-string",
            Self::CastIterableInteger => "cast-iterable-integer",
            Self::CastIterableFloat => "cast-iterable-float",
            Self::CastDateToObject => "cast-date-to-object",
            Self::CastDateTimeToIso => "cast-datetime-to-iso",
            Self::CastDateToIso => "cast-date-to-iso",
            Self::NormalizeEnum => "normalize-enum",
            Self::StripWhitespace => "strip-whitespace",
            Self::TruncateWidth => "truncate-width",
        }
    }

    /// Apply this step to an intermediate value.
    ///
    /// Null/empty inputs are data, not errors: they resolve to the
    /// attribute's sentinel. Unparseable numeric or date text is a
    /// hard error, fatal for this attribute in this record.
    pub fn apply(
        &self,
        tv: TransformValue,
        attribute: &AttributeDef,
        table: &TableSchema,
    ) -> Result<TransformValue> {
        if tv.is_null {
            return Ok(tv);
        }
        match self {
            Self::CastString => cast_scalar(tv, attribute, |raw, _| {
                Ok(Value::String(raw.to_owned()))
            }),
            Self::CastInteger => cast_scalar(tv, attribute, |raw, at| {
                parse_integer(raw, at).map(Value::Integer)
            }),
            Self::CastFloat => cast_scalar(tv, attribute, |raw, at| {
                parse_float(raw, at).map(Value::Float)
            }),
            Self::CastIterableString => cast_iterable(
                tv,
                attribute,
                self,
                |token, _| Ok(token.to_owned()),
                Value::StringList,
            ),
            Self::CastIterableInteger => {
                cast_iterable(tv, attribute, self, parse_integer, Value::IntegerList)
            }
            Self::CastIterableFloat => {
                cast_iterable(tv, attribute, self, parse_float, Value::FloatList)
            }
            Self::CastDateToObject => cast_scalar(tv, attribute, |raw, at| {
                datetime::to_utc(&at.id, raw).map(Value::DateTime)
            }),
            Self::CastDateTimeToIso => cast_scalar(tv, attribute, |raw, at| {
                datetime::to_iso_utc(&at.id, raw).map(Value::String)
            }),
            Self::CastDateToIso => cast_scalar(tv, attribute, |raw, at| {
                datetime::to_iso_date(&at.id, raw).map(Value::String)
            }),
            Self::NormalizeEnum => normalize_enum(tv, attribute, table),
            Self::StripWhitespace => strip_whitespace(tv, attribute, self),
            Self::TruncateWidth => truncate_width(tv, attribute, self),
        }
    }
}

/// Recognized null placeholders, beyond the empty string.
fn is_null_text(raw: &str) -> bool {
    raw.is_empty() || raw == "?" || raw == "."
}

fn expect_str<'a>(
    tv: &'a TransformValue,
    attribute: &AttributeDef,
    step: &TransformStep,
) -> Result<&'a str> {
    tv.value
        .as_str()
        .ok_or_else(|| TransformError::UnsupportedValue {
            step: step.name(),
            attribute: attribute.id.clone(),
        })
}

fn parse_integer(raw: &str, attribute: &AttributeDef) -> Result<i64> {
    raw.parse::<i64>()
        .map_err(|_| TransformError::TypeConversion {
            attribute: attribute.id.clone(),
            value: raw.to_owned(),
            target: "integer",
        })
}

fn parse_float(raw: &str, attribute: &AttributeDef) -> Result<f64> {
    raw.parse::<f64>()
        .map_err(|_| TransformError::TypeConversion {
            attribute: attribute.id.clone(),
            value: raw.to_owned(),
            target: "float",
        })
}

/// Shared scalar cast path: detect null placeholders, then convert.
fn cast_scalar<F>(
    tv: TransformValue,
    attribute: &AttributeDef,
    convert: F,
) -> Result<TransformValue>
where
    F: FnOnce(&str, &AttributeDef) -> Result<Value>,
{
    let raw = match tv.value.as_str() {
        Some(s) => s,
        // A prior cast already produced a typed value; pass it through.
        None => return Ok(tv),
    };
    let original_length = raw.len();
    if is_null_text(raw) {
        return Ok(TransformValue::null(attribute, original_length));
    }
    let value = convert(raw, attribute)?;
    Ok(TransformValue::resolved(value, original_length))
}

/// Shared iterable cast path: detect null, split on the configured
/// separator, trim each token, convert each. Order preserved, never
/// deduplicated.
fn cast_iterable<T, F, W>(
    tv: TransformValue,
    attribute: &AttributeDef,
    step: &TransformStep,
    convert: F,
    wrap: W,
) -> Result<TransformValue>
where
    F: Fn(&str, &AttributeDef) -> Result<T>,
    W: FnOnce(Vec<T>) -> Value,
{
    let raw = expect_str(&tv, attribute, step)?;
    let original_length = raw.len();
    if is_null_text(raw) {
        return Ok(TransformValue::null(attribute, original_length));
    }
    let separator =
        attribute
            .iterable_separator
            .as_deref()
            .ok_or_else(|| TransformError::UnsupportedValue {
                step: step.name(),
                attribute: attribute.id.clone(),
            })?;
    let mut values = Vec::new();
    for token in raw.split(separator) {
        values.push(convert(token.trim(), attribute)?);
    }
    Ok(TransformValue::resolved(wrap(values), original_length))
}

fn normalize_enum(
    tv: TransformValue,
    attribute: &AttributeDef,
    table: &TableSchema,
) -> Result<TransformValue> {
    // The lookup key is the already-cast value, never the raw string.
    let key = match &tv.value {
        Value::String(s) => s.clone(),
        Value::Integer(v) => v.to_string(),
        Value::Float(v) => v.to_string(),
        _ => {
            return Ok(tv);
        }
    };
    match table.normalize_enum(&attribute.id, &key) {
        Some(canonical) => Ok(TransformValue {
            value: Value::String(canonical.to_owned()),
            ..tv
        }),
        // Unmapped tokens pass through unchanged.
        None => Ok(tv),
    }
}

fn strip_whitespace(
    tv: TransformValue,
    attribute: &AttributeDef,
    step: &TransformStep,
) -> Result<TransformValue> {
    let raw = expect_str(&tv, attribute, step)?;
    let stripped: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(TransformValue {
        value: Value::String(stripped),
        ..tv
    })
}

fn truncate_width(
    tv: TransformValue,
    attribute: &AttributeDef,
    step: &TransformStep,
) -> Result<TransformValue> {
    let Some(max_width) = attribute.max_width else {
        return Ok(tv);
    };
    let raw = expect_str(&tv, attribute, step)?;
    if raw.chars().count() <= max_width {
        return Ok(tv);
    }
    let clipped: String = raw.chars().take(max_width).collect();
    Ok(TransformValue {
        value: Value::String(clipped),
        ..tv
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdp_model::SemanticType;
    use std::collections::HashMap;

    fn string_attr() -> AttributeDef {
        AttributeDef::new("NAME", "name", SemanticType::String)
    }

    fn table() -> TableSchema {
        TableSchema::new("T1", "widget")
    }

    fn run(step: TransformStep, attr: &AttributeDef, raw: &str) -> TransformValue {
        step.apply(TransformValue::from_raw(raw, attr), attr, &table())
            .unwrap()
    }

    #[test]
    fn placeholders_resolve_to_sentinel() {
        let attr = string_attr().with_null_sentinel(Value::String("N/A".into()));
        for raw in ["?", "."] {
            let tv = run(TransformStep::CastString, &attr, raw);
            assert!(tv.is_null);
            assert_eq!(tv.value, Value::String("N/A".into()));
            assert_eq!(tv.original_length, 1);
        }
        // Empty input is resolved when the pipeline value is seeded.
        let tv = TransformValue::from_raw("", &attr);
        assert!(tv.is_null);
        assert_eq!(tv.value, Value::String("N/A".into()));
    }

    #[test]
    fn null_flag_is_monotonic() {
        let attr = string_attr().with_max_width(2);
        let tv = run(TransformStep::CastString, &attr, "?");
        // Later steps must not alter the carried sentinel.
        let after = TransformStep::TruncateWidth
            .apply(tv.clone(), &attr, &table())
            .unwrap();
        assert_eq!(after, tv);
    }

    #[test]
    fn integer_cast_parses_or_fails() {
        let attr = AttributeDef::new("ID", "id", SemanticType::Integer);
        let tv = run(TransformStep::CastInteger, &attr, "42");
        assert_eq!(tv.value, Value::Integer(42));

        let err = TransformStep::CastInteger
            .apply(TransformValue::from_raw("4x", &attr), &attr, &table())
            .unwrap_err();
        assert!(matches!(err, TransformError::TypeConversion { .. }));
    }

    #[test]
    fn iterable_integer_trims_token_whitespace() {
        let attr =
            AttributeDef::new("COUNTS", "counts", SemanticType::Integer).with_separator(",");
        let tv = run(TransformStep::CastIterableInteger, &attr, "1, 2,3");
        assert_eq!(tv.value, Value::IntegerList(vec![1, 2, 3]));
    }

    #[test]
    fn iterable_preserves_order_and_duplicates() {
        let attr = AttributeDef::new("TAGS", "tags", SemanticType::String).with_separator(";");
        let tv = run(TransformStep::CastIterableString, &attr, "b;a;b");
        assert_eq!(
            tv.value,
            Value::StringList(vec!["b".into(), "a".into(), "b".into()])
        );
    }

    #[test]
    fn enum_lookup_uses_cast_value() {
        let mut map = HashMap::new();
        map.insert("1".to_owned(), "ONE".to_owned());
        let table = TableSchema::new("T1", "widget").with_enum_map("LEVEL", map);
        let attr =
            AttributeDef::new("LEVEL", "level", SemanticType::Integer).with_enumerated();

        let cast = TransformStep::CastInteger
            .apply(TransformValue::from_raw("1", &attr), &attr, &table)
            .unwrap();
        assert_eq!(cast.value, Value::Integer(1));
        let normalized = TransformStep::NormalizeEnum
            .apply(cast, &attr, &table)
            .unwrap();
        assert_eq!(normalized.value, Value::String("ONE".into()));
    }

    #[test]
    fn unmapped_enum_passes_through() {
        let attr = string_attr().with_enumerated();
        let tv = run(TransformStep::CastString, &attr, "mauve");
        let normalized = TransformStep::NormalizeEnum
            .apply(tv, &attr, &table())
            .unwrap();
        assert_eq!(normalized.value, Value::String("mauve".into()));
    }

    #[test]
    fn strip_removes_interior_whitespace() {
        let attr = string_attr().with_filter(sdp_model::FilterTag::StripWhitespace);
        let tv = run(TransformStep::CastString, &attr, "a b\tc d");
        let stripped = TransformStep::StripWhitespace
            .apply(tv, &attr, &table())
            .unwrap();
        assert_eq!(stripped.value, Value::String("abcd".into()));
    }

    #[test]
    fn truncate_is_idempotent() {
        let attr = string_attr().with_max_width(5);
        let tv = run(TransformStep::CastString, &attr, "Wonderful Widget");
        let once = TransformStep::TruncateWidth
            .apply(tv, &attr, &table())
            .unwrap();
        assert_eq!(once.value, Value::String("Wonde".into()));
        let twice = TransformStep::TruncateWidth
            .apply(once.clone(), &attr, &table())
            .unwrap();
        assert_eq!(twice, once);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let attr = string_attr().with_max_width(2);
        let tv = run(TransformStep::CastString, &attr, "héllo");
        let clipped = TransformStep::TruncateWidth
            .apply(tv, &attr, &table())
            .unwrap();
        assert_eq!(clipped.value, Value::String("hé".into()));
    }

    #[test]
    fn original_length_records_raw_length() {
        let attr = string_attr().with_max_width(3);
        let tv = run(TransformStep::CastString, &attr, "abcdef");
        assert_eq!(tv.original_length, 6);
        let clipped = TransformStep::TruncateWidth
            .apply(tv, &attr, &table())
            .unwrap();
        assert_eq!(clipped.original_length, 6);
    }
}
