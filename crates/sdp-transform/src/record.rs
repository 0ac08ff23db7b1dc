//! Record-level transformation: positional raw values to an output
//! document.
//!
//! A record arrives as an ordered list of raw cells aligned to an
//! attribute-name list. Each recognized position is run through its
//! attribute's cached step sequence; a malformed cell never aborts the
//! record: the failure is logged, surfaced in the output, and the
//! remaining attributes complete best-effort.

use sdp_model::Value;
use std::collections::BTreeMap;

use crate::error::{Result, TransformError};
use crate::plan::TransformFactory;
use crate::step::TransformValue;

/// Failure of one attribute within one record.
#[derive(Debug, Clone)]
pub struct AttributeFailure {
    /// Output attribute name of the failed cell.
    pub attribute: String,
    pub error: TransformError,
}

/// Transformed document for one record.
///
/// `document` uses a `BTreeMap` so iteration (and serialization) is
/// deterministic for identical inputs.
#[derive(Debug, Clone, Default)]
pub struct RecordOutput {
    pub document: BTreeMap<String, Value>,
    /// Attributes that failed transformation; the rest of the record
    /// is still populated. Callers apply their own accept/reject policy.
    pub failures: Vec<AttributeFailure>,
}

impl RecordOutput {
    /// True when every recognized attribute transformed cleanly.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Replays cached per-table plans across records.
#[derive(Debug, Clone)]
pub struct RecordTransformer<'a> {
    factory: &'a TransformFactory,
}

impl<'a> RecordTransformer<'a> {
    pub fn new(factory: &'a TransformFactory) -> Self {
        Self { factory }
    }

    /// Transform one positional record for a table.
    ///
    /// `raw_values` must align one-to-one with `attribute_names`.
    /// Positions whose name the plan does not recognize are silently
    /// skipped, which supports wide input records with extra columns.
    pub fn transform_record(
        &self,
        table_id: &str,
        raw_values: &[&str],
        attribute_names: &[&str],
    ) -> Result<RecordOutput> {
        let plan = self.factory.plan(table_id)?;
        let table = self.factory.catalog().table(table_id)?;
        let flags = self.factory.flags();

        if raw_values.len() != attribute_names.len() {
            return Err(TransformError::RecordShape {
                expected: attribute_names.len(),
                actual: raw_values.len(),
            });
        }

        // Base document: every known attribute present with its
        // sentinel, unless drop-empty starts from nothing.
        let mut document: BTreeMap<String, Value> = if flags.drop_empty {
            BTreeMap::new()
        } else {
            plan.null_values
                .iter()
                .filter(|(name, _)| plan.contains(name))
                .map(|(name, sentinel)| (name.clone(), sentinel.clone()))
                .collect()
        };
        let mut failures = Vec::new();

        'record: for (raw, name) in raw_values.iter().zip(attribute_names) {
            let Some(steps) = plan.steps.get(*name) else {
                continue;
            };
            let Some(attribute) = plan.attribute(name) else {
                continue;
            };

            let mut tv = TransformValue::from_raw(raw, attribute);
            for step in steps {
                match step.apply(tv, attribute, table) {
                    Ok(next) => tv = next,
                    Err(error) => {
                        tracing::warn!(
                            table = table_id,
                            attribute = attribute.output_name.as_str(),
                            %error,
                            "attribute transform failed, continuing record"
                        );
                        failures.push(AttributeFailure {
                            attribute: attribute.output_name.clone(),
                            error,
                        });
                        continue 'record;
                    }
                }
            }
            if flags.drop_empty && tv.is_null {
                document.remove(&attribute.output_name);
                continue;
            }
            document.insert(attribute.output_name.clone(), tv.value);
        }

        Ok(RecordOutput { document, failures })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::TransformFlags;
    use sdp_model::{AttributeDef, SchemaCatalog, SemanticType, TableSchema};
    use std::sync::Arc;

    fn widget_catalog() -> Arc<SchemaCatalog> {
        let table = TableSchema::new("WIDGET", "widget")
            .with_attribute(AttributeDef::new("ID", "id", SemanticType::Integer))
            .with_attribute(
                AttributeDef::new("NAME", "name", SemanticType::String).with_max_width(5),
            )
            .with_attribute(
                AttributeDef::new("TAGS", "tags", SemanticType::String).with_separator(";"),
            );
        Arc::new(SchemaCatalog::new().with_table(table))
    }

    fn factory(flags: TransformFlags) -> TransformFactory {
        TransformFactory::new(widget_catalog(), flags).unwrap()
    }

    #[test]
    fn end_to_end_widget_record() {
        let factory = factory(TransformFlags {
            convert_iterables: true,
            ..Default::default()
        });
        let transformer = RecordTransformer::new(&factory);
        let out = transformer
            .transform_record(
                "WIDGET",
                &["42", "Wonderful Widget", "red;blue; green"],
                &["id", "name", "tags"],
            )
            .unwrap();

        assert!(out.is_complete());
        assert_eq!(out.document["id"], Value::Integer(42));
        assert_eq!(out.document["name"], Value::String("Wonde".into()));
        assert_eq!(
            out.document["tags"],
            Value::StringList(vec!["red".into(), "blue".into(), "green".into()])
        );
    }

    #[test]
    fn unrecognized_positions_are_skipped() {
        let factory = factory(TransformFlags::default());
        let transformer = RecordTransformer::new(&factory);
        let out = transformer
            .transform_record("WIDGET", &["42", "zzz"], &["id", "extra_column"])
            .unwrap();
        assert_eq!(out.document["id"], Value::Integer(42));
        assert!(!out.document.contains_key("extra_column"));
    }

    #[test]
    fn shape_mismatch_is_an_error() {
        let factory = factory(TransformFlags::default());
        let transformer = RecordTransformer::new(&factory);
        let err = transformer
            .transform_record("WIDGET", &["42"], &["id", "name"])
            .unwrap_err();
        assert!(matches!(err, TransformError::RecordShape { .. }));
    }

    #[test]
    fn null_attribute_kept_with_sentinel_by_default() {
        let factory = factory(TransformFlags::default());
        let transformer = RecordTransformer::new(&factory);
        let out = transformer
            .transform_record("WIDGET", &["42", "?", "a;b"], &["id", "name", "tags"])
            .unwrap();
        assert_eq!(out.document["name"], Value::String(String::new()));
    }

    #[test]
    fn drop_empty_omits_null_attributes() {
        let factory = factory(TransformFlags {
            drop_empty: true,
            ..Default::default()
        });
        let transformer = RecordTransformer::new(&factory);
        let out = transformer
            .transform_record("WIDGET", &["42", "", "a;b"], &["id", "name", "tags"])
            .unwrap();
        assert!(!out.document.contains_key("name"));
        assert_eq!(out.document["id"], Value::Integer(42));
    }

    #[test]
    fn absent_attributes_seeded_with_sentinels() {
        let factory = factory(TransformFlags::default());
        let transformer = RecordTransformer::new(&factory);
        let out = transformer
            .transform_record("WIDGET", &["42"], &["id"])
            .unwrap();
        // name and tags never appeared in the input but are present.
        assert_eq!(out.document["name"], Value::String(String::new()));
        assert_eq!(out.document["tags"], Value::String(String::new()));
    }

    #[test]
    fn one_bad_cell_leaves_siblings_intact() {
        let factory = factory(TransformFlags::default());
        let transformer = RecordTransformer::new(&factory);
        let out = transformer
            .transform_record(
                "WIDGET",
                &["not-a-number", "Widget", "a;b"],
                &["id", "name", "tags"],
            )
            .unwrap();
        assert!(!out.is_complete());
        assert_eq!(out.failures.len(), 1);
        assert_eq!(out.failures[0].attribute, "id");
        assert_eq!(out.document["name"], Value::String("Widge".into()));
    }

    #[test]
    fn unknown_table_is_plan_not_built() {
        let factory = factory(TransformFlags::default());
        let transformer = RecordTransformer::new(&factory);
        let err = transformer
            .transform_record("NOPE", &[], &[])
            .unwrap_err();
        assert!(matches!(err, TransformError::PlanNotBuilt { .. }));
    }

    #[test]
    fn transform_is_deterministic() {
        let factory = factory(TransformFlags {
            convert_iterables: true,
            ..Default::default()
        });
        let transformer = RecordTransformer::new(&factory);
        let values = ["7", "Gizmo Prime", "x; y;z"];
        let names = ["id", "name", "tags"];
        let a = transformer
            .transform_record("WIDGET", &values, &names)
            .unwrap();
        let b = transformer
            .transform_record("WIDGET", &values, &names)
            .unwrap();
        assert_eq!(a.document, b.document);
        assert_eq!(
            serde_json::to_string(&a.document).unwrap(),
            serde_json::to_string(&b.document).unwrap()
        );
    }
}
