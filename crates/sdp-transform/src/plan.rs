//! Transform plan derivation and the per-table plan cache.
//!
//! A [`TransformPlan`] is derived once per table from the schema
//! catalog and a set of enabled [`TransformFlags`], then replayed
//! unchanged across every record for that table. The
//! [`TransformFactory`] builds every table's plan eagerly at
//! construction, in one build-then-publish step, so readers never
//! observe a partially built plan and a build failure surfaces before
//! any record is processed.

use serde::{Deserialize, Serialize};
use sdp_model::{AttributeDef, SchemaCatalog, SemanticType, TableSchema, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Result, TransformError};
use crate::step::TransformStep;

/// Named boolean flags controlling plan derivation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformFlags {
    /// Omit null-valued attributes from output documents entirely.
    pub drop_empty: bool,
    /// Skip width truncation for the whole table set.
    pub skip_max_width: bool,
    /// Cast date attributes to in-memory date values instead of ISO strings.
    pub assign_dates_as_objects: bool,
    /// Decompose iterable attributes into typed sequences.
    pub convert_iterables: bool,
    /// Canonicalize enumerated values after casting.
    pub normalize_enums: bool,
}

impl TransformFlags {
    /// Parse the external filter-type name set.
    ///
    /// Unrecognized names are ignored; date normalization to ISO is
    /// implicit and always on unless `assign-dates` takes precedence
    /// for an attribute.
    pub fn from_filter_names<'a, I>(names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut flags = Self::default();
        for name in names {
            match name {
                "drop-empty-attributes" => flags.drop_empty = true,
                "skip-max-width" => flags.skip_max_width = true,
                "assign-dates" => flags.assign_dates_as_objects = true,
                "convert-iterables" => flags.convert_iterables = true,
                "normalize-enums" => flags.normalize_enums = true,
                other => {
                    tracing::debug!(filter = other, "unrecognized transform filter name");
                }
            }
        }
        flags
    }
}

/// Precomputed transform plan for one table.
///
/// Immutable after construction. Step sequences are keyed by output
/// attribute name; iteration order within a sequence is significant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransformPlan {
    /// Ordered step sequence per output attribute name.
    pub steps: HashMap<String, Vec<TransformStep>>,
    /// Attribute descriptors per output attribute name, so record
    /// replay resolves each cell in constant time.
    pub attributes: HashMap<String, AttributeDef>,
    /// Null sentinel per output attribute name.
    pub null_values: HashMap<String, Value>,
    /// Attribute identifier -> output name.
    pub id_to_name: HashMap<String, String>,
    /// Output name -> attribute identifier.
    pub name_to_id: HashMap<String, String>,
}

impl TransformPlan {
    /// Derive the plan for one table.
    ///
    /// Attributes with no mapping correspondence (`Other`) are omitted
    /// entirely; they must not appear in output documents. A table
    /// with zero plannable attributes produces a valid empty plan.
    pub fn build(table: &TableSchema, flags: TransformFlags) -> Self {
        let mut steps = HashMap::new();
        let mut attributes = HashMap::new();
        for attribute in &table.attributes {
            if attribute.semantic_type == SemanticType::Other {
                continue;
            }
            steps.insert(
                attribute.output_name.clone(),
                Self::derive_steps(attribute, flags),
            );
            attributes.insert(attribute.output_name.clone(), attribute.clone());
        }
        Self {
            steps,
            attributes,
            null_values: table.null_value_map(),
            id_to_name: table.id_to_name(),
            name_to_id: table.name_to_id(),
        }
    }

    /// Ordered step sequence for one attribute.
    fn derive_steps(attribute: &AttributeDef, flags: TransformFlags) -> Vec<TransformStep> {
        let mut steps = Vec::new();
        if flags.convert_iterables && attribute.is_iterable() {
            // Iterable date/enum casting is unsupported.
            match attribute.semantic_type {
                SemanticType::String => steps.push(TransformStep::CastIterableString),
                SemanticType::Integer => steps.push(TransformStep::CastIterableInteger),
                SemanticType::Float => steps.push(TransformStep::CastIterableFloat),
                SemanticType::Date | SemanticType::DateTime | SemanticType::Other => {}
            }
        } else {
            match attribute.semantic_type {
                SemanticType::String => {
                    steps.push(TransformStep::CastString);
                    if !flags.skip_max_width {
                        steps.push(TransformStep::TruncateWidth);
                    }
                    for tag in &attribute.filter_tags {
                        match tag {
                            sdp_model::FilterTag::StripWhitespace => {
                                steps.push(TransformStep::StripWhitespace);
                            }
                        }
                    }
                }
                SemanticType::Integer => steps.push(TransformStep::CastInteger),
                SemanticType::Float => steps.push(TransformStep::CastFloat),
                SemanticType::Date | SemanticType::DateTime
                    if flags.assign_dates_as_objects =>
                {
                    steps.push(TransformStep::CastDateToObject);
                }
                SemanticType::DateTime => steps.push(TransformStep::CastDateTimeToIso),
                SemanticType::Date => steps.push(TransformStep::CastDateToIso),
                SemanticType::Other => steps.push(TransformStep::CastString),
            }
        }
        if flags.normalize_enums && attribute.enumerated {
            // Always last: normalization sees an already-cast value.
            steps.push(TransformStep::NormalizeEnum);
        }
        steps
    }

    /// Whether the plan recognizes an output attribute name.
    pub fn contains(&self, output_name: &str) -> bool {
        self.steps.contains_key(output_name)
    }

    /// Cached descriptor for an output attribute name.
    pub fn attribute(&self, output_name: &str) -> Option<&AttributeDef> {
        self.attributes.get(output_name)
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Eager-built cache of one [`TransformPlan`] per table.
///
/// Plan construction is a pure function of (catalog, flags) and is
/// idempotent; each worker owns its own factory, so no locking is
/// needed. Plans sit behind `Arc` so cloning the factory per worker is
/// cheap.
#[derive(Debug, Clone)]
pub struct TransformFactory {
    catalog: Arc<SchemaCatalog>,
    flags: TransformFlags,
    plans: HashMap<String, Arc<TransformPlan>>,
}

impl TransformFactory {
    /// Build plans for every table in the catalog.
    ///
    /// A failure for any table propagates here, before any record is
    /// processed; an all-empty plan map can only mean an empty catalog.
    pub fn new(catalog: Arc<SchemaCatalog>, flags: TransformFlags) -> Result<Self> {
        let mut plans = HashMap::new();
        for table_id in catalog.table_ids() {
            let table = catalog
                .table(table_id)
                .map_err(|source| TransformError::PlanBuild {
                    table: table_id.to_owned(),
                    source,
                })?;
            plans.insert(
                table_id.to_owned(),
                Arc::new(TransformPlan::build(table, flags)),
            );
        }
        Ok(Self {
            catalog,
            flags,
            plans,
        })
    }

    /// The flags this factory was built with.
    pub fn flags(&self) -> TransformFlags {
        self.flags
    }

    /// The schema catalog backing the plans.
    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }

    /// Fetch the plan for a table.
    ///
    /// A missing plan is [`TransformError::PlanNotBuilt`], never an
    /// empty default: an empty plan is reserved for tables that really
    /// have no plannable attributes.
    pub fn plan(&self, table_id: &str) -> Result<&TransformPlan> {
        self.plans
            .get(table_id)
            .map(Arc::as_ref)
            .ok_or_else(|| TransformError::PlanNotBuilt {
                table: table_id.to_owned(),
            })
    }

    /// Shared handle to a table's plan.
    pub fn plan_arc(&self, table_id: &str) -> Result<Arc<TransformPlan>> {
        self.plans
            .get(table_id)
            .cloned()
            .ok_or_else(|| TransformError::PlanNotBuilt {
                table: table_id.to_owned(),
            })
    }
}
