//! Typed collection-shaping configuration.
//!
//! One static tree describes the collection roster per schema and,
//! per target collection: content filters, index definitions, private
//! keys, sub-category aggregates, nesting promotion rules, and search
//! metadata. The tree arrives already
//! deserialized (loading it from disk is a collaborator's job).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Include/exclude/slice content filter for one collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentFilter {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub slice: Option<String>,
}

/// One versioned collection produced from a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// Per-category attribute exclusion applied during document assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeContentFilter {
    pub category_name: String,
    #[serde(default)]
    pub attribute_name_list: Vec<String>,
}

/// A named index over an ordered attribute-name list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexDef {
    pub name: String,
    #[serde(default)]
    pub attribute_names: Vec<String>,
}

/// A private (non-schema) document attribute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivateKeyDef {
    pub private_document_name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub attribute: Option<String>,
}

/// Sub-category aggregate descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubCategoryAggregate {
    pub name: String,
    #[serde(default)]
    pub has_unit_cardinality: bool,
}

/// Category nesting promotion rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryNestedDef {
    pub category: String,
    pub name: String,
    #[serde(default)]
    pub context_attribute_names: Vec<String>,
}

/// Sub-category nesting promotion rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubCategoryNestedDef {
    pub category: String,
    pub subcategory: String,
    #[serde(default)]
    pub context_attribute_names: Vec<String>,
}

/// Parent/child category relationship suppressed during assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRelationshipDef {
    pub parent_category_name: String,
    pub child_category_name: String,
}

/// Declared search type for text indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchType {
    DefaultMatch,
    ExactMatch,
    FullText,
    Suggest,
}

/// Search-context declaration: one search type over dotted
/// `category.attribute` paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchContextDef {
    pub search_type: SearchType,
    #[serde(default)]
    pub attribute_names: Vec<String>,
}

/// Explicit search-priority assignment for a dotted attribute path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPriorityDef {
    pub attribute_name: String,
    pub priority_value: u32,
}

/// Brief text description for a dotted attribute path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeDescriptionDef {
    pub attribute_name: String,
    #[serde(rename = "type", default = "default_description_type")]
    pub description_type: String,
    pub text: String,
}

fn default_description_type() -> String {
    "brief".to_owned()
}

/// The full collection-shaping configuration tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentConfig {
    #[serde(default)]
    pub document_collection_names: HashMap<String, Vec<CollectionInfo>>,
    #[serde(default)]
    pub collection_content_filters: HashMap<String, ContentFilter>,
    #[serde(default)]
    pub collection_attribute_content_filters: HashMap<String, Vec<AttributeContentFilter>>,
    #[serde(default)]
    pub collection_indices: HashMap<String, Vec<IndexDef>>,
    #[serde(default)]
    pub collection_private_keys: HashMap<String, Vec<PrivateKeyDef>>,
    #[serde(default)]
    pub collection_subcategory_aggregates: HashMap<String, Vec<SubCategoryAggregate>>,
    #[serde(default)]
    pub collection_retain_singleton: HashMap<String, bool>,
    #[serde(default)]
    pub collection_category_nested: HashMap<String, Vec<CategoryNestedDef>>,
    #[serde(default)]
    pub collection_subcategory_nested: HashMap<String, Vec<SubCategoryNestedDef>>,
    #[serde(default)]
    pub collection_suppress_category_relationships:
        HashMap<String, Vec<CategoryRelationshipDef>>,
    #[serde(default)]
    pub collection_attribute_search_contexts: HashMap<String, Vec<SearchContextDef>>,
    #[serde(default)]
    pub collection_attribute_search_priority: HashMap<String, Vec<SearchPriorityDef>>,
    #[serde(default)]
    pub attribute_descriptions: Vec<AttributeDescriptionDef>,
}

impl DocumentConfig {
    /// Deserialize from an already-loaded JSON tree.
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

/// Split a dotted `category.attribute` path.
///
/// Returns `None` (with a log) for paths that do not split into
/// exactly two parts.
pub(crate) fn split_attribute_path(path: &str) -> Option<(&str, &str)> {
    let mut parts = path.split('.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(category), Some(attribute), None) if !category.is_empty() && !attribute.is_empty() => {
            Some((category, attribute))
        }
        _ => {
            tracing::error!(path, "bad dotted attribute name, skipping");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn config_deserializes_from_json_tree() {
        let config = DocumentConfig::from_json(json!({
            "collection_content_filters": {
                "core_entry": {"include": ["citation"], "slice": "entry"}
            },
            "collection_indices": {
                "core_entry": [
                    {"name": "primary", "attribute_names": ["entry.id"]},
                    {"name": "by_date", "attribute_names": []}
                ]
            },
            "collection_attribute_search_contexts": {
                "core_entry": [
                    {"search_type": "exact-match", "attribute_names": ["entry.id"]}
                ]
            }
        }))
        .unwrap();

        assert_eq!(
            config.collection_content_filters["core_entry"].include,
            vec!["citation"]
        );
        assert_eq!(config.collection_indices["core_entry"].len(), 2);
        assert_eq!(
            config.collection_attribute_search_contexts["core_entry"][0].search_type,
            SearchType::ExactMatch
        );
    }

    #[test]
    fn attribute_path_splitting() {
        assert_eq!(split_attribute_path("cat.attr"), Some(("cat", "attr")));
        assert_eq!(split_attribute_path("cat"), None);
        assert_eq!(split_attribute_path("a.b.c"), None);
        assert_eq!(split_attribute_path(".attr"), None);
    }
}
