//! Read-through cached accessors over the collection-shaping
//! configuration.
//!
//! Every accessor fails soft: a missing or malformed entry yields an
//! empty/`false`/`None` default with a debug log, which callers treat
//! as "no rule configured". Structural problems worth rejecting
//! (include/exclude overlap, malformed dotted paths) are reported by
//! [`DocumentDefinitionHelper::validate`] instead of being guessed
//! around at read time.

use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;
use thiserror::Error;

use crate::config::{
    split_attribute_path, CategoryRelationshipDef, CollectionInfo, DocumentConfig, IndexDef,
    PrivateKeyDef, SearchType, SubCategoryAggregate,
};

/// Structural configuration errors surfaced by validation.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The same identifier appears in both include and exclude lists.
    #[error("collection {collection} lists identifiers in both include and exclude: {identifiers:?}")]
    IncludeExcludeOverlap {
        collection: String,
        identifiers: Vec<String>,
    },

    /// A dotted attribute path does not split into category.attribute.
    #[error("attribute path {path:?} does not split into category.attribute")]
    MalformedAttributePath { path: String },

    /// The configuration tree failed to deserialize.
    #[error(transparent)]
    Config(#[from] serde_json::Error),
}

/// Resolved nesting context for a category or sub-category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedContext {
    pub context_name: String,
    pub context_paths: Vec<String>,
    /// First declared path, used as the nesting discriminator.
    pub first_context_path: Option<String>,
}

type SearchContextMap = HashMap<String, HashMap<(String, String), Vec<SearchType>>>;
type SearchPriorityMap = HashMap<String, HashMap<(String, String), u32>>;
type CategoryNestedMap = HashMap<String, HashMap<String, NestedContext>>;
type SubCategoryNestedMap = HashMap<String, HashMap<(String, String), NestedContext>>;
type DescriptionMap = HashMap<(String, String, String), String>;

/// Read-through cache over one static [`DocumentConfig`] tree.
///
/// Derived caches are built lazily on first access behind `OnceLock`,
/// so a helper shared across threads performs each build exactly once.
#[derive(Debug, Default)]
pub struct DocumentDefinitionHelper {
    config: DocumentConfig,
    search_contexts: OnceLock<SearchContextMap>,
    search_priorities: OnceLock<SearchPriorityMap>,
    category_nested: OnceLock<CategoryNestedMap>,
    subcategory_nested: OnceLock<SubCategoryNestedMap>,
    descriptions: OnceLock<DescriptionMap>,
}

impl DocumentDefinitionHelper {
    pub fn new(config: DocumentConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Build from an already-loaded JSON tree.
    pub fn from_json(value: serde_json::Value) -> Result<Self, DocumentError> {
        Ok(Self::new(DocumentConfig::from_json(value)?))
    }

    /// Check structural consistency of the configuration.
    ///
    /// Include/exclude overlap has no defined precedence; it is
    /// rejected here rather than resolved silently.
    pub fn validate(&self) -> Result<(), DocumentError> {
        for (collection, filter) in &self.config.collection_content_filters {
            let include: BTreeSet<String> =
                filter.include.iter().map(|s| s.to_uppercase()).collect();
            let overlap: Vec<String> = filter
                .exclude
                .iter()
                .map(|s| s.to_uppercase())
                .filter(|s| include.contains(s))
                .collect();
            if !overlap.is_empty() {
                return Err(DocumentError::IncludeExcludeOverlap {
                    collection: collection.clone(),
                    identifiers: overlap,
                });
            }
        }
        for defs in self.config.collection_attribute_search_contexts.values() {
            for def in defs {
                for path in &def.attribute_names {
                    if split_attribute_path(path).is_none() {
                        return Err(DocumentError::MalformedAttributePath { path: path.clone() });
                    }
                }
            }
        }
        for defs in self.config.collection_attribute_search_priority.values() {
            for def in defs {
                if split_attribute_path(&def.attribute_name).is_none() {
                    return Err(DocumentError::MalformedAttributePath {
                        path: def.attribute_name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    // ---- collection roster -----------------------------------------------

    /// Versioned collections produced from a schema.
    pub fn collection_info(&self, schema: &str) -> Vec<&CollectionInfo> {
        match self.config.document_collection_names.get(schema) {
            Some(infos) => infos.iter().collect(),
            None => {
                tracing::debug!(schema, "no collections configured");
                Vec::new()
            }
        }
    }

    /// Version string for one collection of a schema.
    pub fn collection_version(&self, schema: &str, collection: &str) -> Option<&str> {
        self.collection_info(schema)
            .into_iter()
            .find(|info| info.name == collection)
            .and_then(|info| info.version.as_deref())
    }

    // ---- content filters -------------------------------------------------

    /// Included schema identifiers for a collection, uppercased.
    pub fn included_attributes(&self, collection: &str) -> Vec<String> {
        match self.config.collection_content_filters.get(collection) {
            Some(filter) => filter.include.iter().map(|s| s.to_uppercase()).collect(),
            None => {
                tracing::debug!(collection, "no content filter configured");
                Vec::new()
            }
        }
    }

    /// Excluded schema identifiers for a collection, uppercased.
    pub fn excluded_attributes(&self, collection: &str) -> Vec<String> {
        match self.config.collection_content_filters.get(collection) {
            Some(filter) => filter.exclude.iter().map(|s| s.to_uppercase()).collect(),
            None => {
                tracing::debug!(collection, "no content filter configured");
                Vec::new()
            }
        }
    }

    /// Optional slice filter name for a collection.
    pub fn slice_filter(&self, collection: &str) -> Option<&str> {
        self.config
            .collection_content_filters
            .get(collection)
            .and_then(|filter| filter.slice.as_deref())
    }

    /// (category, attribute) pairs excluded from a collection's documents.
    pub fn document_excluded_attributes(&self, collection: &str) -> Vec<(&str, &str)> {
        match self
            .config
            .collection_attribute_content_filters
            .get(collection)
        {
            Some(filters) => filters
                .iter()
                .flat_map(|f| {
                    f.attribute_name_list
                        .iter()
                        .map(|a| (f.category_name.as_str(), a.as_str()))
                })
                .collect(),
            None => {
                tracing::debug!(collection, "no attribute content filters configured");
                Vec::new()
            }
        }
    }

    // ---- indices ---------------------------------------------------------

    /// All indices for a collection; indices with an empty attribute
    /// list are filtered out.
    pub fn document_indices(&self, collection: &str) -> Vec<&IndexDef> {
        match self.config.collection_indices.get(collection) {
            Some(defs) => defs
                .iter()
                .filter(|d| !d.attribute_names.is_empty())
                .collect(),
            None => {
                tracing::debug!(collection, "no indices configured");
                Vec::new()
            }
        }
    }

    /// Attribute names of a named index.
    pub fn index_attributes(&self, collection: &str, index_name: &str) -> Vec<String> {
        self.config
            .collection_indices
            .get(collection)
            .and_then(|defs| defs.iter().find(|d| d.name == index_name))
            .map(|d| d.attribute_names.clone())
            .unwrap_or_default()
    }

    /// Attribute names of the `primary` index.
    pub fn key_attribute_names(&self, collection: &str) -> Vec<String> {
        self.index_attributes(collection, "primary")
    }

    /// Attribute names of the `replace` index, falling back to `primary`.
    pub fn replace_attribute_names(&self, collection: &str) -> Vec<String> {
        let replace = self.index_attributes(collection, "replace");
        if !replace.is_empty() {
            return replace;
        }
        self.key_attribute_names(collection)
    }

    // ---- private keys and aggregates ------------------------------------

    /// Private document attributes with a non-empty document name.
    pub fn private_document_attributes(&self, collection: &str) -> Vec<&PrivateKeyDef> {
        match self.config.collection_private_keys.get(collection) {
            Some(defs) => defs
                .iter()
                .filter(|d| !d.private_document_name.is_empty())
                .collect(),
            None => {
                tracing::debug!(collection, "no private keys configured");
                Vec::new()
            }
        }
    }

    /// Names of sub-category aggregates for a collection.
    pub fn sub_category_aggregates(&self, collection: &str) -> Vec<&str> {
        self.sub_category_aggregate_features(collection)
            .into_iter()
            .map(|d| d.name.as_str())
            .collect()
    }

    /// Full sub-category aggregate descriptors for a collection.
    pub fn sub_category_aggregate_features(&self, collection: &str) -> Vec<&SubCategoryAggregate> {
        match self.config.collection_subcategory_aggregates.get(collection) {
            Some(defs) => defs.iter().collect(),
            None => {
                tracing::debug!(collection, "no subcategory aggregates configured");
                Vec::new()
            }
        }
    }

    /// Unit-cardinality flag for one sub-category aggregate.
    pub fn sub_category_unit_cardinality(&self, collection: &str, subcategory: &str) -> bool {
        self.sub_category_aggregate_features(collection)
            .into_iter()
            .find(|d| d.name == subcategory)
            .map(|d| d.has_unit_cardinality)
            .unwrap_or(false)
    }

    /// Whether singleton objects are retained rather than expanded.
    pub fn retain_singleton_objects(&self, collection: &str) -> bool {
        self.config
            .collection_retain_singleton
            .get(collection)
            .copied()
            .unwrap_or(false)
    }

    /// Parent/child category relationships suppressed during assembly.
    pub fn suppressed_category_relationships(
        &self,
        collection: &str,
    ) -> Vec<&CategoryRelationshipDef> {
        match self
            .config
            .collection_suppress_category_relationships
            .get(collection)
        {
            Some(defs) => defs.iter().collect(),
            None => {
                tracing::debug!(collection, "no suppressed relationships configured");
                Vec::new()
            }
        }
    }

    // ---- nesting ---------------------------------------------------------

    fn category_nested_map(&self) -> &CategoryNestedMap {
        self.category_nested.get_or_init(|| {
            let mut map = CategoryNestedMap::new();
            for (collection, defs) in &self.config.collection_category_nested {
                let mut by_category = HashMap::new();
                for def in defs {
                    by_category.insert(
                        def.category.clone(),
                        NestedContext {
                            context_name: def.name.clone(),
                            context_paths: def.context_attribute_names.clone(),
                            first_context_path: def.context_attribute_names.first().cloned(),
                        },
                    );
                }
                map.insert(collection.clone(), by_category);
            }
            map
        })
    }

    /// Whether a category is nested within a collection.
    pub fn is_category_nested(&self, collection: &str, category: &str) -> bool {
        self.category_nested_map()
            .get(collection)
            .is_some_and(|m| m.contains_key(category))
    }

    /// Nesting context for a category, if configured.
    pub fn category_nested_context(&self, collection: &str, category: &str) -> Option<&NestedContext> {
        self.category_nested_map()
            .get(collection)
            .and_then(|m| m.get(category))
    }

    fn subcategory_nested_map(&self) -> &SubCategoryNestedMap {
        self.subcategory_nested.get_or_init(|| {
            let mut map = SubCategoryNestedMap::new();
            for (collection, defs) in &self.config.collection_subcategory_nested {
                let mut by_pair = HashMap::new();
                for def in defs {
                    by_pair.insert(
                        (def.category.clone(), def.subcategory.clone()),
                        NestedContext {
                            context_name: def.subcategory.clone(),
                            context_paths: def.context_attribute_names.clone(),
                            first_context_path: def.context_attribute_names.first().cloned(),
                        },
                    );
                }
                map.insert(collection.clone(), by_pair);
            }
            map
        })
    }

    /// Whether a (category, sub-category) pair is nested within a collection.
    pub fn is_sub_category_nested(
        &self,
        collection: &str,
        category: &str,
        subcategory: &str,
    ) -> bool {
        self.sub_category_nested_context(collection, category, subcategory)
            .is_some()
    }

    /// Nesting context for a (category, sub-category) pair, if configured.
    pub fn sub_category_nested_context(
        &self,
        collection: &str,
        category: &str,
        subcategory: &str,
    ) -> Option<&NestedContext> {
        self.subcategory_nested_map()
            .get(collection)
            .and_then(|m| m.get(&(category.to_owned(), subcategory.to_owned())))
    }

    // ---- search metadata -------------------------------------------------

    fn search_context_map(&self) -> &SearchContextMap {
        self.search_contexts.get_or_init(|| {
            let mut map = SearchContextMap::new();
            for (collection, defs) in &self.config.collection_attribute_search_contexts {
                let mut by_item: HashMap<(String, String), BTreeSet<SearchType>> = HashMap::new();
                for def in defs {
                    for path in &def.attribute_names {
                        let Some((category, attribute)) = split_attribute_path(path) else {
                            continue;
                        };
                        by_item
                            .entry((category.to_owned(), attribute.to_owned()))
                            .or_default()
                            .insert(def.search_type);
                    }
                }
                map.insert(
                    collection.clone(),
                    by_item
                        .into_iter()
                        .map(|(item, types)| (item, types.into_iter().collect()))
                        .collect(),
                );
            }
            map
        })
    }

    /// Declared search types for a (collection, category, attribute)
    /// item, deduplicated and sorted.
    pub fn attribute_search_contexts(
        &self,
        collection: &str,
        category: &str,
        attribute: &str,
    ) -> Vec<SearchType> {
        self.search_context_map()
            .get(collection)
            .and_then(|m| m.get(&(category.to_owned(), attribute.to_owned())))
            .cloned()
            .unwrap_or_default()
    }

    fn search_priority_map(&self) -> &SearchPriorityMap {
        self.search_priorities.get_or_init(|| {
            let mut map = SearchPriorityMap::new();
            for (collection, defs) in &self.config.collection_attribute_search_priority {
                let mut by_item = HashMap::new();
                for def in defs {
                    let Some((category, attribute)) = split_attribute_path(&def.attribute_name)
                    else {
                        continue;
                    };
                    by_item.insert(
                        (category.to_owned(), attribute.to_owned()),
                        def.priority_value,
                    );
                }
                map.insert(collection.clone(), by_item);
            }
            map
        })
    }

    /// Numeric text-search priority for an item.
    ///
    /// An explicit configured priority wins; otherwise the declared
    /// search contexts imply suggest > exact-match > full-text; items
    /// with neither get no priority.
    pub fn attribute_search_priority(
        &self,
        collection: &str,
        category: &str,
        attribute: &str,
    ) -> Option<u32> {
        if let Some(priority) = self
            .search_priority_map()
            .get(collection)
            .and_then(|m| m.get(&(category.to_owned(), attribute.to_owned())))
        {
            return Some(*priority);
        }
        let contexts = self.attribute_search_contexts(collection, category, attribute);
        if contexts.contains(&SearchType::Suggest) {
            Some(20)
        } else if contexts.contains(&SearchType::ExactMatch) {
            Some(10)
        } else if contexts.contains(&SearchType::FullText) {
            Some(1)
        } else {
            None
        }
    }

    fn description_map(&self) -> &DescriptionMap {
        self.descriptions.get_or_init(|| {
            let mut map = DescriptionMap::new();
            for def in &self.config.attribute_descriptions {
                let Some((category, attribute)) = split_attribute_path(&def.attribute_name)
                else {
                    continue;
                };
                map.insert(
                    (
                        category.to_owned(),
                        attribute.to_owned(),
                        def.description_type.clone(),
                    ),
                    def.text.clone(),
                );
            }
            map
        })
    }

    /// Text description for an attribute, by description type.
    pub fn attribute_description(
        &self,
        category: &str,
        attribute: &str,
        description_type: &str,
    ) -> Option<&str> {
        self.description_map()
            .get(&(
                category.to_owned(),
                attribute.to_owned(),
                description_type.to_owned(),
            ))
            .map(String::as_str)
    }
}
