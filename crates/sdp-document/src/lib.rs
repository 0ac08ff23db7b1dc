//! Collection-shaping configuration for the document-assembly stage.
//!
//! This crate answers "how should this collection's documents be
//! shaped" questions: which source attributes are included or
//! excluded, which attribute lists form key/replace/secondary indices,
//! how categories and sub-categories are nested, and which attributes
//! carry full-text search metadata. It never transforms values.
//!
//! - **config**: the typed, serde-deserialized configuration tree
//! - **helper**: [`DocumentDefinitionHelper`] read-through caches

pub mod config;
pub mod helper;

pub use config::{
    AttributeContentFilter, AttributeDescriptionDef, CategoryNestedDef, CategoryRelationshipDef,
    CollectionInfo, ContentFilter, DocumentConfig, IndexDef, PrivateKeyDef, SearchContextDef,
    SearchPriorityDef, SearchType, SubCategoryAggregate, SubCategoryNestedDef,
};
pub use helper::{DocumentDefinitionHelper, DocumentError, NestedContext};
