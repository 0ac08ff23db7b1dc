//! Schema catalog and value model for schema-driven document prep.
//!
//! This crate defines the read-only schema contract consumed by the
//! transformation core:
//!
//! - **value**: the typed document value produced by transformation
//! - **schema**: per-table attribute descriptors and enum lookups
//! - **error**: shared error taxonomy for schema access

pub mod error;
pub mod schema;
pub mod value;

pub use error::{ModelError, Result};
pub use schema::{AttributeDef, FilterTag, SchemaCatalog, SemanticType, TableSchema};
pub use value::Value;
