//! Per-table attribute descriptors and enum lookups.
//!
//! A [`SchemaCatalog`] holds one [`TableSchema`] per logical table.
//! Each table carries an ordered list of [`AttributeDef`] descriptors
//! plus a per-attribute enumeration map used to canonicalize
//! enumerated values. The catalog is read-only for the transformation
//! core: plans are derived from it once and replayed across records.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{ModelError, Result};
use crate::value::Value;

/// Semantic type of an attribute, driving its transform path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    String,
    Integer,
    Float,
    Date,
    DateTime,
    /// No mapping correspondence; excluded from transform plans.
    Other,
}

impl SemanticType {
    /// Canonical lower-case type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SemanticType::String => "string",
            SemanticType::Integer => "integer",
            SemanticType::Float => "float",
            SemanticType::Date => "date",
            SemanticType::DateTime => "datetime",
            SemanticType::Other => "other",
        }
    }

    /// Returns true for `Date` and `DateTime`.
    pub fn is_date_kind(&self) -> bool {
        matches!(self, SemanticType::Date | SemanticType::DateTime)
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SemanticType {
    type Err = ModelError;

    /// Parse a type name as found in schema definitions.
    /// Accepts common SQL-ish aliases, case-insensitive.
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "string" | "char" | "varchar" | "text" => Ok(SemanticType::String),
            "integer" | "int" | "bigint" | "smallint" => Ok(SemanticType::Integer),
            "float" | "double" | "decimal" | "numeric" => Ok(SemanticType::Float),
            "date" => Ok(SemanticType::Date),
            "datetime" | "timestamp" => Ok(SemanticType::DateTime),
            "other" | "any" => Ok(SemanticType::Other),
            _ => Err(ModelError::MalformedConfig {
                context: "semantic type".to_owned(),
                message: format!("unknown type name: {s}"),
            }),
        }
    }
}

/// Declared per-attribute value filter.
///
/// Only whitespace stripping is currently recognized; unknown external
/// filter names are skipped with a debug log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterTag {
    StripWhitespace,
}

impl FilterTag {
    /// Map an external filter name to an implemented filter, if any.
    pub fn from_external(name: &str) -> Option<FilterTag> {
        match name {
            "STRIP_WS" => Some(FilterTag::StripWhitespace),
            _ => {
                tracing::debug!(filter = name, "unimplemented attribute filter, skipping");
                None
            }
        }
    }
}

/// Descriptor for a single attribute within a table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeDef {
    /// Schema-scoped identifier.
    pub id: String,
    /// Key under which the transformed value appears in the output document.
    pub output_name: String,
    pub semantic_type: SemanticType,
    /// `Some` makes the attribute iterable with the given delimiter.
    pub iterable_separator: Option<String>,
    /// Whether legal values are restricted to a known set.
    pub enumerated: bool,
    /// Maximum string width; longer scalar strings are truncated.
    pub max_width: Option<usize>,
    /// Substitute value for empty/placeholder input.
    pub null_sentinel: Value,
    #[serde(default)]
    pub filter_tags: Vec<FilterTag>,
}

impl AttributeDef {
    /// Create a descriptor with the default (empty-string) null sentinel.
    pub fn new(id: impl Into<String>, output_name: impl Into<String>, ty: SemanticType) -> Self {
        Self {
            id: id.into(),
            output_name: output_name.into(),
            semantic_type: ty,
            iterable_separator: None,
            enumerated: false,
            max_width: None,
            null_sentinel: Value::String(String::new()),
            filter_tags: Vec::new(),
        }
    }

    /// Mark as iterable with the given separator.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.iterable_separator = Some(separator.into());
        self
    }

    /// Mark as enumerated.
    pub fn with_enumerated(mut self) -> Self {
        self.enumerated = true;
        self
    }

    /// Set the maximum string width.
    pub fn with_max_width(mut self, width: usize) -> Self {
        self.max_width = Some(width);
        self
    }

    /// Set the null sentinel value.
    pub fn with_null_sentinel(mut self, sentinel: Value) -> Self {
        self.null_sentinel = sentinel;
        self
    }

    /// Declare a value filter.
    pub fn with_filter(mut self, tag: FilterTag) -> Self {
        self.filter_tags.push(tag);
        self
    }

    /// Whether the raw value is a separator-delimited list.
    pub fn is_iterable(&self) -> bool {
        self.iterable_separator.is_some()
    }
}

/// Schema definition for one logical table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableSchema {
    pub id: String,
    pub name: String,
    /// Attributes in declared table order.
    pub attributes: Vec<AttributeDef>,
    /// Enumeration maps keyed by attribute id: raw token -> canonical value.
    #[serde(default)]
    enum_maps: HashMap<String, HashMap<String, String>>,
}

impl TableSchema {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            attributes: Vec::new(),
            enum_maps: HashMap::new(),
        }
    }

    /// Append an attribute, preserving table order.
    pub fn with_attribute(mut self, attribute: AttributeDef) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Install the enumeration map for an attribute.
    pub fn with_enum_map(
        mut self,
        attribute_id: impl Into<String>,
        map: HashMap<String, String>,
    ) -> Self {
        self.enum_maps.insert(attribute_id.into(), map);
        self
    }

    /// Attribute identifiers in table order.
    pub fn attribute_ids(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|a| a.id.as_str())
    }

    /// Look up an attribute by identifier.
    pub fn attribute(&self, id: &str) -> Result<&AttributeDef> {
        self.attributes
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| ModelError::UnknownAttribute {
                table: self.id.clone(),
                attribute: id.to_owned(),
            })
    }

    /// Look up an attribute by its output name.
    pub fn attribute_by_name(&self, output_name: &str) -> Option<&AttributeDef> {
        self.attributes.iter().find(|a| a.output_name == output_name)
    }

    /// Canonicalize an enumerated value.
    ///
    /// Returns `None` when no mapping is configured for the token; the
    /// caller passes the value through unchanged in that case.
    pub fn normalize_enum(&self, attribute_id: &str, raw: &str) -> Option<&str> {
        self.enum_maps
            .get(attribute_id)
            .and_then(|m| m.get(raw))
            .map(String::as_str)
    }

    /// Null sentinels keyed by output name.
    pub fn null_value_map(&self) -> HashMap<String, Value> {
        self.attributes
            .iter()
            .map(|a| (a.output_name.clone(), a.null_sentinel.clone()))
            .collect()
    }

    /// Identifier -> output-name map.
    pub fn id_to_name(&self) -> HashMap<String, String> {
        self.attributes
            .iter()
            .map(|a| (a.id.clone(), a.output_name.clone()))
            .collect()
    }

    /// Output-name -> identifier map.
    pub fn name_to_id(&self) -> HashMap<String, String> {
        self.attributes
            .iter()
            .map(|a| (a.output_name.clone(), a.id.clone()))
            .collect()
    }
}

/// Read-only collection of table schemas keyed by table identifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaCatalog {
    tables: HashMap<String, TableSchema>,
}

impl SchemaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a table schema.
    pub fn insert_table(&mut self, table: TableSchema) {
        self.tables.insert(table.id.clone(), table);
    }

    /// Builder-style insertion.
    pub fn with_table(mut self, table: TableSchema) -> Self {
        self.insert_table(table);
        self
    }

    /// Look up a table, surfacing an explicit error when absent.
    pub fn table(&self, id: &str) -> Result<&TableSchema> {
        self.tables.get(id).ok_or_else(|| ModelError::UnknownTable {
            table: id.to_owned(),
        })
    }

    /// All table identifiers (unordered).
    pub fn table_ids(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semantic_type_parses_aliases() {
        assert_eq!("VARCHAR".parse::<SemanticType>().unwrap(), SemanticType::String);
        assert_eq!("int".parse::<SemanticType>().unwrap(), SemanticType::Integer);
        assert_eq!("DateTime".parse::<SemanticType>().unwrap(), SemanticType::DateTime);
        assert!("blob".parse::<SemanticType>().is_err());
    }

    #[test]
    fn filter_tag_mapping() {
        assert_eq!(
            FilterTag::from_external("STRIP_WS"),
            Some(FilterTag::StripWhitespace)
        );
        assert_eq!(FilterTag::from_external("UPPERCASE"), None);
    }

    #[test]
    fn table_lookup_and_maps() {
        let table = TableSchema::new("T1", "widget")
            .with_attribute(AttributeDef::new("ID", "id", SemanticType::Integer))
            .with_attribute(
                AttributeDef::new("NAME", "name", SemanticType::String).with_max_width(5),
            );

        assert_eq!(table.attribute("ID").unwrap().output_name, "id");
        assert!(table.attribute("MISSING").is_err());
        assert_eq!(table.id_to_name().get("NAME"), Some(&"name".to_owned()));
        assert_eq!(table.name_to_id().get("name"), Some(&"NAME".to_owned()));
        assert_eq!(
            table.attribute_ids().collect::<Vec<_>>(),
            vec!["ID", "NAME"]
        );
    }

    #[test]
    fn enum_normalization_is_lenient() {
        let mut map = HashMap::new();
        map.insert("r".to_owned(), "RED".to_owned());
        let table = TableSchema::new("T1", "widget")
            .with_attribute(
                AttributeDef::new("COLOR", "color", SemanticType::String).with_enumerated(),
            )
            .with_enum_map("COLOR", map);

        assert_eq!(table.normalize_enum("COLOR", "r"), Some("RED"));
        assert_eq!(table.normalize_enum("COLOR", "mauve"), None);
        assert_eq!(table.normalize_enum("SIZE", "r"), None);
    }

    #[test]
    fn catalog_unknown_table_is_an_error() {
        let catalog = SchemaCatalog::new().with_table(TableSchema::new("T1", "widget"));
        assert!(catalog.table("T1").is_ok());
        let err = catalog.table("T2").unwrap_err();
        assert!(matches!(err, ModelError::UnknownTable { .. }));
    }
}
