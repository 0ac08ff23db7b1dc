use thiserror::Error;

/// Errors raised by schema catalog access.
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    /// The referenced table is absent from the catalog.
    #[error("unknown table: {table}")]
    UnknownTable { table: String },

    /// The referenced attribute is absent from its table.
    #[error("unknown attribute {attribute} in table {table}")]
    UnknownAttribute { table: String, attribute: String },

    /// A configuration fragment is structurally malformed.
    #[error("malformed configuration in {context}: {message}")]
    MalformedConfig { context: String, message: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
