//! Error taxonomy for the transformation core.
//!
//! Null/empty detection is never an error; it resolves to the
//! configured sentinel. Parse failures are local to one attribute of
//! one record. Plan-build failures are table-fatal and surface before
//! any record is processed.

use sdp_model::ModelError;
use thiserror::Error;

/// Errors raised while building plans or transforming records.
#[derive(Debug, Clone, Error)]
pub enum TransformError {
    /// A raw cell cannot be parsed into its declared semantic type.
    #[error("cannot convert {value:?} to {target} for attribute {attribute}")]
    TypeConversion {
        attribute: String,
        value: String,
        target: &'static str,
    },

    /// A date/time string cannot be parsed in any accepted form.
    #[error("unparseable date/time {value:?} for attribute {attribute}")]
    DateParse { attribute: String, value: String },

    /// A step was handed a value shape it does not operate on.
    #[error("step {step} cannot operate on value for attribute {attribute}")]
    UnsupportedValue {
        step: &'static str,
        attribute: String,
    },

    /// Plan construction failed for a table.
    #[error("plan build failed for table {table}: {source}")]
    PlanBuild {
        table: String,
        #[source]
        source: ModelError,
    },

    /// A record was submitted for a table with no built plan. Distinct
    /// from a legitimately attribute-less table, whose plan exists and
    /// is empty.
    #[error("no transform plan built for table {table}")]
    PlanNotBuilt { table: String },

    /// Positional values and attribute names differ in length.
    #[error("record shape mismatch: {expected} attribute names, {actual} values")]
    RecordShape { expected: usize, actual: usize },

    /// Underlying schema access failure.
    #[error(transparent)]
    Schema(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, TransformError>;
