//! Schema-driven attribute transformation engine.
//!
//! For each logical table this crate derives an ordered, attribute-level
//! transform plan from the schema catalog once, then replays it across
//! an unbounded stream of records:
//!
//! - **plan**: transform flags, per-table plans, and the eager-built
//!   [`TransformFactory`] plan cache
//! - **step**: the [`TransformStep`] data enum and its executor
//! - **record**: positional record to output document transformation
//! - **datetime**: canonicalization of colon-joined date/time strings
//! - **error**: the transform error taxonomy

pub mod datetime;
pub mod error;
pub mod plan;
pub mod record;
pub mod step;

pub use error::{Result, TransformError};
pub use plan::{TransformFactory, TransformFlags, TransformPlan};
pub use record::{AttributeFailure, RecordOutput, RecordTransformer};
pub use step::{TransformStep, TransformValue};
