//! Validation functionality
//!
//! Provides validation logic for:
//! - Schema validation (dangling relationships, duplicate names, cycles)
//! - Binding validation (unknown fields, missing metrics, grid bounds)

pub mod bindings;
pub mod schema;

pub use bindings::{BindingIssue, validate_bindings};
pub use schema::{SchemaIssue, SchemaValidationResult, SchemaValidator};
