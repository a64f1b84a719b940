//! Scenario schemas and field resolution
//!
//! - [`registry`]: the fixed star schema of every scenario
//! - [`fields`]: semantic field catalogue, dimension lookup tables and the
//!   name heuristics used for format strings
//! - [`field_mapper`]: resolves semantic field names to schema columns

pub mod field_mapper;
pub mod fields;
pub mod registry;

pub use field_mapper::{FieldMapper, FieldMapping, FieldResolution, map_field};
pub use fields::{
    SemanticField, capitalize_first, field_role, humanize_metric, is_currency_metric,
    is_percent_metric, scenario_fields,
};
pub use registry::{get_fact_table, get_schema};
