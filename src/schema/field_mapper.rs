//! Field name to `(table, column)` resolution

use super::fields::{capitalize_first, lookup_dimension};
use super::registry::{get_fact_table, get_schema};
use crate::models::{PbiSchema, Scenario};
use serde::Serialize;
use tracing::warn;

/// How a field reference was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldResolution {
    /// Found in the scenario's dimension lookup table
    Dimension,
    /// Matched a schema column, ignoring case
    SchemaColumn,
    /// Not found anywhere; the column name is a guess on the fact table
    Guessed,
}

/// Resolved reference of a semantic field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMapping {
    pub table: String,
    pub column: String,
    pub resolution: FieldResolution,
}

impl FieldMapping {
    fn new(table: &str, column: &str, resolution: FieldResolution) -> Self {
        Self {
            table: table.to_string(),
            column: column.to_string(),
            resolution,
        }
    }

    /// Whether the reference points at a column known to exist
    pub fn is_resolved(&self) -> bool {
        self.resolution != FieldResolution::Guessed
    }

    /// DAX column reference, e.g. `'Sales'[Revenue]`
    pub fn dax_ref(&self) -> String {
        crate::dax::column_ref(&self.table, &self.column)
    }
}

/// Maps field names of one scenario
#[derive(Debug, Clone, Copy)]
pub struct FieldMapper {
    scenario: Scenario,
    schema: &'static PbiSchema,
    fact_table: &'static str,
}

impl FieldMapper {
    pub fn new(scenario: Scenario) -> Self {
        Self {
            scenario,
            schema: get_schema(scenario),
            fact_table: get_fact_table(scenario),
        }
    }

    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    pub fn fact_table(&self) -> &'static str {
        self.fact_table
    }

    /// Resolve a field as a dimension only; `None` when it is not one
    pub fn dimension(&self, field_name: &str) -> Option<FieldMapping> {
        lookup_dimension(self.scenario, field_name)
            .map(|(table, column)| FieldMapping::new(table, column, FieldResolution::Dimension))
    }

    /// Resolve a field name.
    ///
    /// Dimensions are matched exactly; anything else is looked up as a column
    /// of the fact table first, then of the other tables, ignoring case. A
    /// field that matches nothing is guessed to be the capitalized name on
    /// the fact table, with a warning.
    pub fn map(&self, field_name: &str) -> FieldMapping {
        if let Some(mapping) = self.dimension(field_name) {
            return mapping;
        }

        let fact_first = self
            .schema
            .table(self.fact_table)
            .into_iter()
            .chain(self.schema.tables.iter().filter(|t| t.name != self.fact_table));
        for table in fact_first {
            if let Some(column) = table.column_ignore_case(field_name) {
                return FieldMapping::new(&table.name, &column.name, FieldResolution::SchemaColumn);
            }
        }

        let guess = capitalize_first(field_name.trim());
        warn!(
            "Field '{}' is not part of the {} schema, assuming {}[{}]",
            field_name, self.scenario, self.fact_table, guess
        );
        FieldMapping::new(self.fact_table, &guess, FieldResolution::Guessed)
    }
}

/// Resolve a field name for a scenario
///
/// # Example
///
/// ```rust
/// use phantom_pbi_export::models::Scenario;
/// use phantom_pbi_export::schema::map_field;
///
/// let mapping = map_field(Scenario::Retail, "Region");
/// assert_eq!((mapping.table.as_str(), mapping.column.as_str()), ("Store", "Region"));
/// ```
pub fn map_field(scenario: Scenario, field_name: &str) -> FieldMapping {
    FieldMapper::new(scenario).map(field_name)
}
