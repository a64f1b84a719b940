//! Relationship model for the tabular schema

use super::enums::{CrossFilteringBehavior, RelationshipCardinality};
use serde::{Deserialize, Serialize};

/// Relationship between two tables of a star schema
///
/// By convention relationships run from the fact table (many side) to a
/// dimension table (one side).
///
/// # Example
///
/// ```rust
/// use phantom_pbi_export::models::PbiRelationship;
///
/// let rel = PbiRelationship::many_to_one("Sales", "StoreId", "Store", "StoreId");
/// assert!(rel.is_active);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PbiRelationship {
    /// Table on the many side
    pub from_table: String,
    /// Foreign key column on the many side
    pub from_column: String,
    /// Table on the one side
    pub to_table: String,
    /// Key column on the one side
    pub to_column: String,
    /// Filter direction
    #[serde(default)]
    pub cross_filtering_behavior: CrossFilteringBehavior,
    /// Whether the relationship participates in filter propagation
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Cardinality of the `from` endpoint
    pub from_cardinality: RelationshipCardinality,
    /// Cardinality of the `to` endpoint
    pub to_cardinality: RelationshipCardinality,
}

fn default_true() -> bool {
    true
}

impl PbiRelationship {
    /// Active, single-direction many-to-one relationship
    pub fn many_to_one(from_table: &str, from_column: &str, to_table: &str, to_column: &str) -> Self {
        Self {
            from_table: from_table.to_string(),
            from_column: from_column.to_string(),
            to_table: to_table.to_string(),
            to_column: to_column.to_string(),
            cross_filtering_behavior: CrossFilteringBehavior::OneDirection,
            is_active: true,
            from_cardinality: RelationshipCardinality::Many,
            to_cardinality: RelationshipCardinality::One,
        }
    }

    pub fn with_cross_filtering(mut self, behavior: CrossFilteringBehavior) -> Self {
        self.cross_filtering_behavior = behavior;
        self
    }

    /// Human readable `From[Col] -> To[Col]` label
    pub fn label(&self) -> String {
        format!(
            "{}[{}] → {}[{}]",
            self.from_table, self.from_column, self.to_table, self.to_column
        )
    }
}
