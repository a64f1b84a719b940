//! Table model for the tabular schema

use super::enums::{DataCollection, PbiDataType, SummarizeBy};
use super::relationship::PbiRelationship;
use serde::{Deserialize, Serialize};

/// Column of a tabular model table
///
/// # Example
///
/// ```rust
/// use phantom_pbi_export::models::{PbiColumn, PbiDataType};
///
/// let column = PbiColumn::new("Revenue", "revenue", PbiDataType::Double);
/// assert_eq!(column.source_column, "revenue");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PbiColumn {
    /// Column name as shown in the field list
    pub name: String,
    /// Tabular data type
    pub data_type: PbiDataType,
    /// Column name in the source query (the key of the snapshot rows)
    pub source_column: String,
    /// Hidden from report authors (keys)
    #[serde(default)]
    pub is_hidden: bool,
    /// Default aggregation
    pub summarize_by: SummarizeBy,
}

impl PbiColumn {
    /// Create a visible column. Numeric columns summarize by sum, others by none.
    pub fn new(name: &str, source_column: &str, data_type: PbiDataType) -> Self {
        let summarize_by = if data_type.is_numeric() {
            SummarizeBy::Sum
        } else {
            SummarizeBy::None
        };
        Self {
            name: name.to_string(),
            data_type,
            source_column: source_column.to_string(),
            is_hidden: false,
            summarize_by,
        }
    }

    /// Create a hidden key column that never aggregates
    pub fn key(name: &str, source_column: &str, data_type: PbiDataType) -> Self {
        Self {
            is_hidden: true,
            summarize_by: SummarizeBy::None,
            ..Self::new(name, source_column, data_type)
        }
    }

    pub fn with_summarize_by(mut self, summarize_by: SummarizeBy) -> Self {
        self.summarize_by = summarize_by;
        self
    }
}

/// Table of the tabular model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PbiTable {
    /// Table name (unique within a schema)
    pub name: String,
    /// Ordered columns; the order drives row literal encoding
    pub columns: Vec<PbiColumn>,
    /// Table description
    #[serde(default)]
    pub description: String,
    /// Snapshot collection the table is loaded from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<DataCollection>,
}

impl PbiTable {
    pub fn new(name: &str, description: &str, columns: Vec<PbiColumn>) -> Self {
        Self {
            name: name.to_string(),
            columns,
            description: description.to_string(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: DataCollection) -> Self {
        self.source = Some(source);
        self
    }

    /// Find a column by exact name
    pub fn column(&self, name: &str) -> Option<&PbiColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Find a column ignoring ASCII case
    pub fn column_ignore_case(&self, name: &str) -> Option<&PbiColumn> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }
}

/// Star schema of one scenario
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PbiSchema {
    /// Tables, fact table first
    pub tables: Vec<PbiTable>,
    /// Relationships between tables
    pub relationships: Vec<PbiRelationship>,
}

impl PbiSchema {
    pub fn table(&self, name: &str) -> Option<&PbiTable> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Whether `table[column]` exists in this schema
    pub fn has_column(&self, table: &str, column: &str) -> bool {
        self.table(table)
            .map(|t| t.column(column).is_some())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_defaults() {
        let revenue = PbiColumn::new("Revenue", "revenue", PbiDataType::Double);
        assert_eq!(revenue.summarize_by, SummarizeBy::Sum);
        assert!(!revenue.is_hidden);

        let key = PbiColumn::key("StoreId", "storeId", PbiDataType::String);
        assert!(key.is_hidden);
        assert_eq!(key.summarize_by, SummarizeBy::None);
    }

    #[test]
    fn test_column_lookup_ignores_case() {
        let table = PbiTable::new(
            "Subscriptions",
            "",
            vec![PbiColumn::new("MRR", "mrr", PbiDataType::Double)],
        );
        assert!(table.column("Mrr").is_none());
        assert_eq!(table.column_ignore_case("mrr").unwrap().name, "MRR");
    }
}
