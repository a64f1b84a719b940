//! Star schema validation
//!
//! Checks a [`PbiSchema`] for dangling relationship endpoints, duplicate
//! names, relationships that do not run from the fact table to a dimension,
//! and relationship cycles.

use crate::models::{PbiSchema, RelationshipCardinality};
use petgraph::algo::kosaraju_scc;
use petgraph::graph::NodeIndex;
use petgraph::{Directed, Graph};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::warn;

/// Problem found in a schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SchemaIssue {
    DuplicateTable { table: String },
    DuplicateColumn { table: String, column: String },
    /// A relationship endpoint names a table or column that does not exist
    DanglingEndpoint { relationship: String, endpoint: String },
    SelfReference { relationship: String },
    /// Relationship does not run many-to-one from the fact table
    NotFactToDimension { relationship: String },
    Cycle { tables: Vec<String> },
}

impl fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaIssue::DuplicateTable { table } => write!(f, "duplicate table '{}'", table),
            SchemaIssue::DuplicateColumn { table, column } => {
                write!(f, "duplicate column '{}' in table '{}'", column, table)
            }
            SchemaIssue::DanglingEndpoint {
                relationship,
                endpoint,
            } => write!(f, "relationship {} references missing {}", relationship, endpoint),
            SchemaIssue::SelfReference { relationship } => {
                write!(f, "relationship {} references its own table", relationship)
            }
            SchemaIssue::NotFactToDimension { relationship } => write!(
                f,
                "relationship {} is not a many-to-one from the fact table",
                relationship
            ),
            SchemaIssue::Cycle { tables } => {
                write!(f, "relationship cycle through {}", tables.join(" → "))
            }
        }
    }
}

/// Result of schema validation
#[derive(Debug, Clone, Default, Serialize)]
#[must_use = "validation results should be checked or logged"]
pub struct SchemaValidationResult {
    pub issues: Vec<SchemaIssue>,
}

impl SchemaValidationResult {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// Log every issue at warn level
    pub fn log_issues(&self, context: &str) {
        for issue in &self.issues {
            warn!("{}: {}", context, issue);
        }
    }
}

/// Schema validator
#[derive(Debug, Default)]
pub struct SchemaValidator;

impl SchemaValidator {
    /// Create a new schema validator
    ///
    /// # Example
    ///
    /// ```rust
    /// use phantom_pbi_export::models::Scenario;
    /// use phantom_pbi_export::schema::{get_fact_table, get_schema};
    /// use phantom_pbi_export::validation::SchemaValidator;
    ///
    /// let result = SchemaValidator::new()
    ///     .validate(get_schema(Scenario::Retail), get_fact_table(Scenario::Retail));
    /// assert!(result.is_valid());
    /// ```
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, schema: &PbiSchema, fact_table: &str) -> SchemaValidationResult {
        let mut issues = Vec::new();
        self.check_names(schema, &mut issues);
        self.check_relationships(schema, fact_table, &mut issues);
        self.check_cycles(schema, &mut issues);
        SchemaValidationResult { issues }
    }

    fn check_names(&self, schema: &PbiSchema, issues: &mut Vec<SchemaIssue>) {
        let mut tables = HashSet::new();
        for table in &schema.tables {
            if !tables.insert(table.name.as_str()) {
                issues.push(SchemaIssue::DuplicateTable {
                    table: table.name.clone(),
                });
            }
            let mut columns = HashSet::new();
            for column in &table.columns {
                if !columns.insert(column.name.to_lowercase()) {
                    issues.push(SchemaIssue::DuplicateColumn {
                        table: table.name.clone(),
                        column: column.name.clone(),
                    });
                }
            }
        }
    }

    fn check_relationships(
        &self,
        schema: &PbiSchema,
        fact_table: &str,
        issues: &mut Vec<SchemaIssue>,
    ) {
        for rel in &schema.relationships {
            let endpoints = [
                (&rel.from_table, &rel.from_column),
                (&rel.to_table, &rel.to_column),
            ];
            for (table, column) in endpoints {
                let endpoint = if schema.table(table).is_none() {
                    Some(format!("table '{}'", table))
                } else if !schema.has_column(table, column) {
                    Some(format!("column {}[{}]", table, column))
                } else {
                    None
                };
                if let Some(endpoint) = endpoint {
                    issues.push(SchemaIssue::DanglingEndpoint {
                        relationship: rel.label(),
                        endpoint,
                    });
                }
            }

            if rel.from_table == rel.to_table {
                issues.push(SchemaIssue::SelfReference {
                    relationship: rel.label(),
                });
            } else if rel.from_table != fact_table
                || rel.from_cardinality != RelationshipCardinality::Many
                || rel.to_cardinality != RelationshipCardinality::One
            {
                issues.push(SchemaIssue::NotFactToDimension {
                    relationship: rel.label(),
                });
            }
        }
    }

    /// Strongly connected components with more than one table are cycles
    fn check_cycles(&self, schema: &PbiSchema, issues: &mut Vec<SchemaIssue>) {
        let mut graph = Graph::<&str, (), Directed>::new();
        let mut node_map: HashMap<&str, NodeIndex> = HashMap::new();

        for rel in &schema.relationships {
            if rel.from_table == rel.to_table {
                continue;
            }
            let from = *node_map
                .entry(rel.from_table.as_str())
                .or_insert_with(|| graph.add_node(rel.from_table.as_str()));
            let to = *node_map
                .entry(rel.to_table.as_str())
                .or_insert_with(|| graph.add_node(rel.to_table.as_str()));
            graph.add_edge(from, to, ());
        }

        for component in kosaraju_scc(&graph) {
            if component.len() > 1 {
                let mut tables: Vec<String> =
                    component.iter().map(|n| graph[*n].to_string()).collect();
                tables.sort();
                issues.push(SchemaIssue::Cycle { tables });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PbiColumn, PbiDataType, PbiRelationship, PbiTable, Scenario};
    use crate::schema::{get_fact_table, get_schema};

    fn table(name: &str, columns: &[&str]) -> PbiTable {
        PbiTable::new(
            name,
            "",
            columns
                .iter()
                .map(|c| PbiColumn::new(c, c, PbiDataType::String))
                .collect(),
        )
    }

    #[test]
    fn test_builtin_schemas_are_valid() {
        let validator = SchemaValidator::new();
        for scenario in Scenario::ALL {
            let result = validator.validate(get_schema(scenario), get_fact_table(scenario));
            assert!(result.is_valid(), "{}: {:?}", scenario, result.issues);
        }
    }

    #[test]
    fn test_dangling_endpoint() {
        let schema = PbiSchema {
            tables: vec![table("Sales", &["StoreId"])],
            relationships: vec![PbiRelationship::many_to_one(
                "Sales", "StoreId", "Store", "StoreId",
            )],
        };
        let result = SchemaValidator::new().validate(&schema, "Sales");
        assert_eq!(
            result.issues,
            vec![SchemaIssue::DanglingEndpoint {
                relationship: "Sales[StoreId] → Store[StoreId]".to_string(),
                endpoint: "table 'Store'".to_string(),
            }]
        );
    }

    #[test]
    fn test_cycle_detection() {
        let schema = PbiSchema {
            tables: vec![table("A", &["Id", "BId"]), table("B", &["Id", "AId"])],
            relationships: vec![
                PbiRelationship::many_to_one("A", "BId", "B", "Id"),
                PbiRelationship::many_to_one("B", "AId", "A", "Id"),
            ],
        };
        let result = SchemaValidator::new().validate(&schema, "A");
        assert!(result.issues.contains(&SchemaIssue::Cycle {
            tables: vec!["A".to_string(), "B".to_string()],
        }));
        assert!(result.issues.iter().any(|i| matches!(
            i,
            SchemaIssue::NotFactToDimension { relationship } if relationship.starts_with("B[")
        )));
    }

    #[test]
    fn test_duplicate_columns_ignore_case() {
        let schema = PbiSchema {
            tables: vec![table("Sales", &["Revenue", "revenue"])],
            relationships: Vec::new(),
        };
        let result = SchemaValidator::new().validate(&schema, "Sales");
        assert_eq!(result.issues.len(), 1);
    }
}
