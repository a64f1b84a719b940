//! Dashboard binding validation
//!
//! Export never fails on bad bindings; these checks only surface what will
//! be degraded so the writers can log it and list it in the guide.

use crate::models::{Aggregation, DashboardItem, FieldRole, Scenario, VisualFamily, VisualProps};
use crate::schema::{FieldMapper, field_role};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BindingIssue {
    DuplicateItemId { item_id: String },
    /// Field resolves to nothing in the scenario schema
    UnknownField { item_id: String, field: String },
    /// A measure field bound where a dimension is expected
    MeasureAsDimension { item_id: String, field: String },
    /// Chart with no metric bound
    MissingMetric { item_id: String },
    UnknownOperation { item_id: String, operation: String },
    /// Item extends past the right edge of the grid
    OutsideGrid { item_id: String },
}

impl fmt::Display for BindingIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingIssue::DuplicateItemId { item_id } => {
                write!(f, "item id '{}' is used more than once", item_id)
            }
            BindingIssue::UnknownField { item_id, field } => {
                write!(f, "visual '{}' binds unknown field '{}'", item_id, field)
            }
            BindingIssue::MeasureAsDimension { item_id, field } => write!(
                f,
                "visual '{}' groups by measure field '{}'",
                item_id, field
            ),
            BindingIssue::MissingMetric { item_id } => {
                write!(f, "visual '{}' has no metric bound", item_id)
            }
            BindingIssue::UnknownOperation { item_id, operation } => write!(
                f,
                "visual '{}' uses unknown operation '{}', summing instead",
                item_id, operation
            ),
            BindingIssue::OutsideGrid { item_id } => {
                write!(f, "visual '{}' extends past the grid", item_id)
            }
        }
    }
}

/// Validate dashboard items against a scenario
pub fn validate_bindings(
    items: &[DashboardItem],
    scenario: Scenario,
    grid_columns: u32,
) -> Vec<BindingIssue> {
    let mapper = FieldMapper::new(scenario);
    let mut issues = Vec::new();
    let mut seen = HashSet::new();

    for item in items {
        let item_id = item.id.clone();
        if !seen.insert(item.id.as_str()) {
            issues.push(BindingIssue::DuplicateItemId {
                item_id: item_id.clone(),
            });
        }
        if item.layout.x.saturating_add(item.layout.w) > grid_columns {
            issues.push(BindingIssue::OutsideGrid {
                item_id: item_id.clone(),
            });
        }

        for field in grouping_fields(&item.props) {
            match field_role(scenario, field) {
                Some(FieldRole::Measure) => issues.push(BindingIssue::MeasureAsDimension {
                    item_id: item_id.clone(),
                    field: field.to_string(),
                }),
                Some(_) => {}
                None if mapper.dimension(field).is_none() => {
                    issues.push(BindingIssue::UnknownField {
                        item_id: item_id.clone(),
                        field: field.to_string(),
                    })
                }
                None => {}
            }
        }

        let refs = item.props.metric_refs();
        let needs_metric = matches!(
            item.kind.family(),
            VisualFamily::CategoryValue
                | VisualFamily::LegendValue
                | VisualFamily::ValueOnly
                | VisualFamily::Waterfall
                | VisualFamily::Scatter
        );
        if needs_metric && refs.is_empty() {
            issues.push(BindingIssue::MissingMetric {
                item_id: item_id.clone(),
            });
        }
        for metric_ref in refs {
            if !mapper.map(metric_ref.metric).is_resolved() {
                issues.push(BindingIssue::UnknownField {
                    item_id: item_id.clone(),
                    field: metric_ref.metric.to_string(),
                });
            }
            if let Some(op) = metric_ref.operation
                && Aggregation::parse(op).is_none()
            {
                issues.push(BindingIssue::UnknownOperation {
                    item_id: item_id.clone(),
                    operation: op.to_string(),
                });
            }
        }
    }
    issues
}

/// Fields a visual groups or filters by
fn grouping_fields(props: &VisualProps) -> Vec<&str> {
    match props {
        VisualProps::Matrix(p) => p.rows.iter().chain(&p.columns).map(String::as_str).collect(),
        other => other.dimension().into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GridLayout;
    use serde_json::json;

    #[test]
    fn test_clean_bindings() {
        let items = vec![DashboardItem::new(
            "b1",
            "bar",
            "Revenue by Region",
            GridLayout::new(0, 0, 6, 4),
            json!({"dimension": "Region", "metric": "revenue", "operation": "sum"}),
        )];
        assert!(validate_bindings(&items, Scenario::Retail, 12).is_empty());
    }

    #[test]
    fn test_reports_degraded_bindings() {
        let items = vec![
            DashboardItem::new(
                "b1",
                "bar",
                "",
                GridLayout::new(10, 0, 6, 4),
                json!({"dimension": "revenue", "metric": "fuelBurn", "operation": "median"}),
            ),
            DashboardItem::new("b1", "card", "", GridLayout::new(0, 0, 2, 2), json!({})),
        ];
        let issues = validate_bindings(&items, Scenario::Retail, 12);

        assert!(issues.contains(&BindingIssue::OutsideGrid {
            item_id: "b1".to_string()
        }));
        assert!(issues.contains(&BindingIssue::MeasureAsDimension {
            item_id: "b1".to_string(),
            field: "revenue".to_string()
        }));
        assert!(issues.contains(&BindingIssue::UnknownField {
            item_id: "b1".to_string(),
            field: "fuelBurn".to_string()
        }));
        assert!(issues.contains(&BindingIssue::UnknownOperation {
            item_id: "b1".to_string(),
            operation: "median".to_string()
        }));
        assert!(issues.contains(&BindingIssue::DuplicateItemId {
            item_id: "b1".to_string()
        }));
        assert!(issues.contains(&BindingIssue::MissingMetric {
            item_id: "b1".to_string()
        }));
    }
}
