//! Field projections of report visuals
//!
//! Decides, per visual family, which column or measure fills which data
//! role. Both writers render the same projections in their own JSON shape.

use crate::dax::{base_measure_name, binding_aggregation};
use crate::models::{DashboardItem, DaxMeasure, VisualKind, VisualProps};
use crate::schema::{FieldMapper, FieldResolution, humanize_metric};
use std::collections::HashMap;
use tracing::warn;

/// A model field bound to a visual role
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRef {
    Column { table: String, column: String },
    Measure { table: String, name: String },
}

impl FieldRef {
    pub fn entity(&self) -> &str {
        match self {
            FieldRef::Column { table, .. } | FieldRef::Measure { table, .. } => table,
        }
    }

    pub fn property(&self) -> &str {
        match self {
            FieldRef::Column { column, .. } => column,
            FieldRef::Measure { name, .. } => name,
        }
    }

    /// `Table.Property`
    pub fn query_ref(&self) -> String {
        format!("{}.{}", self.entity(), self.property())
    }

    pub fn is_measure(&self) -> bool {
        matches!(self, FieldRef::Measure { .. })
    }
}

/// A field placed in a data role (`Category`, `Y`, `Values`, ...)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub role: &'static str,
    pub field: FieldRef,
}

/// Resolves the projections of dashboard items against a generated measure set
pub struct ProjectionBuilder<'a> {
    mapper: FieldMapper,
    measures: &'a [DaxMeasure],
    /// Name suffix of each waterfall item's bridge measures
    waterfall_suffix: HashMap<String, String>,
}

impl<'a> ProjectionBuilder<'a> {
    pub fn new(mapper: FieldMapper, measures: &'a [DaxMeasure], items: &[DashboardItem]) -> Self {
        let waterfalls: Vec<&DashboardItem> = items
            .iter()
            .filter(|i| matches!(i.props, VisualProps::Waterfall(_)))
            .collect();
        let numbered = waterfalls.len() > 1;
        let waterfall_suffix = waterfalls
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let suffix = if numbered {
                    format!(" {}", i + 1)
                } else {
                    String::new()
                };
                (item.id.clone(), suffix)
            })
            .collect();
        Self {
            mapper,
            measures,
            waterfall_suffix,
        }
    }

    fn column(&self, field: &str) -> FieldRef {
        let mapping = self.mapper.map(field);
        FieldRef::Column {
            table: mapping.table,
            column: mapping.column,
        }
    }

    fn measure(&self, name: String) -> FieldRef {
        FieldRef::Measure {
            table: self.mapper.fact_table().to_string(),
            name,
        }
    }

    fn metric(&self, metric: &str, operation: Option<&str>) -> FieldRef {
        self.measure(base_measure_name(metric, binding_aggregation(operation)))
    }

    fn has_measure(&self, name: &str) -> Option<&'a DaxMeasure> {
        self.measures
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }

    /// Table column: a dimension, else a generated measure, else a schema column
    fn table_column(&self, item_id: &str, field: &str) -> Option<FieldRef> {
        if let Some(mapping) = self.mapper.dimension(field) {
            return Some(FieldRef::Column {
                table: mapping.table,
                column: mapping.column,
            });
        }
        let sum_name = format!("Total {}", humanize_metric(field));
        if let Some(measure) = self.has_measure(field).or_else(|| self.has_measure(&sum_name)) {
            return Some(self.measure(measure.name.clone()));
        }
        let mapping = self.mapper.map(field);
        if mapping.resolution == FieldResolution::SchemaColumn {
            return Some(FieldRef::Column {
                table: mapping.table,
                column: mapping.column,
            });
        }
        warn!(
            "Table visual '{}' column '{}' matches no field or measure, leaving it out",
            item_id, field
        );
        None
    }

    /// Projections of one item, in role order
    pub fn projections(&self, item: &DashboardItem) -> Vec<Projection> {
        let mut out = Vec::new();
        let mut push = |role: &'static str, field: Option<FieldRef>| {
            if let Some(field) = field {
                out.push(Projection { role, field });
            }
        };
        let present = |s: &Option<String>| s.as_deref().filter(|v| !v.trim().is_empty()).map(str::to_string);

        match &item.props {
            VisualProps::Category(p) => {
                let op = p.operation.as_deref();
                push("Category", present(&p.dimension).map(|d| self.column(&d)));
                push("Y", present(&p.metric).map(|m| self.metric(&m, op)));
                let secondary = if item.kind == VisualKind::Combo { "Y2" } else { "Y" };
                push(secondary, present(&p.metric2).map(|m| self.metric(&m, op)));
            }
            VisualProps::Value(p) => {
                let op = p.operation.as_deref();
                let (primary, secondary) = match item.kind {
                    VisualKind::Gauge => ("Y", "TargetValue"),
                    VisualKind::Kpi => ("Indicator", "Goal"),
                    _ => ("Values", "Values"),
                };
                push(primary, p.metric().map(|m| self.metric(m, op)));
                push(secondary, present(&p.metric2).map(|m| self.metric(&m, op)));
            }
            VisualProps::Table(p) => {
                for column in &p.columns {
                    push("Values", self.table_column(&item.id, column));
                }
            }
            VisualProps::Matrix(p) => {
                for row in &p.rows {
                    push("Rows", Some(self.column(row)));
                }
                for column in &p.columns {
                    push("Columns", Some(self.column(column)));
                }
                for value in &p.values {
                    push("Values", Some(self.metric(value, p.operation.as_deref())));
                }
            }
            VisualProps::Scatter(p) => {
                let op = p.operation.as_deref();
                push("Category", present(&p.dimension).map(|d| self.column(&d)));
                push("X", present(&p.x_metric).map(|m| self.metric(&m, op)));
                push("Y", present(&p.y_metric).map(|m| self.metric(&m, op)));
            }
            VisualProps::Slicer(p) => {
                push("Values", present(&p.dimension).map(|d| self.column(&d)));
            }
            VisualProps::Waterfall(p) => {
                push("Category", present(&p.dimension).map(|d| self.column(&d)));
                let suffix = self.waterfall_suffix.get(&item.id).cloned().unwrap_or_default();
                let variance = format!("Waterfall Variance{}", suffix);
                let field = if self.has_measure(&variance).is_some() {
                    Some(self.measure(variance))
                } else {
                    present(&p.metric).map(|m| self.metric(&m, p.operation.as_deref()))
                };
                push("Y", field);
            }
            VisualProps::Generic(_) => {
                for metric_ref in item.props.metric_refs() {
                    push("Values", Some(self.metric(metric_ref.metric, metric_ref.operation)));
                }
            }
        }
        out
    }

    /// Sort field of a visual limited to its top N categories
    pub fn top_n_sort(&self, item: &DashboardItem) -> Option<(FieldRef, u32)> {
        let top_n = match &item.props {
            VisualProps::Category(p) => p.top_n?,
            VisualProps::Table(p) => p.top_n?,
            _ => return None,
        };
        self.projections(item)
            .into_iter()
            .find(|p| p.field.is_measure())
            .map(|p| (p.field, top_n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dax::MeasureGenerator;
    use crate::models::{GridLayout, Scenario};
    use serde_json::{Value, json};

    fn item(id: &str, visual_type: &str, props: Value) -> DashboardItem {
        DashboardItem::new(id, visual_type, id, GridLayout::new(0, 0, 4, 4), props)
    }

    fn roles(projections: &[Projection]) -> Vec<(&str, String)> {
        projections
            .iter()
            .map(|p| (p.role, p.field.query_ref()))
            .collect()
    }

    #[test]
    fn test_chart_and_card_projections() {
        let items = vec![
            item("b1", "bar", json!({"dimension": "Region", "metric": "revenue"})),
            item("c1", "card", json!({"value": "profit", "operation": "avg"})),
            item("g1", "gauge", json!({"metric": "revenue", "metric2": "revenuePL"})),
        ];
        let measures = MeasureGenerator::default().generate(&items, Scenario::Retail);
        let builder = ProjectionBuilder::new(FieldMapper::new(Scenario::Retail), &measures, &items);

        assert_eq!(
            roles(&builder.projections(&items[0])),
            vec![
                ("Category", "Store.Region".to_string()),
                ("Y", "Sales.Total Revenue".to_string())
            ]
        );
        assert_eq!(
            roles(&builder.projections(&items[1])),
            vec![("Values", "Sales.Avg Profit".to_string())]
        );
        assert_eq!(
            roles(&builder.projections(&items[2])),
            vec![
                ("Y", "Sales.Total Revenue".to_string()),
                ("TargetValue", "Sales.Total Revenue PL".to_string())
            ]
        );
    }

    #[test]
    fn test_table_columns_resolve_dimension_then_measure() {
        let items = vec![
            item("c1", "card", json!({"metric": "revenue"})),
            item("t1", "table", json!({"columns": ["Region", "revenue", "Total Revenue", "discount", "bogus"]})),
        ];
        let measures = MeasureGenerator::default().generate(&items, Scenario::Retail);
        let builder = ProjectionBuilder::new(FieldMapper::new(Scenario::Retail), &measures, &items);

        assert_eq!(
            roles(&builder.projections(&items[1])),
            vec![
                ("Values", "Store.Region".to_string()),
                ("Values", "Sales.Total Revenue".to_string()),
                ("Values", "Sales.Total Revenue".to_string()),
                ("Values", "Sales.Discount".to_string()),
            ]
        );
    }

    #[test]
    fn test_waterfall_uses_its_variance_measure() {
        let items = vec![
            item("w1", "waterfall", json!({"dimension": "Region", "metric": "revenue"})),
            item("w2", "waterfall", json!({"dimension": "Category", "metric": "profit"})),
        ];
        let measures = MeasureGenerator::default().generate(&items, Scenario::Retail);
        let builder = ProjectionBuilder::new(FieldMapper::new(Scenario::Retail), &measures, &items);

        let projections = builder.projections(&items[1]);
        assert_eq!(projections[0].field.query_ref(), "Product.Category");
        assert_eq!(projections[1].field.query_ref(), "Sales.Waterfall Variance 2");
    }

    #[test]
    fn test_top_n_sort() {
        let items = vec![item(
            "b1",
            "bar",
            json!({"dimension": "Product", "metric": "revenue", "topN": 10}),
        )];
        let measures = MeasureGenerator::default().generate(&items, Scenario::Retail);
        let builder = ProjectionBuilder::new(FieldMapper::new(Scenario::Retail), &measures, &items);
        let (field, n) = builder.top_n_sort(&items[0]).unwrap();
        assert_eq!(field.property(), "Total Revenue");
        assert_eq!(n, 10);
    }
}
