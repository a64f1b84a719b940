//! Measure generation from dashboard bindings

use super::format::measure_format;
use super::kpi::kpi_measures;
use super::variance::variance_measures;
use super::waterfall::waterfall_measures;
use super::{column_ref, table_ref};
use crate::config::MeasureOptions;
use crate::models::{Aggregation, DashboardItem, DaxMeasure, Scenario};
use crate::schema::{FieldMapper, humanize_metric};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, warn};

pub const BASE_FOLDER: &str = "Base Measures";

/// A metric aggregated by at least one visual
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricBinding {
    /// Metric name as bound on the visual
    pub metric: String,
    pub operation: Aggregation,
    /// Resolved table
    pub table: String,
    /// Resolved column
    pub column: String,
}

impl MetricBinding {
    /// Deduplication key, `metric_operation`
    pub fn key(&self) -> String {
        format!("{}_{}", self.metric, self.operation.as_key())
    }

    /// Base measure name, e.g. `Total Revenue`
    pub fn measure_name(&self) -> String {
        base_measure_name(&self.metric, self.operation)
    }
}

/// Name of the base measure aggregating `metric`
pub fn base_measure_name(metric: &str, operation: Aggregation) -> String {
    let prefix = match operation {
        Aggregation::Sum => "Total",
        Aggregation::Avg => "Avg",
        Aggregation::Count => "Count",
        Aggregation::Min => "Min",
        Aggregation::Max => "Max",
        Aggregation::DistinctCount => "Distinct",
    };
    format!("{} {}", prefix, humanize_metric(metric.trim()))
}

/// Aggregation of a bound operation; absent and unknown operations sum
pub fn binding_aggregation(operation: Option<&str>) -> Aggregation {
    operation.and_then(Aggregation::parse).unwrap_or_default()
}

/// Unique `(metric, operation)` bindings of the items, in first-seen order
pub fn extract_bindings(items: &[DashboardItem], scenario: Scenario) -> Vec<MetricBinding> {
    let mapper = FieldMapper::new(scenario);
    let mut seen = HashSet::new();
    let mut bindings = Vec::new();

    for item in items {
        for metric_ref in item.props.metric_refs() {
            let operation = match metric_ref.operation {
                None => Aggregation::Sum,
                Some(op) => Aggregation::parse(op).unwrap_or_else(|| {
                    warn!(
                        "Unknown operation '{}' on visual '{}', using sum",
                        op, item.id
                    );
                    Aggregation::Sum
                }),
            };
            let metric = metric_ref.metric.trim().to_string();
            let mapping = mapper.map(&metric);
            let binding = MetricBinding {
                metric,
                operation,
                table: mapping.table,
                column: mapping.column,
            };
            if seen.insert(binding.key()) {
                bindings.push(binding);
            }
        }
    }
    bindings
}

/// Generates the measure set of an export
#[derive(Debug, Clone, Default)]
pub struct MeasureGenerator {
    options: MeasureOptions,
}

impl MeasureGenerator {
    pub fn new(options: MeasureOptions) -> Self {
        Self { options }
    }

    /// Generate measures for a dashboard
    ///
    /// Base measures come first, then variances, waterfall bridges and the
    /// scenario KPIs. Names are unique; the first measure with a name wins.
    ///
    /// # Example
    ///
    /// ```rust
    /// use phantom_pbi_export::dax::MeasureGenerator;
    /// use phantom_pbi_export::models::{DashboardItem, GridLayout, Scenario};
    /// use serde_json::json;
    ///
    /// let items = vec![DashboardItem::new(
    ///     "c1",
    ///     "card",
    ///     "Revenue",
    ///     GridLayout::new(0, 0, 3, 2),
    ///     json!({"metric": "revenue", "operation": "sum"}),
    /// )];
    /// let measures = MeasureGenerator::default().generate(&items, Scenario::Retail);
    /// assert_eq!(measures[0].name, "Total Revenue");
    /// assert_eq!(measures[0].expression, "SUM(Sales[Revenue])");
    /// ```
    pub fn generate(&self, items: &[DashboardItem], scenario: Scenario) -> Vec<DaxMeasure> {
        let mapper = FieldMapper::new(scenario);
        let bindings = extract_bindings(items, scenario);

        let base: Vec<DaxMeasure> = bindings
            .iter()
            .map(|b| self.base_measure(b, mapper.fact_table()))
            .collect();
        let base_names: Vec<String> = base.iter().map(|m| m.name.clone()).collect();

        let mut measures = base;
        measures.extend(variance_measures(&bindings, &base_names));
        measures.extend(waterfall_measures(items, &mapper));
        measures.extend(kpi_measures(scenario, &self.options));

        let measures = dedupe(measures);
        debug!(
            "Generated {} measures for {} visuals ({})",
            measures.len(),
            items.len(),
            scenario
        );
        measures
    }

    fn base_measure(&self, binding: &MetricBinding, fact_table: &str) -> DaxMeasure {
        let column = column_ref(&binding.table, &binding.column);
        let expression = match binding.operation {
            Aggregation::Sum => format!("SUM({})", column),
            Aggregation::Avg => format!("AVERAGE({})", column),
            Aggregation::Count => format!("COUNTROWS({})", table_ref(fact_table)),
            Aggregation::Min => format!("MIN({})", column),
            Aggregation::Max => format!("MAX({})", column),
            Aggregation::DistinctCount => format!("DISTINCTCOUNT({})", column),
        };
        DaxMeasure::new(binding.measure_name(), expression)
            .with_folder(BASE_FOLDER)
            .with_format(measure_format(&binding.metric, binding.operation))
            .with_description(format!(
                "{} of {}[{}]",
                binding.operation.as_key(),
                binding.table,
                binding.column
            ))
    }
}

/// Keep the first measure of every name
fn dedupe(measures: Vec<DaxMeasure>) -> Vec<DaxMeasure> {
    let mut seen = HashSet::new();
    measures
        .into_iter()
        .filter(|m| {
            let first = seen.insert(m.name.clone());
            if !first {
                debug!("Dropping duplicate measure '{}'", m.name);
            }
            first
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GridLayout;
    use serde_json::{Value, json};

    fn item(id: &str, visual_type: &str, props: Value) -> DashboardItem {
        DashboardItem::new(id, visual_type, id, GridLayout::new(0, 0, 4, 3), props)
    }

    #[test]
    fn test_extract_bindings_dedupes_by_metric_and_operation() {
        let items = vec![
            item("c1", "card", json!({"metric": "revenue", "operation": "sum"})),
            item("c2", "bar", json!({"dimension": "Region", "metric": "revenue"})),
            item("c3", "card", json!({"metric": "revenue", "operation": "avg"})),
        ];
        let bindings = extract_bindings(&items, Scenario::Retail);
        let keys: Vec<String> = bindings.iter().map(MetricBinding::key).collect();
        assert_eq!(keys, vec!["revenue_sum", "revenue_avg"]);
        assert_eq!(bindings[0].table, "Sales");
        assert_eq!(bindings[0].column, "Revenue");
    }

    #[test]
    fn test_bindings_from_every_prop_shape() {
        let items = vec![
            item("k1", "kpi", json!({"value": "profit", "metric2": "profitPL"})),
            item("s1", "scatter", json!({"xMetric": "cost", "yMetric": "quantity"})),
            item("m1", "matrix", json!({"rows": ["Region"], "values": ["discount"]})),
            item("w1", "waterfall", json!({"dimension": "Region", "metric": "revenue"})),
        ];
        let metrics: Vec<String> = extract_bindings(&items, Scenario::Retail)
            .into_iter()
            .map(|b| b.metric)
            .collect();
        assert_eq!(
            metrics,
            vec!["profit", "profitPL", "cost", "quantity", "discount", "revenue"]
        );
    }

    #[test]
    fn test_base_measure_per_aggregation() {
        let items = vec![
            item("a", "card", json!({"metric": "quantity", "operation": "count"})),
            item("b", "card", json!({"metric": "customerId", "operation": "distinctcount"})),
            item("c", "card", json!({"metric": "discount", "operation": "average"})),
            item("d", "card", json!({"metric": "price", "operation": "max"})),
        ];
        let measures = MeasureGenerator::default().generate(&items, Scenario::Retail);

        assert_eq!(measures[0].name, "Count Quantity");
        assert_eq!(measures[0].expression, "COUNTROWS(Sales)");
        assert_eq!(measures[0].format_string, "#,0");
        assert_eq!(measures[1].name, "Distinct Customer ID");
        assert_eq!(measures[1].expression, "DISTINCTCOUNT(Sales[CustomerId])");
        assert_eq!(measures[2].name, "Avg Discount");
        assert_eq!(measures[2].expression, "AVERAGE(Sales[Discount])");
        assert_eq!(measures[3].expression, "MAX(Product[Price])");
        assert_eq!(measures[3].format_string, "\\$#,0.00");
    }

    #[test]
    fn test_unknown_operation_degrades_to_sum() {
        let items = vec![item("a", "card", json!({"metric": "revenue", "operation": "median"}))];
        let measures = MeasureGenerator::default().generate(&items, Scenario::Retail);
        assert_eq!(measures[0].name, "Total Revenue");
    }

    #[test]
    fn test_variance_measures_follow_base_measures() {
        let items = vec![item(
            "b1",
            "bar",
            json!({"dimension": "Region", "metric": "revenue", "metric2": "revenuePY"}),
        )];
        let measures = MeasureGenerator::default().generate(&items, Scenario::Retail);
        let names: Vec<&str> = measures.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Total Revenue", "Total Revenue PY", "Revenue ΔPY", "Revenue ΔPY%"]
        );
    }

    #[test]
    fn test_measure_names_are_unique() {
        let items = vec![
            item("c1", "card", json!({"metric": "rating", "operation": "avg"})),
            item("c2", "card", json!({"metric": "tenure", "operation": "avg"})),
        ];
        let measures = MeasureGenerator::default().generate(&items, Scenario::HR);
        let mut names: Vec<&str> = measures.iter().map(|m| m.name.as_str()).collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);

        let rating = measures.iter().find(|m| m.name == "Avg Rating").unwrap();
        assert_eq!(rating.display_folder, BASE_FOLDER);
    }
}
