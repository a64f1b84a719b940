//! Waterfall bridge measures
//!
//! A waterfall walks from the prior-year total to the actual total through
//! the variance of each dimension value.

use super::format::metric_format;
use super::{column_ref, measure_ref};
use crate::models::{DashboardItem, DaxMeasure, VisualProps};
use crate::schema::FieldMapper;
use tracing::warn;

pub const WATERFALL_FOLDER: &str = "Waterfall";

/// Metric bridged when a waterfall binds none
const DEFAULT_METRIC: &str = "revenue";

/// Four bridge measures per waterfall item.
///
/// Names carry a ` 1`, ` 2`, ... suffix when the dashboard has more than one
/// waterfall.
pub fn waterfall_measures(items: &[DashboardItem], mapper: &FieldMapper) -> Vec<DaxMeasure> {
    let waterfalls: Vec<&DashboardItem> = items
        .iter()
        .filter(|item| matches!(item.props, VisualProps::Waterfall(_)))
        .collect();
    let numbered = waterfalls.len() > 1;

    let mut measures = Vec::new();
    for (index, item) in waterfalls.iter().enumerate() {
        let VisualProps::Waterfall(props) = &item.props else {
            continue;
        };
        let Some(dimension) = props.dimension.as_deref().filter(|d| !d.trim().is_empty()) else {
            warn!("Waterfall '{}' has no dimension, skipping bridge", item.id);
            continue;
        };
        let suffix = if numbered {
            format!(" {}", index + 1)
        } else {
            String::new()
        };
        let metric = props
            .metric
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(DEFAULT_METRIC);
        measures.extend(bridge(mapper, dimension, metric, &suffix));
    }
    measures
}

fn bridge(mapper: &FieldMapper, dimension: &str, metric: &str, suffix: &str) -> Vec<DaxMeasure> {
    let dim = mapper.map(dimension).dax_ref();
    let actual = mapper.map(metric);
    let prior = mapper.map(&format!("{}PY", metric));
    let ac = column_ref(&actual.table, &actual.column);
    let py = column_ref(&prior.table, &prior.column);
    let format = metric_format(metric);

    let start = format!("Waterfall Start{}", suffix);
    let variance = format!("Waterfall Variance{}", suffix);
    let end = format!("Waterfall End{}", suffix);
    let running = format!("Waterfall Running{}", suffix);

    let running_expression = format!(
        "VAR _current = MAX({dim})\n\
         RETURN\n    \
         CALCULATE(\n        \
         SUMX(VALUES({dim}), {variance}),\n        \
         FILTER(ALL({dim}), {dim} <= _current)\n    \
         )",
        dim = dim,
        variance = measure_ref(&variance),
    );

    vec![
        DaxMeasure::new(
            start,
            format!("CALCULATE(SUM({}), ALL({}))", py, dim),
        )
        .with_folder(WATERFALL_FOLDER)
        .with_format(format)
        .with_description(format!("Prior-year {} across all {}", metric, dimension)),
        DaxMeasure::new(variance, format!("SUM({}) - SUM({})", ac, py))
            .with_folder(WATERFALL_FOLDER)
            .with_format(format)
            .with_description(format!("{} change against prior year", metric)),
        DaxMeasure::new(end, format!("CALCULATE(SUM({}), ALL({}))", ac, dim))
            .with_folder(WATERFALL_FOLDER)
            .with_format(format)
            .with_description(format!("Actual {} across all {}", metric, dimension)),
        DaxMeasure::new(running, running_expression)
            .with_folder(WATERFALL_FOLDER)
            .with_format(format)
            .with_description(format!(
                "Cumulative variance up to the current {}",
                dimension
            )),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GridLayout, Scenario};
    use serde_json::json;

    fn waterfall(id: &str) -> DashboardItem {
        DashboardItem::new(
            id,
            "waterfall",
            "Bridge",
            GridLayout::new(0, 0, 6, 4),
            json!({"dimension": "Region", "metric": "revenue"}),
        )
    }

    #[test]
    fn test_single_waterfall_is_unsuffixed() {
        let mapper = FieldMapper::new(Scenario::Retail);
        let measures = waterfall_measures(&[waterfall("w1")], &mapper);
        let names: Vec<&str> = measures.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Waterfall Start",
                "Waterfall Variance",
                "Waterfall End",
                "Waterfall Running"
            ]
        );
        assert_eq!(
            measures[0].expression,
            "CALCULATE(SUM(Sales[RevenuePY]), ALL(Store[Region]))"
        );
        assert!(measures[3].expression.contains("[Waterfall Variance]"));
        assert!(measures[3].is_multiline());
    }

    #[test]
    fn test_multiple_waterfalls_are_numbered() {
        let mapper = FieldMapper::new(Scenario::Retail);
        let measures = waterfall_measures(&[waterfall("w1"), waterfall("w2")], &mapper);
        assert_eq!(measures.len(), 8);
        assert_eq!(measures[0].name, "Waterfall Start 1");
        assert_eq!(measures[7].name, "Waterfall Running 2");
        assert!(measures[7].expression.contains("[Waterfall Variance 2]"));
    }

    #[test]
    fn test_waterfall_without_dimension_is_skipped() {
        let mapper = FieldMapper::new(Scenario::Retail);
        let items = vec![
            DashboardItem::new(
                "w1",
                "waterfall",
                "No dimension",
                GridLayout::new(0, 0, 6, 4),
                json!({"metric": "revenue"}),
            ),
            DashboardItem::new(
                "w2",
                "waterfall",
                "Blank dimension",
                GridLayout::new(6, 0, 6, 4),
                json!({"dimension": "", "metric": "profit"}),
            ),
        ];
        assert!(waterfall_measures(&items, &mapper).is_empty());
    }
}
