//! Fixed KPI measure sets of the Portfolio, HR, Logistics and SaaS scenarios

use super::format::{COUNT_FORMAT, CURRENCY_FORMAT, DECIMAL_FORMAT, PERCENT_FORMAT};
use super::{column_ref, string_literal, table_ref};
use crate::config::MeasureOptions;
use crate::models::{DaxMeasure, Scenario};
use crate::schema::get_fact_table;

pub const KPI_FOLDER: &str = "KPIs";

fn kpi(name: &str, expression: String, format: &str, description: &str) -> DaxMeasure {
    DaxMeasure::new(name, expression)
        .with_folder(KPI_FOLDER)
        .with_format(format)
        .with_description(description)
}

/// Share of rows where a boolean column is true
fn true_rate(table: &str, column: &str) -> String {
    format!(
        "DIVIDE(CALCULATE(COUNTROWS({t}), {c} = TRUE()), COUNTROWS({t}), BLANK())",
        t = table_ref(table),
        c = column_ref(table, column)
    )
}

/// KPI measures of a scenario; empty for scenarios without a KPI set
pub fn kpi_measures(scenario: Scenario, options: &MeasureOptions) -> Vec<DaxMeasure> {
    let fact = get_fact_table(scenario);
    let rows = format!("COUNTROWS({})", table_ref(fact));
    let col = |column: &str| column_ref(fact, column);

    match scenario {
        Scenario::Portfolio => vec![
            kpi(
                "Unique Entities",
                format!("DISTINCTCOUNT({})", col("EntityId")),
                COUNT_FORMAT,
                "Entities with at least one score",
            ),
            kpi(
                "Above Threshold",
                format!(
                    "CALCULATE(DISTINCTCOUNT({}), {} >= {})",
                    col("EntityId"),
                    col("Score"),
                    options.controversy_threshold
                ),
                COUNT_FORMAT,
                "Entities scoring at or above the controversy threshold",
            ),
            kpi(
                "Negative Changes",
                format!("CALCULATE({}, {} < 0)", rows, col("ScoreChange")),
                COUNT_FORMAT,
                "Observations where the score dropped",
            ),
            kpi(
                "Positive Changes",
                format!("CALCULATE({}, {} > 0)", rows, col("ScoreChange")),
                COUNT_FORMAT,
                "Observations where the score rose",
            ),
            kpi(
                "Avg Controversy Score",
                format!("AVERAGE({})", col("Score")),
                DECIMAL_FORMAT,
                "Average controversy score",
            ),
            kpi(
                "Total Market Value",
                format!("SUM({})", column_ref("PortfolioEntities", "MarketValue")),
                CURRENCY_FORMAT,
                "Market value of the entities in context",
            ),
            kpi(
                "Net Score Change",
                format!("SUM({})", col("ScoreChange")),
                DECIMAL_FORMAT,
                "Sum of score changes",
            ),
        ],
        Scenario::HR => vec![
            kpi("Headcount", rows, COUNT_FORMAT, "Number of employees"),
            kpi(
                "Attrition Rate",
                true_rate(fact, "Attrition"),
                PERCENT_FORMAT,
                "Share of employees who left",
            ),
            kpi(
                "Avg Rating",
                format!("AVERAGE({})", col("Rating")),
                DECIMAL_FORMAT,
                "Average performance rating",
            ),
            kpi(
                "Avg Tenure",
                format!("AVERAGE({})", col("Tenure")),
                DECIMAL_FORMAT,
                "Average tenure in years",
            ),
        ],
        Scenario::Logistics => {
            let mut measures = vec![
                kpi("Shipment Count", rows.clone(), COUNT_FORMAT, "Number of shipments"),
                kpi(
                    "On-Time Rate",
                    true_rate(fact, "OnTime"),
                    PERCENT_FORMAT,
                    "Share of shipments delivered on time",
                ),
                kpi(
                    "Avg Shipping Cost",
                    format!("AVERAGE({})", col("Cost")),
                    CURRENCY_FORMAT,
                    "Average cost per shipment",
                ),
            ];
            for status in &options.logistics_statuses {
                let status = status.trim();
                if status.is_empty() {
                    continue;
                }
                measures.push(kpi(
                    &format!("{} Shipments", status),
                    format!(
                        "CALCULATE({}, {} = {})",
                        rows,
                        col("Status"),
                        string_literal(status)
                    ),
                    COUNT_FORMAT,
                    &format!("Shipments with status {}", status),
                ));
            }
            measures
        }
        Scenario::SaaS => vec![
            kpi(
                "Churn Rate",
                true_rate(fact, "Churned"),
                PERCENT_FORMAT,
                "Share of churned subscriptions",
            ),
            kpi(
                "ARR",
                format!("SUM({}) * 12", col("MRR")),
                CURRENCY_FORMAT,
                "Annual recurring revenue",
            ),
            kpi(
                "Customer Count",
                format!("DISTINCTCOUNT({})", col("CustomerId")),
                COUNT_FORMAT,
                "Distinct subscribing customers",
            ),
            kpi(
                "ARPU",
                format!(
                    "DIVIDE(SUM({}), DISTINCTCOUNT({}), BLANK())",
                    col("MRR"),
                    col("CustomerId")
                ),
                CURRENCY_FORMAT,
                "Average revenue per customer",
            ),
        ],
        Scenario::Retail | Scenario::Social | Scenario::Finance => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::get_schema;

    fn names(measures: &[DaxMeasure]) -> Vec<&str> {
        measures.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn test_portfolio_kpis() {
        let measures = kpi_measures(Scenario::Portfolio, &MeasureOptions::default());
        assert_eq!(
            names(&measures),
            vec![
                "Unique Entities",
                "Above Threshold",
                "Negative Changes",
                "Positive Changes",
                "Avg Controversy Score",
                "Total Market Value",
                "Net Score Change"
            ]
        );
        assert_eq!(
            measures[1].expression,
            "CALCULATE(DISTINCTCOUNT(ControversyScores[EntityId]), ControversyScores[Score] >= 70)"
        );
    }

    #[test]
    fn test_logistics_statuses_from_options() {
        let options = MeasureOptions {
            logistics_statuses: vec!["Delivered".to_string(), "Lost".to_string()],
            ..Default::default()
        };
        let measures = kpi_measures(Scenario::Logistics, &options);
        assert_eq!(
            names(&measures),
            vec![
                "Shipment Count",
                "On-Time Rate",
                "Avg Shipping Cost",
                "Delivered Shipments",
                "Lost Shipments"
            ]
        );
        assert_eq!(
            measures[4].expression,
            "CALCULATE(COUNTROWS(Shipments), Shipments[Status] = \"Lost\")"
        );
    }

    #[test]
    fn test_kpi_columns_exist_in_schema() {
        let options = MeasureOptions::default();
        for scenario in Scenario::ALL {
            let schema = get_schema(scenario);
            for measure in kpi_measures(scenario, &options) {
                for table in &schema.tables {
                    for (start, _) in measure.expression.match_indices(&format!("{}[", table.name)) {
                        let rest = &measure.expression[start + table.name.len() + 1..];
                        let column = rest.split(']').next().unwrap_or_default();
                        assert!(
                            schema.has_column(&table.name, column),
                            "{}: {} references {}[{}]",
                            scenario,
                            measure.name,
                            table.name,
                            column
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_no_kpis_for_retail() {
        assert!(kpi_measures(Scenario::Retail, &MeasureOptions::default()).is_empty());
    }
}
