//! DAX measure generation
//!
//! [`MeasureGenerator`] derives the measure set of an export from the
//! dashboard bindings: base aggregations, plan and prior-year variances,
//! waterfall bridges and the fixed KPI set of the scenario.

pub mod format;
pub mod generator;
pub mod kpi;
pub mod variance;
pub mod waterfall;

use once_cell::sync::Lazy;
use regex::Regex;

pub use generator::{
    MeasureGenerator, MetricBinding, base_measure_name, binding_aggregation, extract_bindings,
};
pub use variance::variance_percent;

static PLAIN_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Invalid regex"));

/// DAX table reference, quoted when the name is not a plain identifier
pub fn table_ref(table: &str) -> String {
    if PLAIN_IDENTIFIER.is_match(table) {
        table.to_string()
    } else {
        format!("'{}'", table.replace('\'', "''"))
    }
}

/// DAX column reference, e.g. `Sales[Revenue]`
pub fn column_ref(table: &str, column: &str) -> String {
    format!("{}[{}]", table_ref(table), column.replace(']', "]]"))
}

/// DAX measure reference, e.g. `[Total Revenue]`
pub fn measure_ref(measure: &str) -> String {
    format!("[{}]", measure.replace(']', "]]"))
}

/// DAX string literal
pub fn string_literal(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_references() {
        assert_eq!(column_ref("Sales", "Revenue"), "Sales[Revenue]");
        assert_eq!(column_ref("Sales Data", "Revenue"), "'Sales Data'[Revenue]");
        assert_eq!(column_ref("O'Brien", "X"), "'O''Brien'[X]");
        assert_eq!(measure_ref("Total Revenue"), "[Total Revenue]");
        assert_eq!(string_literal("In \"Transit\""), "\"In \"\"Transit\"\"\"");
    }
}
