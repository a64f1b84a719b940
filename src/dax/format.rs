//! Format strings for measures and columns

use crate::models::{Aggregation, PbiColumn, PbiDataType};
use crate::schema::{is_currency_metric, is_percent_metric};

pub const PERCENT_FORMAT: &str = "0.00%";
pub const CURRENCY_FORMAT: &str = "\\$#,0.00";
pub const DECIMAL_FORMAT: &str = "#,0.00";
/// Row and distinct counts
pub const COUNT_FORMAT: &str = "#,0";
/// Whole-number columns
pub const INTEGER_FORMAT: &str = "0";
pub const DATE_FORMAT: &str = "yyyy-mm-dd";

/// Format of a value derived from `metric`, chosen from its name
pub fn metric_format(metric: &str) -> &'static str {
    if is_percent_metric(metric) {
        PERCENT_FORMAT
    } else if is_currency_metric(metric) {
        CURRENCY_FORMAT
    } else {
        DECIMAL_FORMAT
    }
}

/// Format of an aggregation measure over `metric`
pub fn measure_format(metric: &str, aggregation: Aggregation) -> &'static str {
    if aggregation.is_count() {
        COUNT_FORMAT
    } else {
        metric_format(metric)
    }
}

/// Display format of a model column; text and boolean columns have none
pub fn column_format(column: &PbiColumn) -> Option<&'static str> {
    match column.data_type {
        PbiDataType::DateTime => Some(DATE_FORMAT),
        PbiDataType::Int64 => Some(INTEGER_FORMAT),
        PbiDataType::Double if is_currency_metric(&column.name) => Some(CURRENCY_FORMAT),
        PbiDataType::Double => Some(DECIMAL_FORMAT),
        PbiDataType::String | PbiDataType::Boolean => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_formats() {
        assert_eq!(metric_format("revenue"), "\\$#,0.00");
        assert_eq!(metric_format("churnRate"), "0.00%");
        assert_eq!(metric_format("quantity"), "#,0.00");
        assert_eq!(measure_format("revenue", Aggregation::Count), "#,0");
        assert_eq!(measure_format("revenue", Aggregation::DistinctCount), "#,0");
    }

    #[test]
    fn test_column_formats() {
        let date = PbiColumn::new("Date", "date", PbiDataType::DateTime);
        let qty = PbiColumn::new("Quantity", "quantity", PbiDataType::Int64);
        let cost = PbiColumn::new("Cost", "cost", PbiDataType::Double);
        let rating = PbiColumn::new("Rating", "rating", PbiDataType::Double);
        let region = PbiColumn::new("Region", "region", PbiDataType::String);

        assert_eq!(column_format(&date), Some("yyyy-mm-dd"));
        assert_eq!(column_format(&qty), Some("0"));
        assert_eq!(column_format(&cost), Some("\\$#,0.00"));
        assert_eq!(column_format(&rating), Some("#,0.00"));
        assert_eq!(column_format(&region), None);
    }
}
