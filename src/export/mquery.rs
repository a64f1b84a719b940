//! Power Query (M) expressions for table partitions
//!
//! The project package embeds rows as a `#table` constructor; the template
//! points each table at a CSV file under the `{{DATA_SOURCE}}` placeholder.

use super::ExportError;
use crate::models::{DataSnapshot, PbiDataType, PbiTable};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::fmt::Write;

/// Placeholder replaced by the data folder when the template is opened
pub const DATA_SOURCE_PLACEHOLDER: &str = "{{DATA_SOURCE}}";

static PLAIN_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Invalid regex"));

/// M text literal
///
/// Quotes are doubled and control characters written as `#(lf)`-style
/// escapes so a literal never spans lines. A literal `#(` becomes `#(#)(`.
pub fn m_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => out.push_str("\"\""),
            '\n' => out.push_str("#(lf)"),
            '\r' => out.push_str("#(cr)"),
            '\t' => out.push_str("#(tab)"),
            '#' if chars.peek() == Some(&'(') => out.push_str("#(#)"),
            c if c.is_control() => {
                let _ = write!(out, "#({:04X})", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// M field name, quoted as `#"..."` when not a plain identifier
pub fn m_identifier(name: &str) -> String {
    if PLAIN_IDENTIFIER.is_match(name) {
        name.to_string()
    } else {
        format!("#{}", m_string(name))
    }
}

fn m_datetime(value: NaiveDateTime) -> String {
    format!(
        "#datetime({}, {}, {}, {}, {}, {})",
        value.year(),
        value.month(),
        value.day(),
        value.hour(),
        value.minute(),
        value.second()
    )
}

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .or_else(|| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f").ok())
        .or_else(|| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").ok())
}

/// M literal of one cell
///
/// Missing values and values that do not fit the column type become `null`.
pub fn m_value(value: Option<&Value>, data_type: PbiDataType) -> String {
    let Some(value) = value else {
        return "null".to_string();
    };
    match (data_type, value) {
        (_, Value::Null) => "null".to_string(),
        (PbiDataType::String, Value::String(s)) => m_string(s),
        (PbiDataType::String, other) => m_string(&other.to_string()),
        (PbiDataType::DateTime, Value::String(s)) => parse_datetime(s)
            .map(m_datetime)
            .unwrap_or_else(|| "null".to_string()),
        (PbiDataType::Boolean, Value::Bool(b)) => b.to_string(),
        (PbiDataType::Int64 | PbiDataType::Double, Value::Number(n)) => n.to_string(),
        _ => "null".to_string(),
    }
}

/// `type table [...]` row type of a table, keyed by source column
pub fn row_type(table: &PbiTable) -> String {
    let fields: Vec<String> = table
        .columns
        .iter()
        .map(|c| format!("{} = {}", m_identifier(&c.source_column), c.data_type.m_type()))
        .collect();
    format!("type table [{}]", fields.join(", "))
}

/// One row literal, `{v1, v2, ...}`, in column order
pub fn row_literal(table: &PbiTable, row: &Map<String, Value>) -> String {
    let values: Vec<String> = table
        .columns
        .iter()
        .map(|c| m_value(row.get(&c.source_column), c.data_type))
        .collect();
    format!("{{{}}}", values.join(", "))
}

/// Write the `#table` source expression of a table, one row literal per
/// line, every line prefixed with `indent`.
///
/// Rows are converted and appended one at a time. Returns the number of row
/// literals written.
pub fn write_table_source(
    out: &mut String,
    indent: &str,
    table: &PbiTable,
    snapshot: &DataSnapshot,
) -> Result<usize, ExportError> {
    let _ = writeln!(out, "{}let", indent);
    let _ = writeln!(out, "{}    Source = #table(", indent);
    let _ = writeln!(out, "{}        {},", indent, row_type(table));
    let _ = writeln!(out, "{}        {{", indent);

    let mut written = 0;
    if let Some(collection) = table.source {
        snapshot.visit_rows(collection, |row| {
            if written > 0 {
                out.push_str(",\n");
            }
            out.push_str(indent);
            out.push_str("            ");
            out.push_str(&row_literal(table, row));
            written += 1;
        })?;
    }
    if written > 0 {
        out.push('\n');
    }

    let _ = writeln!(out, "{}        }}", indent);
    let _ = writeln!(out, "{}    )", indent);
    let _ = writeln!(out, "{}in", indent);
    let _ = writeln!(out, "{}    Source", indent);
    Ok(written)
}

fn transform_type(data_type: PbiDataType) -> String {
    let m_type = data_type.m_type();
    if m_type.contains('.') {
        m_type.to_string()
    } else {
        format!("type {}", m_type)
    }
}

/// CSV import expression pointing at `{{DATA_SOURCE}}\<Table>.csv`
pub fn csv_placeholder_source(table: &PbiTable) -> Vec<String> {
    let path = format!("{}\\{}.csv", DATA_SOURCE_PLACEHOLDER, table.name);
    let types: Vec<String> = table
        .columns
        .iter()
        .map(|c| format!("{{{}, {}}}", m_string(&c.source_column), transform_type(c.data_type)))
        .collect();
    vec![
        "let".to_string(),
        format!(
            "    Source = Csv.Document(File.Contents({}), [Delimiter=\",\", Encoding=65001, QuoteStyle=QuoteStyle.Csv]),",
            m_string(&path)
        ),
        "    Promoted = Table.PromoteHeaders(Source, [PromoteAllScalars=true]),".to_string(),
        format!(
            "    Typed = Table.TransformColumnTypes(Promoted, {{{}}})",
            types.join(", ")
        ),
        "in".to_string(),
        "    Typed".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DataCollection, PbiColumn, ShipmentRow};
    use serde_json::json;

    fn shipments_table() -> PbiTable {
        PbiTable::new(
            "Shipments",
            "",
            vec![
                PbiColumn::key("ShipmentId", "shipmentId", PbiDataType::String),
                PbiColumn::new("Date", "date", PbiDataType::DateTime),
                PbiColumn::new("DeliveryDays", "deliveryDays", PbiDataType::Int64),
                PbiColumn::new("OnTime", "onTime", PbiDataType::Boolean),
                PbiColumn::new("Carrier", "carrier", PbiDataType::String),
            ],
        )
        .with_source(DataCollection::Shipments)
    }

    fn shipment(id: usize, carrier: &str) -> ShipmentRow {
        ShipmentRow {
            shipment_id: format!("SH-{}", id),
            date: NaiveDate::from_ymd_opt(2024, 2, 9).unwrap(),
            origin: "Lyon".to_string(),
            destination: "Oslo".to_string(),
            carrier: carrier.to_string(),
            status: "Delivered".to_string(),
            weight: 1.5,
            cost: 10.0,
            delivery_days: 3,
            on_time: id % 2 == 0,
        }
    }

    #[test]
    fn test_m_values() {
        assert_eq!(m_value(Some(&json!("say \"hi\"")), PbiDataType::String), "\"say \"\"hi\"\"\"");
        assert_eq!(
            m_value(Some(&json!("2024-03-01")), PbiDataType::DateTime),
            "#datetime(2024, 3, 1, 0, 0, 0)"
        );
        assert_eq!(
            m_value(Some(&json!("2024-03-01T14:05:09")), PbiDataType::DateTime),
            "#datetime(2024, 3, 1, 14, 5, 9)"
        );
        assert_eq!(m_value(Some(&json!(true)), PbiDataType::Boolean), "true");
        assert_eq!(m_value(Some(&json!(42)), PbiDataType::Int64), "42");
        assert_eq!(m_value(Some(&json!(1.25)), PbiDataType::Double), "1.25");
        assert_eq!(m_value(None, PbiDataType::Double), "null");
        assert_eq!(m_value(Some(&Value::Null), PbiDataType::String), "null");
        assert_eq!(m_value(Some(&json!("n/a")), PbiDataType::DateTime), "null");
    }

    #[test]
    fn test_text_escapes_stay_on_one_line() {
        assert_eq!(m_string("a\nb"), "\"a#(lf)b\"");
        assert_eq!(m_string("a\r\nb\tc"), "\"a#(cr)#(lf)b#(tab)c\"");
        assert_eq!(m_string("#(lf) #1"), "\"#(#)(lf) #1\"");
        assert_eq!(m_string("bell\u{7}"), "\"bell#(0007)\"");

        let table = shipments_table();
        let mut row = shipment(1, "Line one\nLine two");
        row.shipment_id = "SH-\"1\"".to_string();
        let Value::Object(row) = serde_json::to_value(row).unwrap() else {
            panic!("row is not an object")
        };
        let literal = row_literal(&table, &row);
        assert!(!literal.contains('\n'));
        assert!(literal.ends_with("\"Line one#(lf)Line two\"}"));
        assert!(literal.starts_with("{\"SH-\"\"1\"\"\""));
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(m_identifier("revenuePL"), "revenuePL");
        assert_eq!(m_identifier("Sub Category"), "#\"Sub Category\"");
    }

    #[test]
    fn test_row_literal_follows_column_order() {
        let table = shipments_table();
        let row = serde_json::to_value(shipment(2, "DHL")).unwrap();
        let Value::Object(row) = row else {
            panic!("row is not an object")
        };
        assert_eq!(
            row_literal(&table, &row),
            "{\"SH-2\", #datetime(2024, 2, 9, 0, 0, 0), 3, true, \"DHL\"}"
        );
    }

    #[test]
    fn test_row_count_round_trip() {
        let table = shipments_table();
        let snapshot = DataSnapshot {
            shipments: (0..500).map(|i| shipment(i, "UPS")).collect(),
            ..Default::default()
        };
        let mut out = String::new();
        let written = write_table_source(&mut out, "\t", &table, &snapshot).unwrap();

        assert_eq!(written, 500);
        let row_lines = out.lines().filter(|l| l.trim_start().starts_with("{\"SH-")).count();
        assert_eq!(row_lines, 500);
        assert!(out.contains("type table [shipmentId = text, date = datetime"));
        assert!(out.trim_end().ends_with("Source"));
    }

    #[test]
    fn test_empty_collection_has_empty_rows() {
        let mut out = String::new();
        let written =
            write_table_source(&mut out, "", &shipments_table(), &DataSnapshot::default()).unwrap();
        assert_eq!(written, 0);
        assert!(out.contains("        {\n        }\n"));
    }

    #[test]
    fn test_csv_placeholder() {
        let lines = csv_placeholder_source(&shipments_table());
        assert!(lines[1].contains("File.Contents(\"{{DATA_SOURCE}}\\Shipments.csv\")"));
        assert!(lines[3].contains("{\"deliveryDays\", Int64.Type}"));
        assert!(lines[3].contains("{\"onTime\", type logical}"));
    }
}
