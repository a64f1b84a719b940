//! TMDL (Tabular Model Definition Language) documents of the semantic model

use super::ExportError;
use super::ids::IdGenerator;
use super::mquery::write_table_source;
use crate::dax::format::column_format;
use crate::models::{
    CrossFilteringBehavior, DataSnapshot, DaxMeasure, PbiColumn, PbiRelationship, PbiSchema,
    PbiTable,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Write;

/// Compatibility level of the generated model
pub const COMPATIBILITY_LEVEL: u32 = 1567;

static PLAIN_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Invalid regex"));

/// Object name, single-quoted when it is not a plain identifier
pub fn tmdl_name(name: &str) -> String {
    if PLAIN_NAME.is_match(name) {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "''"))
    }
}

/// `Table.Column` reference used by relationships
pub fn column_path(table: &str, column: &str) -> String {
    format!("{}.{}", tmdl_name(table), tmdl_name(column))
}

fn description(out: &mut String, indent: &str, text: &str) {
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        let _ = writeln!(out, "{}/// {}", indent, line.trim());
    }
}

fn write_measure(out: &mut String, measure: &DaxMeasure, ids: &dyn IdGenerator) {
    description(out, "\t", &measure.description);
    let name = tmdl_name(&measure.name);
    if measure.is_multiline() {
        let _ = writeln!(out, "\tmeasure {} =", name);
        for line in measure.expression.lines() {
            let _ = writeln!(out, "\t\t\t{}", line);
        }
    } else {
        let _ = writeln!(out, "\tmeasure {} = {}", name, measure.expression);
    }
    if !measure.format_string.is_empty() {
        let _ = writeln!(out, "\t\tformatString: {}", measure.format_string);
    }
    if !measure.display_folder.is_empty() {
        let _ = writeln!(out, "\t\tdisplayFolder: {}", measure.display_folder);
    }
    let _ = writeln!(out, "\t\tlineageTag: {}", ids.next_id());
    out.push('\n');
}

fn write_column(out: &mut String, column: &PbiColumn, ids: &dyn IdGenerator) {
    let _ = writeln!(out, "\tcolumn {}", tmdl_name(&column.name));
    let _ = writeln!(out, "\t\tdataType: {}", column.data_type.as_str());
    if let Some(format) = column_format(column) {
        let _ = writeln!(out, "\t\tformatString: {}", format);
    }
    if column.is_hidden {
        out.push_str("\t\tisHidden\n");
    }
    let _ = writeln!(out, "\t\tlineageTag: {}", ids.next_id());
    let _ = writeln!(out, "\t\tsummarizeBy: {}", column.summarize_by.as_str());
    let _ = writeln!(out, "\t\tsourceColumn: {}", column.source_column);
    out.push('\n');
    out.push_str("\t\tannotation SummarizationSetBy = Automatic\n\n");
}

/// A rendered table document
#[derive(Debug, Clone)]
pub struct TableDocument {
    pub content: String,
    /// Row literals embedded in the partition
    pub rows: usize,
}

/// `tables/<Table>.tmdl`: columns, the given measures and an import
/// partition embedding the table's snapshot rows
pub fn table_tmdl(
    table: &PbiTable,
    measures: &[DaxMeasure],
    snapshot: &DataSnapshot,
    ids: &dyn IdGenerator,
) -> Result<TableDocument, ExportError> {
    let mut out = String::new();
    description(&mut out, "", &table.description);
    let _ = writeln!(out, "table {}", tmdl_name(&table.name));
    let _ = writeln!(out, "\tlineageTag: {}", ids.next_id());
    out.push('\n');

    for measure in measures {
        write_measure(&mut out, measure, ids);
    }
    for column in &table.columns {
        write_column(&mut out, column, ids);
    }

    let _ = writeln!(out, "\tpartition {} = m", tmdl_name(&table.name));
    out.push_str("\t\tmode: import\n");
    out.push_str("\t\tsource =\n");
    let rows = write_table_source(&mut out, "\t\t\t\t", table, snapshot)?;
    out.push('\n');
    out.push_str("\tannotation PBI_ResultType = Table\n");

    Ok(TableDocument { content: out, rows })
}

pub fn database_tmdl() -> String {
    format!("database\n\tcompatibilityLevel: {}\n", COMPATIBILITY_LEVEL)
}

pub fn model_tmdl(schema: &PbiSchema, culture: &str) -> String {
    let mut out = String::new();
    out.push_str("model Model\n");
    let _ = writeln!(out, "\tculture: {}", culture);
    out.push_str("\tdefaultPowerBIDataSourceVersion: powerBI_V3\n");
    let _ = writeln!(out, "\tsourceQueryCulture: {}", culture);
    out.push_str("\tdataAccessOptions\n");
    out.push_str("\t\tlegacyRedirects\n");
    out.push_str("\t\treturnErrorValuesAsNull\n\n");

    let order: Vec<String> = schema
        .tables
        .iter()
        .map(|t| format!("\"{}\"", t.name.replace('"', "\\\"")))
        .collect();
    let _ = writeln!(out, "annotation PBI_QueryOrder = [{}]\n", order.join(","));
    out.push_str("annotation __PBI_TimeIntelligenceEnabled = 0\n\n");

    for table in &schema.tables {
        let _ = writeln!(out, "ref table {}", tmdl_name(&table.name));
    }
    out
}

fn write_relationship(out: &mut String, rel: &PbiRelationship, ids: &dyn IdGenerator) {
    let _ = writeln!(out, "relationship {}", ids.next_id());
    if !rel.is_active {
        out.push_str("\tisActive: false\n");
    }
    if rel.cross_filtering_behavior == CrossFilteringBehavior::BothDirections {
        let _ = writeln!(
            out,
            "\tcrossFilteringBehavior: {}",
            rel.cross_filtering_behavior.as_str()
        );
    }
    let _ = writeln!(out, "\tfromCardinality: {}", rel.from_cardinality.as_str());
    let _ = writeln!(out, "\ttoCardinality: {}", rel.to_cardinality.as_str());
    let _ = writeln!(out, "\tfromColumn: {}", column_path(&rel.from_table, &rel.from_column));
    let _ = writeln!(out, "\ttoColumn: {}", column_path(&rel.to_table, &rel.to_column));
    out.push('\n');
}

/// `relationships.tmdl`; `None` when the schema has no relationships
pub fn relationships_tmdl(schema: &PbiSchema, ids: &dyn IdGenerator) -> Option<String> {
    if schema.relationships.is_empty() {
        return None;
    }
    let mut out = String::new();
    for rel in &schema.relationships {
        write_relationship(&mut out, rel, ids);
    }
    Some(out)
}
