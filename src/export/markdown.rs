//! Markdown guides shipped with export packages
//!
//! Each package gets a guide describing the model it contains and how to
//! open it in Power BI Desktop.

use super::mquery::DATA_SOURCE_PLACEHOLDER;
use crate::models::{DaxMeasure, PbiSchema, Scenario};
use crate::validation::BindingIssue;

/// What the guide is written for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideKind {
    /// Legacy template, data loaded from CSV files
    Template,
    /// PBIP project with embedded rows
    Project,
}

/// Inputs of one guide
#[derive(Debug, Clone)]
pub struct GuideContext<'a> {
    pub project: &'a str,
    pub scenario: Scenario,
    pub schema: &'a PbiSchema,
    pub fact_table: &'a str,
    pub measures: &'a [DaxMeasure],
    /// Embedded rows per table, project packages only
    pub row_counts: &'a [(String, usize)],
    pub issues: &'a [BindingIssue],
    pub exported_at: String,
}

/// Renders package guides
#[derive(Debug, Default, Clone, Copy)]
pub struct GuideWriter;

impl GuideWriter {
    pub fn new() -> Self {
        Self
    }

    /// Render the guide for a package
    ///
    /// # Arguments
    ///
    /// * `kind` - Package shape the guide describes
    /// * `ctx` - Model, measures and diagnostics of the export
    pub fn render(&self, kind: GuideKind, ctx: &GuideContext<'_>) -> String {
        let mut md = String::new();

        let shape = match kind {
            GuideKind::Template => "Power BI Template",
            GuideKind::Project => "Power BI Project",
        };
        md.push_str(&format!("# {} ({})\n\n", ctx.project, shape));

        md.push_str("| Property | Value |\n");
        md.push_str("|----------|-------|\n");
        md.push_str(&format!("| **Scenario** | {} |\n", ctx.scenario));
        md.push_str(&format!("| **Fact table** | {} |\n", ctx.fact_table));
        md.push_str(&format!("| **Tables** | {} |\n", ctx.schema.tables.len()));
        md.push_str(&format!("| **Measures** | {} |\n", ctx.measures.len()));
        md.push_str(&format!("| **Exported** | {} |\n", ctx.exported_at));
        md.push('\n');

        md.push_str("## Opening the package\n\n");
        match kind {
            GuideKind::Template => self.template_steps(&mut md, ctx),
            GuideKind::Project => self.project_steps(&mut md, ctx),
        }

        md.push_str("## Tables\n\n");
        for table in &ctx.schema.tables {
            md.push_str(&format!("### {}\n\n", table.name));
            if !table.description.is_empty() {
                md.push_str(&table.description);
                md.push_str("\n\n");
            }
            md.push_str("| Column | Type | Source column |\n");
            md.push_str("|--------|------|---------------|\n");
            for column in &table.columns {
                let hidden = if column.is_hidden { " *(hidden)*" } else { "" };
                md.push_str(&format!(
                    "| {}{} | {} | `{}` |\n",
                    column.name,
                    hidden,
                    column.data_type.as_str(),
                    column.source_column
                ));
            }
            md.push('\n');
        }

        if !ctx.schema.relationships.is_empty() {
            md.push_str("## Relationships\n\n");
            md.push_str("| From | To | Cardinality | Cross filter |\n");
            md.push_str("|------|----|-------------|--------------|\n");
            for rel in &ctx.schema.relationships {
                md.push_str(&format!(
                    "| {}[{}] | {}[{}] | {} → {} | {} |\n",
                    rel.from_table,
                    rel.from_column,
                    rel.to_table,
                    rel.to_column,
                    rel.from_cardinality.as_str(),
                    rel.to_cardinality.as_str(),
                    rel.cross_filtering_behavior.as_str()
                ));
            }
            md.push('\n');
        }

        if !ctx.measures.is_empty() {
            md.push_str(&format!("## Measures ({})\n\n", ctx.fact_table));
            md.push_str("| Measure | Folder | Format | Expression |\n");
            md.push_str("|---------|--------|--------|------------|\n");
            for measure in ctx.measures {
                md.push_str(&format!(
                    "| {} | {} | `{}` | `{}` |\n",
                    measure.name,
                    measure.display_folder,
                    measure.format_string,
                    single_line(&measure.expression)
                ));
            }
            md.push('\n');
        }

        if !ctx.issues.is_empty() {
            md.push_str("## Binding warnings\n\n");
            for issue in ctx.issues {
                md.push_str(&format!("- {}\n", issue));
            }
            md.push('\n');
        }

        md
    }

    fn template_steps(&self, md: &mut String, ctx: &GuideContext<'_>) {
        md.push_str("The template carries the model and report layout without data.\n\n");
        md.push_str(&format!(
            "1. Export one CSV file per table (`{}`) into a folder.\n",
            ctx.schema
                .tables
                .iter()
                .map(|t| format!("{}.csv", t.name))
                .collect::<Vec<_>>()
                .join("`, `")
        ));
        md.push_str("2. Open the `.pbit` file in Power BI Desktop.\n");
        md.push_str(&format!(
            "3. In Transform Data, replace `{}` in each query source with the folder path.\n",
            DATA_SOURCE_PLACEHOLDER
        ));
        md.push_str("4. Close & Apply to load the data.\n\n");
    }

    fn project_steps(&self, md: &mut String, ctx: &GuideContext<'_>) {
        md.push_str("1. Extract the archive.\n");
        md.push_str(&format!(
            "2. Open `{}.pbip` in Power BI Desktop (Developer Mode).\n",
            ctx.project
        ));
        md.push_str("3. Refresh to load the embedded rows.\n\n");

        if !ctx.row_counts.is_empty() {
            md.push_str("| Table | Embedded rows |\n");
            md.push_str("|-------|---------------|\n");
            for (table, rows) in ctx.row_counts {
                md.push_str(&format!("| {} | {} |\n", table, rows));
            }
            md.push('\n');
        }
    }
}

fn single_line(expression: &str) -> String {
    expression
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "\\|")
}
