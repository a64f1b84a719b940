//! Inputs shared by both writers, derived once per export

use crate::config::ExportConfig;
use crate::dax::MeasureGenerator;
use crate::layout::LayoutConverter;
use crate::models::{DashboardItem, DaxMeasure, PbiSchema, PbiVisualConfig, Scenario};
use crate::schema::{FieldMapper, get_fact_table, get_schema};
use crate::validation::{BindingIssue, SchemaValidator, validate_bindings};
use tracing::{debug, warn};

use super::projection::ProjectionBuilder;

/// Schema, measures, visuals and diagnostics of one export
#[derive(Debug, Clone)]
pub struct ExportPlan<'a> {
    pub scenario: Scenario,
    pub schema: &'static PbiSchema,
    pub fact_table: &'static str,
    pub items: &'a [DashboardItem],
    pub measures: Vec<DaxMeasure>,
    pub visuals: Vec<PbiVisualConfig>,
    pub issues: Vec<BindingIssue>,
    pub page_width: f64,
    pub page_height: f64,
}

impl<'a> ExportPlan<'a> {
    /// Validate, generate measures and lay out visuals
    ///
    /// Validation findings are logged and kept; they never stop the export.
    pub fn prepare(config: &ExportConfig, items: &'a [DashboardItem], scenario: Scenario) -> Self {
        let schema = get_schema(scenario);
        let fact_table = get_fact_table(scenario);

        SchemaValidator::new()
            .validate(schema, fact_table)
            .log_issues(scenario.as_str());

        let issues = validate_bindings(items, scenario, config.canvas.columns);
        for issue in &issues {
            warn!("{}", issue);
        }

        let measures = MeasureGenerator::new(config.measures.clone()).generate(items, scenario);
        let layout = LayoutConverter::new(config.canvas);
        let visuals = layout.convert_all(items);
        let page_height = layout.page_height(&visuals);

        debug!(
            "Prepared {} export: {} visuals, {} measures, {} binding issues",
            scenario,
            visuals.len(),
            measures.len(),
            issues.len()
        );

        Self {
            scenario,
            schema,
            fact_table,
            items,
            measures,
            visuals,
            issues,
            page_width: config.canvas.width,
            page_height,
        }
    }

    pub fn projections(&self) -> ProjectionBuilder<'_> {
        ProjectionBuilder::new(FieldMapper::new(self.scenario), &self.measures, self.items)
    }

    /// Visual configs paired with their items, in dashboard order
    pub fn visuals(&self) -> impl Iterator<Item = (&DashboardItem, &PbiVisualConfig)> {
        self.items.iter().zip(self.visuals.iter())
    }
}
