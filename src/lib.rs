//! Phantom Power BI export engine
//!
//! Translates Phantom dashboards (visuals bound to fields of a synthetic
//! scenario data model) into Power BI artifacts:
//! - Legacy templates (`.pbit`): tabular model, measures and report layout
//! - Project packages (PBIP): TMDL model with embedded rows and PBIR visuals
//!
//! Provides:
//! - Scenario star schemas and semantic field resolution ([`schema`])
//! - DAX measure generation ([`dax`])
//! - Grid to canvas layout conversion ([`layout`])
//! - Schema and binding validation ([`validation`])
//! - Package writers and archive assembly ([`export`])
//! - File based configuration ([`config`])

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod dax;
pub mod export;
pub mod layout;
pub mod models;
pub mod schema;
pub mod validation;

// Re-export commonly used types
pub use config::{ConfigError, ExportConfig};
pub use dax::{MeasureGenerator, extract_bindings, variance_percent};
#[cfg(feature = "native-fs")]
pub use export::{FileSystemSink, PackageSink};
pub use export::{
    Clock, ExportError, ExportPackage, FixedClock, IdGenerator, PackageTransport,
    ProjectExporter, RandomIdGenerator, SequentialIdGenerator, SystemClock, TemplateExporter,
};
pub use layout::{LayoutConverter, map_visual_type};
pub use schema::{FieldMapper, FieldMapping, SemanticField, get_fact_table, get_schema, map_field};
pub use validation::{BindingIssue, SchemaIssue, SchemaValidator};

// Re-export models
pub use models::enums::*;
pub use models::{DashboardItem, DataSnapshot, DaxMeasure, PbiRelationship, PbiSchema, PbiTable};

// WASM bindings for the export functions
#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
mod wasm {
    use crate::config::ExportConfig;
    use crate::dax::MeasureGenerator;
    use crate::export::{ExportError, ExportPackage, ProjectExporter, TemplateExporter};
    use crate::models::{DashboardItem, DataSnapshot, Scenario};
    use serde::Serialize;
    use wasm_bindgen::prelude::*;

    /// Convert ExportError to JsValue for JavaScript error handling
    fn export_error_to_js(err: ExportError) -> JsValue {
        JsValue::from_str(&err.to_string())
    }

    fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
        serde_json::to_string(value)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    fn parse_items(items_json: &str) -> Result<Vec<DashboardItem>, JsValue> {
        serde_json::from_str(items_json)
            .map_err(|e| JsValue::from_str(&format!("Deserialization error: {}", e)))
    }

    /// Parse an optional TOML configuration; empty input means defaults
    fn parse_config(config_toml: &str) -> Result<ExportConfig, JsValue> {
        if config_toml.trim().is_empty() {
            return Ok(ExportConfig::default());
        }
        ExportConfig::parse(config_toml).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    fn package_json(package: Result<ExportPackage, ExportError>) -> Result<String, JsValue> {
        let package = package.map_err(export_error_to_js)?;
        to_json(&package.to_transport())
    }

    /// Generate the DAX measures of a dashboard.
    ///
    /// # Arguments
    ///
    /// * `items_json` - JSON array of dashboard items
    /// * `scenario` - Scenario name; unknown names fall back to Retail
    ///
    /// # Returns
    ///
    /// JSON array of measures, or JsValue error
    #[wasm_bindgen]
    pub fn generate_measures(items_json: &str, scenario: &str) -> Result<String, JsValue> {
        let items = parse_items(items_json)?;
        let measures = MeasureGenerator::default().generate(&items, Scenario::from_name(scenario));
        to_json(&measures)
    }

    /// Star schema of a scenario as JSON.
    #[wasm_bindgen]
    pub fn scenario_schema(scenario: &str) -> Result<String, JsValue> {
        to_json(crate::schema::get_schema(Scenario::from_name(scenario)))
    }

    /// Build a legacy template package.
    ///
    /// # Returns
    ///
    /// JSON `{archive, documentation, filename}` with a base64 archive
    #[wasm_bindgen]
    pub fn export_template(items_json: &str, scenario: &str, config_toml: &str) -> Result<String, JsValue> {
        let items = parse_items(items_json)?;
        let config = parse_config(config_toml)?;
        package_json(TemplateExporter::new(config).build(&items, Scenario::from_name(scenario)))
    }

    /// Build a project package embedding the snapshot rows.
    ///
    /// # Returns
    ///
    /// JSON `{archive, documentation, filename}` with a base64 archive
    #[wasm_bindgen]
    pub fn export_project(
        items_json: &str,
        scenario: &str,
        snapshot_json: &str,
        config_toml: &str,
    ) -> Result<String, JsValue> {
        let items = parse_items(items_json)?;
        let snapshot: DataSnapshot = serde_json::from_str(snapshot_json)
            .map_err(|e| JsValue::from_str(&format!("Deserialization error: {}", e)))?;
        let config = parse_config(config_toml)?;
        package_json(ProjectExporter::new(config).build(
            &items,
            Scenario::from_name(scenario),
            &snapshot,
        ))
    }
}
