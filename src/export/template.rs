//! Legacy template (`.pbit`) writer
//!
//! The template holds the tabular model, the report layout and the
//! generated measures. Each table is loaded from a CSV file below the
//! `{{DATA_SOURCE}}` placeholder; no rows are embedded.

use super::archive::{ArchiveBuilder, suggested_filename};
use super::ids::{Clock, IdGenerator, RandomIdGenerator, SystemClock, object_name};
use super::markdown::{GuideContext, GuideKind, GuideWriter};
use super::mquery::csv_placeholder_source;
use super::plan::ExportPlan;
use super::projection::{FieldRef, Projection};
use super::tmdl::COMPATIBILITY_LEVEL;
use super::{ExportError, ExportPackage};
use crate::config::ExportConfig;
use crate::dax::format::column_format;
use crate::models::{DashboardItem, DaxMeasure, PbiColumn, PbiRelationship, PbiTable, Scenario, VisualFamily};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="utf-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="json" ContentType="" /><Override PartName="/DataModelSchema" ContentType="" /><Override PartName="/Report/Layout" ContentType="" /><Override PartName="/Settings" ContentType="" /><Override PartName="/Metadata" ContentType="" /></Types>"#;

/// UTF-16LE bytes of a string, without byte order mark
pub fn utf16le(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Expression {
    Single(String),
    Lines(Vec<String>),
}

impl Expression {
    fn of(text: &str) -> Self {
        if text.contains('\n') {
            Expression::Lines(text.lines().map(str::to_string).collect())
        } else {
            Expression::Single(text.to_string())
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ModelColumn {
    name: String,
    data_type: &'static str,
    source_column: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    format_string: Option<&'static str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    is_hidden: bool,
    lineage_tag: String,
    summarize_by: &'static str,
}

#[derive(Debug, Serialize)]
struct PartitionSource {
    #[serde(rename = "type")]
    source_type: &'static str,
    expression: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ModelPartition {
    name: String,
    mode: &'static str,
    source: PartitionSource,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ModelMeasure {
    name: String,
    expression: Expression,
    #[serde(skip_serializing_if = "String::is_empty")]
    format_string: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    display_folder: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    description: String,
    lineage_tag: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ModelTable {
    name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    description: String,
    lineage_tag: String,
    columns: Vec<ModelColumn>,
    partitions: Vec<ModelPartition>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    measures: Vec<ModelMeasure>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ModelRelationship {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_active: Option<bool>,
    cross_filtering_behavior: &'static str,
    from_cardinality: &'static str,
    to_cardinality: &'static str,
    from_table: String,
    from_column: String,
    to_table: String,
    to_column: String,
}

#[derive(Debug, Serialize)]
struct Annotation {
    name: String,
    value: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Model {
    culture: String,
    data_access_options: Value,
    default_power_bi_data_source_version: &'static str,
    tables: Vec<ModelTable>,
    relationships: Vec<ModelRelationship>,
    annotations: Vec<Annotation>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DataModelSchema {
    name: String,
    compatibility_level: u32,
    model: Model,
}

/// Writes legacy template packages
///
/// Identifiers and the export timestamp come from the injected sources;
/// with fixed sources identical inputs give byte-identical archives.
pub struct TemplateExporter {
    config: ExportConfig,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl TemplateExporter {
    /// Exporter with random ids and the system clock
    pub fn new(config: ExportConfig) -> Self {
        Self {
            config,
            ids: Arc::new(RandomIdGenerator),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Build the template package for a dashboard
    ///
    /// # Example
    ///
    /// ```rust
    /// use phantom_pbi_export::config::ExportConfig;
    /// use phantom_pbi_export::export::{FixedClock, SequentialIdGenerator, TemplateExporter};
    /// use phantom_pbi_export::models::{DashboardItem, GridLayout, Scenario};
    /// use serde_json::json;
    /// use std::sync::Arc;
    ///
    /// let items = vec![DashboardItem::new(
    ///     "c1",
    ///     "card",
    ///     "Revenue",
    ///     GridLayout::new(0, 0, 3, 2),
    ///     json!({"metric": "revenue"}),
    /// )];
    /// let package = TemplateExporter::new(ExportConfig::default())
    ///     .with_ids(Arc::new(SequentialIdGenerator::new(1)))
    ///     .with_clock(Arc::new(FixedClock::on_date(2024, 6, 1)))
    ///     .build(&items, Scenario::Retail)
    ///     .unwrap();
    /// assert_eq!(package.filename, "Phantom_Retail_2024-06-01.pbit");
    /// ```
    pub fn build(&self, items: &[DashboardItem], scenario: Scenario) -> Result<ExportPackage, ExportError> {
        let plan = ExportPlan::prepare(&self.config, items, scenario);
        let now = self.clock.now();

        let mut archive = ArchiveBuilder::with_options(self.config.archive);
        archive.add_text("[Content_Types].xml", CONTENT_TYPES);

        let schema = serde_json::to_string(&self.data_model_schema(&plan))?;
        archive.add_bytes("DataModelSchema", utf16le(&schema));

        let layout = serde_json::to_string(&self.report_layout(&plan)?)?;
        archive.add_bytes("Report/Layout", utf16le(&layout));

        archive.add_json("Settings", settings());
        archive.add_json(
            "Metadata",
            json!({
                "Version": 5,
                "AutoCreatedRelationships": [],
                "CreatedFrom": "Cloud",
                "exportedAt": now.to_rfc3339(),
                "phantom": {
                    "project": self.config.project.name,
                    "scenario": scenario.as_str(),
                    "visuals": plan.visuals.len(),
                    "measures": plan.measures.len()
                }
            }),
        );

        let bytes = archive.finish()?;

        let documentation = GuideWriter::new().render(
            GuideKind::Template,
            &GuideContext {
                project: &self.config.project.name,
                scenario,
                schema: plan.schema,
                fact_table: plan.fact_table,
                measures: &plan.measures,
                row_counts: &[],
                issues: &plan.issues,
                exported_at: now.to_rfc3339(),
            },
        );
        let filename = suggested_filename(
            &format!("{}_{}", self.config.project.name, scenario),
            now.date_naive(),
            "pbit",
        );

        info!(
            "Built template {} ({} entries, {} bytes)",
            filename,
            archive.len(),
            bytes.len()
        );
        Ok(ExportPackage {
            archive: bytes,
            documentation,
            filename,
        })
    }

    fn data_model_schema(&self, plan: &ExportPlan<'_>) -> DataModelSchema {
        let tables = plan
            .schema
            .tables
            .iter()
            .map(|table| {
                let measures: &[DaxMeasure] = if table.name == plan.fact_table {
                    &plan.measures
                } else {
                    &[]
                };
                self.model_table(table, measures)
            })
            .collect();

        let relationships = plan
            .schema
            .relationships
            .iter()
            .map(|rel| self.model_relationship(rel))
            .collect();

        let query_order: Vec<String> = plan
            .schema
            .tables
            .iter()
            .map(|t| format!("\"{}\"", t.name))
            .collect();

        DataModelSchema {
            name: self.ids.next_id(),
            compatibility_level: COMPATIBILITY_LEVEL,
            model: Model {
                culture: self.config.project.culture.clone(),
                data_access_options: json!({
                    "legacyRedirects": true,
                    "returnErrorValuesAsNull": true
                }),
                default_power_bi_data_source_version: "powerBI_V3",
                tables,
                relationships,
                annotations: vec![
                    Annotation {
                        name: "PBI_QueryOrder".to_string(),
                        value: format!("[{}]", query_order.join(",")),
                    },
                    Annotation {
                        name: "PhantomScenario".to_string(),
                        value: plan.scenario.as_str().to_string(),
                    },
                ],
            },
        }
    }

    fn model_table(&self, table: &PbiTable, measures: &[DaxMeasure]) -> ModelTable {
        ModelTable {
            name: table.name.clone(),
            description: table.description.clone(),
            lineage_tag: self.ids.next_id(),
            columns: table.columns.iter().map(|c| self.model_column(c)).collect(),
            partitions: vec![ModelPartition {
                name: format!("{}-partition", table.name),
                mode: "import",
                source: PartitionSource {
                    source_type: "m",
                    expression: csv_placeholder_source(table),
                },
            }],
            measures: measures
                .iter()
                .map(|m| ModelMeasure {
                    name: m.name.clone(),
                    expression: Expression::of(&m.expression),
                    format_string: m.format_string.clone(),
                    display_folder: m.display_folder.clone(),
                    description: m.description.clone(),
                    lineage_tag: self.ids.next_id(),
                })
                .collect(),
        }
    }

    fn model_column(&self, column: &PbiColumn) -> ModelColumn {
        ModelColumn {
            name: column.name.clone(),
            data_type: column.data_type.as_str(),
            source_column: column.source_column.clone(),
            format_string: column_format(column),
            is_hidden: column.is_hidden,
            lineage_tag: self.ids.next_id(),
            summarize_by: column.summarize_by.as_str(),
        }
    }

    fn model_relationship(&self, rel: &PbiRelationship) -> ModelRelationship {
        ModelRelationship {
            name: self.ids.next_id(),
            is_active: (!rel.is_active).then_some(false),
            cross_filtering_behavior: rel.cross_filtering_behavior.as_str(),
            from_cardinality: rel.from_cardinality.as_str(),
            to_cardinality: rel.to_cardinality.as_str(),
            from_table: rel.from_table.clone(),
            from_column: rel.from_column.clone(),
            to_table: rel.to_table.clone(),
            to_column: rel.to_column.clone(),
        }
    }

    fn report_layout(&self, plan: &ExportPlan<'_>) -> Result<Value, ExportError> {
        let projections = plan.projections();
        let mut containers = Vec::with_capacity(plan.visuals.len());

        for (index, (item, visual)) in plan.visuals().enumerate() {
            let order = index * 1000;
            let position = json!({
                "x": visual.position.x,
                "y": visual.position.y,
                "z": order,
                "width": visual.position.width,
                "height": visual.position.height,
                "tabOrder": order
            });
            let fields = if item.kind.family() == VisualFamily::Table {
                Vec::new()
            } else {
                projections.projections(item)
            };
            let config = json!({
                "name": object_name(&self.ids.next_id()),
                "layouts": [{ "id": 0, "position": position }],
                "singleVisual": {
                    "visualType": visual.visual_type,
                    "projections": role_projections(&fields),
                    "prototypeQuery": prototype_query(&fields),
                    "vcObjects": {
                        "title": [{
                            "properties": {
                                "show": { "expr": { "Literal": { "Value": "true" } } },
                                "text": { "expr": { "Literal": { "Value": format!("'{}'", visual.title.replace('\'', "''")) } } }
                            }
                        }]
                    }
                },
                "phantom": {
                    "originalType": visual.original_type,
                    "props": visual.phantom_props
                }
            });

            containers.push(json!({
                "x": visual.position.x,
                "y": visual.position.y,
                "z": order,
                "width": visual.position.width,
                "height": visual.position.height,
                "tabOrder": order,
                "config": serde_json::to_string(&config)?,
                "filters": "[]"
            }));
        }

        Ok(json!({
            "id": 0,
            "theme": "CY24SU10",
            "sections": [{
                "id": 0,
                "name": object_name(&self.ids.next_id()),
                "displayName": format!("{} Dashboard", plan.scenario),
                "filters": "[]",
                "ordinal": 0,
                "visualContainers": containers,
                "config": "{}",
                "displayOption": 1,
                "width": plan.page_width,
                "height": plan.page_height
            }],
            "config": "{\"version\":\"5.59\"}",
            "layoutOptimization": 0
        }))
    }
}

/// `{"Category": [{"queryRef": ...}], ...}`
fn role_projections(projections: &[Projection]) -> Value {
    let mut roles = serde_json::Map::new();
    for projection in projections {
        let entry = roles
            .entry(projection.role)
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(list) = entry {
            list.push(json!({ "queryRef": projection.field.query_ref() }));
        }
    }
    Value::Object(roles)
}

/// Semantic query selecting every projected field, one source alias per table
fn prototype_query(projections: &[Projection]) -> Value {
    let mut aliases: HashMap<&str, String> = HashMap::new();
    let mut from = Vec::new();
    let mut select = Vec::new();

    for projection in projections {
        let entity = projection.field.entity();
        let alias = match aliases.get(entity) {
            Some(alias) => alias.clone(),
            None => {
                let alias = format!("t{}", aliases.len());
                aliases.insert(entity, alias.clone());
                from.push(json!({ "Name": alias, "Entity": entity, "Type": 0 }));
                alias
            }
        };
        let kind = match projection.field {
            FieldRef::Measure { .. } => "Measure",
            FieldRef::Column { .. } => "Column",
        };
        select.push(json!({
            kind: {
                "Expression": { "SourceRef": { "Source": alias } },
                "Property": projection.field.property()
            },
            "Name": projection.field.query_ref()
        }));
    }

    json!({ "Version": 2, "From": from, "Select": select })
}

fn settings() -> Value {
    json!({
        "Version": 4,
        "ReportSettings": {},
        "QueriesSettings": {
            "TypeDetectionEnabled": true,
            "RelationshipImportEnabled": true,
            "Version": "2.x"
        }
    })
}
