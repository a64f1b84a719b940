//! Project package (PBIP) writer
//!
//! Produces the folder tree Power BI Desktop opens in developer mode: a
//! TMDL semantic model with the snapshot rows embedded in each partition,
//! and a PBIR report with one `visual.json` per dashboard item.

use super::archive::{ArchiveBuilder, safe_name, suggested_filename};
use super::ids::{Clock, IdGenerator, RandomIdGenerator, SystemClock, object_name};
use super::markdown::{GuideContext, GuideKind, GuideWriter};
use super::plan::ExportPlan;
use super::static_files::{self, GITIGNORE, ProjectLayout};
use super::tmdl::{database_tmdl, model_tmdl, relationships_tmdl, table_tmdl};
use super::visual::visual_json;
use super::{ExportError, ExportPackage};
use crate::config::ExportConfig;
use crate::models::{DashboardItem, DataSnapshot, DaxMeasure, Scenario};
use std::sync::Arc;
use tracing::{debug, info};

/// Writes PBIP project packages
pub struct ProjectExporter {
    config: ExportConfig,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

/// Archive entries of a project before compression
struct Assembled {
    archive: ArchiveBuilder,
    entries: usize,
    documentation: String,
    filename: String,
}

impl ProjectExporter {
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

    /// Build the project package, embedding the snapshot rows
    ///
    /// # Example
    ///
    /// ```rust
    /// use phantom_pbi_export::config::ExportConfig;
    /// use phantom_pbi_export::export::{FixedClock, ProjectExporter, SequentialIdGenerator};
    /// use phantom_pbi_export::models::{DashboardItem, DataSnapshot, GridLayout, Scenario};
    /// use serde_json::json;
    /// use std::sync::Arc;
    ///
    /// let items = vec![DashboardItem::new(
    ///     "c1",
    ///     "card",
    ///     "Headcount",
    ///     GridLayout::new(0, 0, 3, 2),
    ///     json!({"metric": "salary", "operation": "avg"}),
    /// )];
    /// let package = ProjectExporter::new(ExportConfig::default())
    ///     .with_ids(Arc::new(SequentialIdGenerator::new(1)))
    ///     .with_clock(Arc::new(FixedClock::on_date(2024, 6, 1)))
    ///     .build(&items, Scenario::HR, &DataSnapshot::default())
    ///     .unwrap();
    /// assert_eq!(package.filename, "Phantom_HR_2024-06-01.zip");
    /// ```
    pub fn build(
        &self,
        items: &[DashboardItem],
        scenario: Scenario,
        snapshot: &DataSnapshot,
    ) -> Result<ExportPackage, ExportError> {
        let assembled = self.assemble(items, scenario, snapshot)?;
        let archive = assembled.archive.finish()?;
        Ok(self.package(archive, assembled))
    }

    /// [`build`](Self::build) with compression on a blocking task
    #[cfg(feature = "native-fs")]
    pub async fn build_async(
        &self,
        items: &[DashboardItem],
        scenario: Scenario,
        snapshot: &DataSnapshot,
    ) -> Result<ExportPackage, ExportError> {
        let mut assembled = self.assemble(items, scenario, snapshot)?;
        let builder = std::mem::take(&mut assembled.archive);
        let archive = builder.finish_async().await?;
        Ok(self.package(archive, assembled))
    }

    fn package(&self, archive: Vec<u8>, assembled: Assembled) -> ExportPackage {
        info!(
            "Built project {} ({} entries, {} bytes)",
            assembled.filename,
            assembled.entries,
            archive.len()
        );
        ExportPackage {
            archive,
            documentation: assembled.documentation,
            filename: assembled.filename,
        }
    }

    fn assemble(
        &self,
        items: &[DashboardItem],
        scenario: Scenario,
        snapshot: &DataSnapshot,
    ) -> Result<Assembled, ExportError> {
        let plan = ExportPlan::prepare(&self.config, items, scenario);
        let now = self.clock.now();
        let layout = ProjectLayout::new(safe_name(&self.config.project.name));
        let display_name = self.config.project.name.trim();

        let mut archive = ArchiveBuilder::with_options(self.config.archive);
        archive.add_json(&layout.pbip_file(), static_files::pbip(&layout));
        archive.add_text(".gitignore", GITIGNORE);

        self.add_report(&mut archive, &layout, display_name, &plan);
        let row_counts = self.add_semantic_model(&mut archive, &layout, display_name, &plan, snapshot)?;

        let documentation = GuideWriter::new().render(
            GuideKind::Project,
            &GuideContext {
                project: &layout.project,
                scenario,
                schema: plan.schema,
                fact_table: plan.fact_table,
                measures: &plan.measures,
                row_counts: &row_counts,
                issues: &plan.issues,
                exported_at: now.to_rfc3339(),
            },
        );
        let filename = suggested_filename(
            &format!("{}_{}", self.config.project.name, scenario),
            now.date_naive(),
            "zip",
        );

        Ok(Assembled {
            entries: archive.len(),
            archive,
            documentation,
            filename,
        })
    }

    fn add_report(
        &self,
        archive: &mut ArchiveBuilder,
        layout: &ProjectLayout,
        display_name: &str,
        plan: &ExportPlan<'_>,
    ) {
        let report = layout.report_dir();
        archive.add_json(
            &format!("{}/.platform", report),
            static_files::platform("Report", display_name, &self.ids.next_id()),
        );
        archive.add_json(
            &format!("{}/definition.pbir", report),
            static_files::definition_pbir(layout),
        );
        archive.add_json(
            &format!("{}/definition/version.json", report),
            static_files::version_json(),
        );
        archive.add_json(
            &format!("{}/definition/report.json", report),
            static_files::report_json(),
        );

        let page = object_name(&self.ids.next_id());
        archive.add_json(
            &format!("{}/definition/pages/pages.json", report),
            static_files::pages_json(&page),
        );
        archive.add_json(
            &format!("{}/page.json", layout.page_dir(&page)),
            static_files::page_json(
                &page,
                &format!("{} Dashboard", plan.scenario),
                plan.page_width,
                plan.page_height,
            ),
        );

        let projections = plan.projections();
        for (index, (item, config)) in plan.visuals().enumerate() {
            let name = object_name(&self.ids.next_id());
            let visual = visual_json(&name, item, config, index, &projections);
            archive.add_json(&layout.visual_file(&page, &name), visual);
        }
        debug!("Wrote {} visuals to page {}", plan.visuals.len(), page);

        archive.add_json(&layout.theme_file(), static_files::theme_json());
    }

    /// Adds the model documents; returns embedded rows per sourced table
    fn add_semantic_model(
        &self,
        archive: &mut ArchiveBuilder,
        layout: &ProjectLayout,
        display_name: &str,
        plan: &ExportPlan<'_>,
        snapshot: &DataSnapshot,
    ) -> Result<Vec<(String, usize)>, ExportError> {
        let model = layout.model_dir();
        archive.add_json(
            &format!("{}/.platform", model),
            static_files::platform("SemanticModel", display_name, &self.ids.next_id()),
        );
        archive.add_json(
            &format!("{}/definition.pbism", model),
            static_files::definition_pbism(),
        );
        archive.add_text(&format!("{}/definition/database.tmdl", model), database_tmdl());
        archive.add_text(
            &format!("{}/definition/model.tmdl", model),
            model_tmdl(plan.schema, &self.config.project.culture),
        );
        if let Some(relationships) = relationships_tmdl(plan.schema, self.ids.as_ref()) {
            archive.add_text(&format!("{}/definition/relationships.tmdl", model), relationships);
        }

        let mut row_counts = Vec::new();
        for table in &plan.schema.tables {
            let measures: &[DaxMeasure] = if table.name == plan.fact_table {
                &plan.measures
            } else {
                &[]
            };
            let doc = table_tmdl(table, measures, snapshot, self.ids.as_ref())?;
            if table.source.is_some() {
                row_counts.push((table.name.clone(), doc.rows));
            }
            debug!("Table {}: {} rows embedded", table.name, doc.rows);
            archive.add_text(&layout.table_file(&table.name), doc.content);
        }
        Ok(row_counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ids::{FixedClock, SequentialIdGenerator};
    use crate::models::GridLayout;
    use serde_json::json;
    use std::io::{Cursor, Read};
    use zip::ZipArchive;

    fn exporter() -> ProjectExporter {
        ProjectExporter::new(ExportConfig::default())
            .with_ids(Arc::new(SequentialIdGenerator::new(3)))
            .with_clock(Arc::new(FixedClock::on_date(2024, 6, 1)))
    }

    fn entries(bytes: &[u8]) -> Vec<(String, String)> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..archive.len())
            .map(|i| {
                let mut file = archive.by_index(i).unwrap();
                let mut content = String::new();
                file.read_to_string(&mut content).unwrap();
                (file.name().to_string(), content)
            })
            .collect()
    }

    #[test]
    fn test_project_tree() {
        let items = vec![
            DashboardItem::new(
                "k1",
                "card",
                "Headcount",
                GridLayout::new(0, 0, 3, 2),
                json!({"metric": "employeeId", "operation": "count"}),
            ),
            DashboardItem::new(
                "b1",
                "bar",
                "Salary by Department",
                GridLayout::new(3, 0, 9, 6),
                json!({"dimension": "Department", "metric": "salary", "operation": "avg"}),
            ),
        ];
        let package = exporter()
            .build(&items, Scenario::HR, &DataSnapshot::default())
            .unwrap();
        let entries = entries(&package.archive);
        let names: Vec<&str> = entries.iter().map(|(n, _)| n.as_str()).collect();

        assert_eq!(names[0], "Phantom.pbip");
        assert_eq!(names[1], ".gitignore");
        assert!(names.contains(&"Phantom.Report/definition.pbir"));
        assert!(names.contains(&"Phantom.SemanticModel/definition/tables/Employees.tmdl"));
        assert!(!names.iter().any(|n| n.ends_with("relationships.tmdl")));
        assert_eq!(names.iter().filter(|n| n.ends_with("/visual.json")).count(), 2);

        let (_, employees) = entries
            .iter()
            .find(|(n, _)| n.ends_with("Employees.tmdl"))
            .unwrap();
        assert!(employees.contains("measure 'Count Employee ID' = COUNTROWS(Employees)"));
        assert!(employees.contains("measure Headcount = "));

        assert!(package.documentation.contains("| Employees | 0 |"));
        assert_eq!(package.filename, "Phantom_HR_2024-06-01.zip");
    }

    #[test]
    fn test_measures_only_on_fact_table() {
        let items = vec![DashboardItem::new(
            "c1",
            "card",
            "Revenue",
            GridLayout::new(0, 0, 3, 2),
            json!({"metric": "revenue"}),
        )];
        let package = exporter()
            .build(&items, Scenario::Retail, &DataSnapshot::default())
            .unwrap();
        for (name, content) in entries(&package.archive) {
            if name.ends_with("/Sales.tmdl") {
                assert!(content.contains("measure 'Total Revenue'"));
            } else if name.ends_with(".tmdl") {
                assert!(!content.contains("\tmeasure "), "{} has measures", name);
            }
        }
    }
}
