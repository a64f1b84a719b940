//! Export command handlers

use super::{check_file_overwrite, read_json};
use crate::cli::error::CliError;
use crate::config::ExportConfig;
use crate::export::{
    Clock, ExportPackage, FileSystemSink, FixedClock, IdGenerator, PackageSink, ProjectExporter,
    RandomIdGenerator, SequentialIdGenerator, SystemClock, TemplateExporter,
};
use crate::models::{DashboardItem, DataSnapshot, Scenario};
use chrono::NaiveDate;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Package shape to export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageKind {
    Template,
    Project,
}

/// Arguments for export operations
#[derive(Debug, Clone)]
pub struct ExportArgs {
    pub kind: PackageKind,
    /// JSON array of dashboard items
    pub items: PathBuf,
    pub scenario: Scenario,
    /// JSON data snapshot; project packages only
    pub snapshot: Option<PathBuf>,
    /// Directory receiving the archive and its guide
    pub output_dir: PathBuf,
    /// Directory holding `.phantom-export.toml`; defaults to the working directory
    pub config_dir: Option<PathBuf>,
    /// Project name overriding the configuration
    pub project_name: Option<String>,
    /// Seed for deterministic identifiers
    pub seed: Option<u64>,
    /// Export date for a reproducible file name and timestamp
    pub date: Option<NaiveDate>,
    pub no_docs: bool,
    pub force: bool,
}

/// Load the export configuration for the arguments
pub fn load_config(args: &ExportArgs) -> Result<ExportConfig, CliError> {
    let dir = match &args.config_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().map_err(|e| CliError::IoError(e.to_string()))?,
    };
    let mut config = ExportConfig::load(&dir)?;
    if let Some(name) = &args.project_name {
        config.project.name = name.clone();
    }
    Ok(config)
}

fn id_source(seed: Option<u64>) -> Arc<dyn IdGenerator> {
    match seed {
        Some(seed) => Arc::new(SequentialIdGenerator::new(seed)),
        None => Arc::new(RandomIdGenerator),
    }
}

fn clock(date: Option<NaiveDate>) -> Arc<dyn Clock> {
    match date {
        Some(date) => Arc::new(FixedClock(date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc())),
        None => Arc::new(SystemClock),
    }
}

async fn build_package(
    args: &ExportArgs,
    config: ExportConfig,
    items: &[DashboardItem],
) -> Result<ExportPackage, CliError> {
    let ids = id_source(args.seed);
    let clock = clock(args.date);
    let package = match args.kind {
        PackageKind::Template => {
            if args.snapshot.is_some() {
                info!("Templates do not embed data; ignoring the snapshot");
            }
            TemplateExporter::new(config)
                .with_ids(ids)
                .with_clock(clock)
                .build(items, args.scenario)?
        }
        PackageKind::Project => {
            let snapshot: DataSnapshot = match &args.snapshot {
                Some(path) => read_json(path)?,
                None => DataSnapshot::default(),
            };
            ProjectExporter::new(config)
                .with_ids(ids)
                .with_clock(clock)
                .build_async(items, args.scenario, &snapshot)
                .await?
        }
    };
    Ok(package)
}

/// Handle the export command, returning the archive path
pub fn handle_export(args: &ExportArgs) -> Result<PathBuf, CliError> {
    let config = load_config(args)?;
    let items: Vec<DashboardItem> = read_json(&args.items)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::IoError(e.to_string()))?;

    runtime.block_on(async {
        let package = build_package(args, config, &items).await?;
        check_file_overwrite(&args.output_dir.join(&package.filename), args.force)?;

        let mut sink = FileSystemSink::new(&args.output_dir);
        if args.no_docs {
            sink = sink.without_documentation();
        }
        let path = sink.save(&package).await?;
        println!("✅ Exported {} visuals to {}", items.len(), path.display());
        Ok::<PathBuf, CliError>(path)
    })
}
