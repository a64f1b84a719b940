//! Measure and schema inspection commands

use super::{check_file_overwrite, read_json, write_output};
use crate::cli::error::CliError;
use crate::config::{CONFIG_FILENAME, ExportConfig, sample_config};
use crate::dax::MeasureGenerator;
use crate::models::{DashboardItem, Scenario};
use crate::schema::{get_fact_table, get_schema};
use crate::validation::{SchemaValidator, validate_bindings};
use std::path::{Path, PathBuf};

/// Arguments of the measures command
#[derive(Debug, Clone)]
pub struct MeasuresArgs {
    pub items: PathBuf,
    pub scenario: Scenario,
    /// Write JSON here instead of stdout
    pub output: Option<PathBuf>,
    pub config_dir: Option<PathBuf>,
    pub force: bool,
}

fn emit(output: Option<&PathBuf>, force: bool, content: &str) -> Result<(), CliError> {
    match output {
        Some(path) => {
            check_file_overwrite(path, force)?;
            write_output(path, content)?;
            println!("✅ Wrote {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

/// Generate the measures of a dashboard as JSON
pub fn handle_measures(args: &MeasuresArgs) -> Result<(), CliError> {
    let config = match &args.config_dir {
        Some(dir) => ExportConfig::load(dir)?,
        None => ExportConfig::default(),
    };
    let items: Vec<DashboardItem> = read_json(&args.items)?;

    for issue in validate_bindings(&items, args.scenario, config.canvas.columns) {
        eprintln!("⚠️  {}", issue);
    }

    let measures = MeasureGenerator::new(config.measures).generate(&items, args.scenario);
    let json = serde_json::to_string_pretty(&measures)
        .map_err(|e| CliError::InvalidArgument(format!("Failed to serialize measures: {}", e)))?;
    emit(args.output.as_ref(), args.force, &json)
}

/// Print the star schema of a scenario with its validation findings
pub fn handle_schema(scenario: Scenario, output: Option<&PathBuf>, force: bool) -> Result<(), CliError> {
    let schema = get_schema(scenario);
    let result = SchemaValidator::new().validate(schema, get_fact_table(scenario));
    for issue in &result.issues {
        eprintln!("⚠️  {}", issue);
    }

    let json = serde_json::to_string_pretty(schema)
        .map_err(|e| CliError::InvalidArgument(format!("Failed to serialize schema: {}", e)))?;
    emit(output, force, &json)
}

/// Write a commented sample `.phantom-export.toml` into a directory
pub fn handle_config_init(dir: &Path, force: bool) -> Result<PathBuf, CliError> {
    let path = dir.join(CONFIG_FILENAME);
    check_file_overwrite(&path, force)?;
    write_output(&path, sample_config())?;
    println!("✅ Wrote {}", path.display());
    Ok(path)
}
