//! Export and inspection command tests

use chrono::NaiveDate;
use phantom_pbi_export::cli::commands::export::{ExportArgs, PackageKind, handle_export};
use phantom_pbi_export::cli::commands::inspect::{
    MeasuresArgs, handle_config_init, handle_measures, handle_schema,
};
use phantom_pbi_export::cli::error::CliError;
use phantom_pbi_export::config::ExportConfig;
use phantom_pbi_export::models::Scenario;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const ITEMS: &str = r#"[
  {"id": "rev", "type": "card", "title": "Revenue", "layout": {"x": 0, "y": 0, "w": 3, "h": 2},
   "props": {"metric": "revenue", "operation": "sum"}},
  {"id": "reg", "type": "bar", "title": "By Region", "layout": {"x": 3, "y": 0, "w": 9, "h": 6},
   "props": {"dimension": "Region", "metric": "profit"}}
]"#;

fn write_items(dir: &Path) -> PathBuf {
    let path = dir.join("items.json");
    fs::write(&path, ITEMS).unwrap();
    path
}

fn export_args(dir: &Path, kind: PackageKind) -> ExportArgs {
    ExportArgs {
        kind,
        items: write_items(dir),
        scenario: Scenario::Retail,
        snapshot: None,
        output_dir: dir.join("out"),
        config_dir: Some(dir.to_path_buf()),
        project_name: None,
        seed: Some(42),
        date: NaiveDate::from_ymd_opt(2024, 5, 20),
        no_docs: false,
        force: false,
    }
}

#[test]
fn test_export_template() {
    let temp = TempDir::new().unwrap();
    let args = export_args(temp.path(), PackageKind::Template);

    let path = handle_export(&args).unwrap();

    assert_eq!(path, temp.path().join("out/Phantom_Retail_2024-05-20.pbit"));
    assert!(path.exists());
    assert!(temp.path().join("out/Phantom_Retail_2024-05-20.md").exists());
}

#[test]
fn test_export_project_with_snapshot_and_name() {
    let temp = TempDir::new().unwrap();
    let snapshot = temp.path().join("snapshot.json");
    fs::write(
        &snapshot,
        r#"{"stores": [{"storeId": "S1", "storeName": "Main", "region": "North", "country": "UK", "city": "York"}]}"#,
    )
    .unwrap();

    let mut args = export_args(temp.path(), PackageKind::Project);
    args.snapshot = Some(snapshot);
    args.project_name = Some("Weekly Review".to_string());
    args.no_docs = true;

    let path = handle_export(&args).unwrap();

    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        "Weekly_Review_Retail_2024-05-20.zip"
    );
    assert!(!path.with_extension("md").exists());
}

#[test]
fn test_export_is_reproducible_with_seed() {
    let temp = TempDir::new().unwrap();
    let mut args = export_args(temp.path(), PackageKind::Project);
    let first = fs::read(handle_export(&args).unwrap()).unwrap();

    args.force = true;
    let second = fs::read(handle_export(&args).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_export_refuses_overwrite() {
    let temp = TempDir::new().unwrap();
    let args = export_args(temp.path(), PackageKind::Template);
    handle_export(&args).unwrap();

    let result = handle_export(&args);
    assert!(matches!(result, Err(CliError::InvalidArgument(_))));
}

#[test]
fn test_export_missing_items() {
    let temp = TempDir::new().unwrap();
    let mut args = export_args(temp.path(), PackageKind::Template);
    args.items = temp.path().join("missing.json");

    let result = handle_export(&args);
    assert!(matches!(result, Err(CliError::FileNotFound(_))));
}

#[test]
fn test_export_uses_config_file() {
    let temp = TempDir::new().unwrap();
    ExportConfig::with_project_name("Configured").save(temp.path()).unwrap();

    let args = export_args(temp.path(), PackageKind::Template);
    let path = handle_export(&args).unwrap();
    assert!(path.ends_with("Configured_Retail_2024-05-20.pbit"));
}

#[test]
fn test_measures_to_file() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("measures.json");
    let args = MeasuresArgs {
        items: write_items(temp.path()),
        scenario: Scenario::Retail,
        output: Some(output.clone()),
        config_dir: None,
        force: false,
    };

    handle_measures(&args).unwrap();

    let measures: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    let names: Vec<&str> = measures
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Total Revenue", "Total Profit"]);
}

#[test]
fn test_schema_to_file() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("schema/hr.json");

    handle_schema(Scenario::HR, Some(&output), false).unwrap();

    let schema: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(schema["tables"][0]["name"], "Employees");
}

#[test]
fn test_config_init() {
    let temp = TempDir::new().unwrap();

    let path = handle_config_init(temp.path(), false).unwrap();
    let config = ExportConfig::load(temp.path()).unwrap();
    assert!(path.exists());
    assert_eq!(config.canvas.columns, 12);

    assert!(handle_config_init(temp.path(), false).is_err());
    assert!(handle_config_init(temp.path(), true).is_ok());
}
