//! CLI command implementations

pub mod export;
pub mod inspect;

use crate::cli::error::CliError;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Read and parse a JSON input file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    if !path.exists() {
        return Err(CliError::FileNotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| CliError::FileReadError(path.to_path_buf(), e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| CliError::ParseError(path.to_path_buf(), e.to_string()))
}

/// Check if a file exists and return an error unless overwriting is forced
pub fn check_file_overwrite(output_path: &Path, force: bool) -> Result<(), CliError> {
    if output_path.exists() && !force {
        return Err(CliError::InvalidArgument(format!(
            "Output file exists: {}. Use --force to overwrite.",
            output_path.display()
        )));
    }
    Ok(())
}

/// Write text output to a file, creating parent directories
pub fn write_output(output_path: &PathBuf, content: &str) -> Result<(), CliError> {
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            CliError::FileWriteError(
                output_path.clone(),
                format!("Failed to create directory: {}", e),
            )
        })?;
    }

    std::fs::write(output_path, content)
        .map_err(|e| CliError::FileWriteError(output_path.clone(), e.to_string()))
}
