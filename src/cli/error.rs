//! CLI-specific error types

use crate::config::ConfigError;
use crate::export::ExportError;
use std::path::PathBuf;
use thiserror::Error;

/// CLI-specific error type
#[derive(Error, Debug)]
pub enum CliError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read file {0}: {1}")]
    FileReadError(PathBuf, String),

    #[error("Failed to write file {0}: {1}")]
    FileWriteError(PathBuf, String),

    #[error("Failed to parse {0}: {1}")]
    ParseError(PathBuf, String),

    #[error("Config error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Export error: {0}")]
    ExportError(#[from] ExportError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    IoError(String),
}
