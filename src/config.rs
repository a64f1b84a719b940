//! Export configuration file support
//!
//! Handles parsing of `.phantom-export.toml` configuration files and
//! environment variable overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration filename
pub const CONFIG_FILENAME: &str = ".phantom-export.toml";

/// Environment variable for the project name
pub const ENV_PROJECT_NAME: &str = "PHANTOM_EXPORT_PROJECT_NAME";

/// Environment variable for the report canvas width in pixels
pub const ENV_CANVAS_WIDTH: &str = "PHANTOM_EXPORT_CANVAS_WIDTH";

/// Environment variable for the report canvas height in pixels
pub const ENV_CANVAS_HEIGHT: &str = "PHANTOM_EXPORT_CANVAS_HEIGHT";

/// Error loading or saving the export configuration
#[derive(Debug, thiserror::Error, Serialize, Deserialize)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Config error: {0}")]
    ParseError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Project section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSection {
    /// Name of the exported project; prefixes folders and the filename
    #[serde(default = "default_project_name")]
    pub name: String,

    /// Model culture
    #[serde(default = "default_culture")]
    pub culture: String,
}

fn default_project_name() -> String {
    "Phantom".to_string()
}

fn default_culture() -> String {
    "en-US".to_string()
}

impl Default for ProjectSection {
    fn default() -> Self {
        Self {
            name: default_project_name(),
            culture: default_culture(),
        }
    }
}

/// Grid and report canvas geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasOptions {
    /// Dashboard grid columns
    #[serde(default = "default_columns")]
    pub columns: u32,

    /// Dashboard grid rows mapped onto the page height
    #[serde(default = "default_rows")]
    pub rows: u32,

    /// Report page width in pixels
    #[serde(default = "default_width")]
    pub width: f64,

    /// Report page height in pixels
    #[serde(default = "default_height")]
    pub height: f64,

    #[serde(default = "default_min_width")]
    pub min_width: f64,

    #[serde(default = "default_min_height")]
    pub min_height: f64,
}

fn default_columns() -> u32 {
    12
}

fn default_rows() -> u32 {
    24
}

fn default_width() -> f64 {
    1280.0
}

fn default_height() -> f64 {
    720.0
}

fn default_min_width() -> f64 {
    50.0
}

fn default_min_height() -> f64 {
    30.0
}

impl Default for CanvasOptions {
    fn default() -> Self {
        Self {
            columns: default_columns(),
            rows: default_rows(),
            width: default_width(),
            height: default_height(),
            min_width: default_min_width(),
            min_height: default_min_height(),
        }
    }
}

/// Parameters of the scenario KPI measures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureOptions {
    /// Score at or above which an entity counts as controversial
    #[serde(default = "default_controversy_threshold")]
    pub controversy_threshold: f64,

    /// Shipment statuses that get their own count measure
    #[serde(default = "default_logistics_statuses")]
    pub logistics_statuses: Vec<String>,
}

fn default_controversy_threshold() -> f64 {
    70.0
}

fn default_logistics_statuses() -> Vec<String> {
    ["Delivered", "In Transit", "Delayed", "Pending"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for MeasureOptions {
    fn default() -> Self {
        Self {
            controversy_threshold: default_controversy_threshold(),
            logistics_statuses: default_logistics_statuses(),
        }
    }
}

/// Archive compression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveCompression {
    #[default]
    Deflated,
    Stored,
}

/// Archive section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ArchiveSection {
    #[serde(default)]
    pub compression: ArchiveCompression,

    /// Deflate level (1-9); the library default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression_level: Option<i32>,
}

/// Main configuration structure
///
/// Represents the `.phantom-export.toml` configuration file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ExportConfig {
    #[serde(default)]
    pub project: ProjectSection,

    #[serde(default)]
    pub canvas: CanvasOptions,

    #[serde(default)]
    pub measures: MeasureOptions,

    #[serde(default)]
    pub archive: ArchiveSection,
}

impl ExportConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration with another project name
    pub fn with_project_name(name: impl Into<String>) -> Self {
        Self {
            project: ProjectSection {
                name: name.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Load configuration from a directory
    ///
    /// Looks for `.phantom-export.toml` in the directory and falls back to
    /// defaults if not found. Environment overrides are applied last.
    pub fn load(dir: &Path) -> ConfigResult<Self> {
        let config_path = dir.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(format!("Failed to read config: {}", e)))?;

            Self::parse(&content)?
        } else {
            Self::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> ConfigResult<Self> {
        toml::from_str(content)
            .map_err(|e| ConfigError::ParseError(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to a directory
    pub fn save(&self, dir: &Path) -> ConfigResult<()> {
        let config_path = dir.join(CONFIG_FILENAME);
        let content = self.to_toml()?;

        std::fs::write(&config_path, content)
            .map_err(|e| ConfigError::IoError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Convert configuration to TOML string
    pub fn to_toml(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| {
            ConfigError::SerializationError(format!("Failed to serialize config: {}", e))
        })
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(name) = std::env::var(ENV_PROJECT_NAME)
            && !name.trim().is_empty()
        {
            self.project.name = name.trim().to_string();
        }

        if let Ok(width) = std::env::var(ENV_CANVAS_WIDTH)
            && let Ok(width) = width.parse::<f64>()
            && width > 0.0
        {
            self.canvas.width = width;
        }

        if let Ok(height) = std::env::var(ENV_CANVAS_HEIGHT)
            && let Ok(height) = height.parse::<f64>()
            && height > 0.0
        {
            self.canvas.height = height;
        }
    }

    /// Check if a configuration file exists in a directory
    pub fn exists(dir: &Path) -> bool {
        dir.join(CONFIG_FILENAME).exists()
    }
}

/// Generate a sample configuration file content
pub fn sample_config() -> &'static str {
    r#"# Phantom export configuration

[project]
# Prefix of the project folders and of the suggested filename
name = "Phantom"
culture = "en-US"

[canvas]
# Dashboard grid
columns = 12
rows = 24
# Report page size in pixels
width = 1280.0
height = 720.0
min_width = 50.0
min_height = 30.0

[measures]
# Controversy score counted by the "Above Threshold" measure
controversy_threshold = 70.0
logistics_statuses = ["Delivered", "In Transit", "Delayed", "Pending"]

[archive]
# "deflated" (default) or "stored"
compression = "deflated"
# compression_level = 6
"#
}
