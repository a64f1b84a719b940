//! Export functionality
//!
//! Two package shapes are produced from the same dashboard bindings:
//! - Legacy template (`.pbit`): schema, measures and report layout, no data
//! - Project package (PBIP): TMDL model with embedded rows and PBIR visuals
//!
//! Both writers share [`projection::ProjectionBuilder`] for visual field
//! bindings and [`archive::ArchiveBuilder`] for the ZIP output.

pub mod archive;
pub mod ids;
pub mod markdown;
pub mod mquery;
pub mod plan;
pub mod project;
pub mod projection;
pub mod static_files;
pub mod template;
pub mod tmdl;
pub mod visual;

/// A finished export package
///
/// Contains the archive bytes, its Markdown guide and the suggested file name.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[must_use = "export packages contain the archive and should be saved or returned"]
pub struct ExportPackage {
    /// ZIP archive bytes
    pub archive: Vec<u8>,
    /// Markdown guide for opening the package in Power BI Desktop
    pub documentation: String,
    /// Suggested file name, `<Project>_<Scenario>_<YYYY-MM-DD>.<ext>`
    pub filename: String,
}

impl ExportPackage {
    /// JSON-friendly form with the archive base64 encoded
    pub fn to_transport(&self) -> PackageTransport {
        use base64::Engine;
        PackageTransport {
            archive: base64::engine::general_purpose::STANDARD.encode(&self.archive),
            documentation: self.documentation.clone(),
            filename: self.filename.clone(),
        }
    }
}

/// [`ExportPackage`] as returned across the wasm boundary
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PackageTransport {
    /// Base64 (standard alphabet) archive bytes
    pub archive: String,
    pub documentation: String,
    pub filename: String,
}

/// Error during export
#[derive(Debug, thiserror::Error, serde::Serialize, serde::Deserialize)]
pub enum ExportError {
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Archive error: {0}")]
    ArchiveError(String),
    #[error("Export error: {0}")]
    ExportError(String),
}

impl From<zip::result::ZipError> for ExportError {
    fn from(err: zip::result::ZipError) -> Self {
        ExportError::ArchiveError(err.to_string())
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::SerializationError(err.to_string())
    }
}

// Re-export for convenience
pub use archive::{ArchiveBuilder, ArchiveContent, safe_name, suggested_filename};
#[cfg(feature = "native-fs")]
pub use archive::{FileSystemSink, PackageSink};
pub use ids::{
    Clock, FixedClock, IdGenerator, RandomIdGenerator, SequentialIdGenerator, SystemClock,
};
pub use markdown::{GuideKind, GuideWriter};
pub use plan::ExportPlan;
pub use project::ProjectExporter;
pub use projection::{FieldRef, Projection, ProjectionBuilder};
pub use template::TemplateExporter;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_encodes_archive() {
        let package = ExportPackage {
            archive: b"PK\x03\x04".to_vec(),
            documentation: "# Guide".to_string(),
            filename: "Phantom_2024-01-01.zip".to_string(),
        };
        let transport = package.to_transport();
        assert_eq!(transport.archive, "UEsDBA==");
        assert_eq!(transport.filename, package.filename);
    }

    #[test]
    fn test_error_conversions() {
        let err: ExportError = std::io::Error::other("disk full").into();
        assert!(matches!(err, ExportError::IoError(_)));
        let err: ExportError = serde_json::from_str::<u32>("x").unwrap_err().into();
        assert!(matches!(err, ExportError::SerializationError(_)));
    }
}
