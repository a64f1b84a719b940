//! Archive assembly
//!
//! [`ArchiveBuilder`] collects package entries in insertion order and
//! serializes them into a ZIP byte stream. Entries carry a fixed
//! modification time so identical inputs give identical archives.

use super::ExportError;
use crate::config::{ArchiveCompression, ArchiveSection};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

#[cfg(feature = "native-fs")]
use super::ExportPackage;
#[cfg(feature = "native-fs")]
use async_trait::async_trait;
#[cfg(feature = "native-fs")]
use std::path::PathBuf;
#[cfg(feature = "native-fs")]
use tracing::info;

/// Content of one archive entry
#[derive(Debug, Clone, PartialEq)]
pub enum ArchiveContent {
    /// UTF-8 text
    Text(String),
    /// JSON document, written pretty-printed
    Json(Value),
    /// Raw bytes
    Bytes(Vec<u8>),
}

impl ArchiveContent {
    fn to_bytes(&self) -> Result<Cow<'_, [u8]>, ExportError> {
        match self {
            ArchiveContent::Text(text) => Ok(Cow::Borrowed(text.as_bytes())),
            ArchiveContent::Json(value) => Ok(Cow::Owned(serde_json::to_vec_pretty(value)?)),
            ArchiveContent::Bytes(bytes) => Ok(Cow::Borrowed(bytes)),
        }
    }
}

/// Ordered `path → content` map serialized as a ZIP archive
#[derive(Debug, Clone, Default)]
pub struct ArchiveBuilder {
    entries: Vec<(String, ArchiveContent)>,
    index: HashMap<String, usize>,
    options: ArchiveSection,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ArchiveSection) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Add or replace an entry. A replaced entry keeps its original position.
    pub fn insert(&mut self, path: &str, content: ArchiveContent) {
        let path = normalize_path(path);
        match self.index.get(&path) {
            Some(&position) => self.entries[position].1 = content,
            None => {
                self.index.insert(path.clone(), self.entries.len());
                self.entries.push((path, content));
            }
        }
    }

    pub fn add_text(&mut self, path: &str, text: impl Into<String>) {
        self.insert(path, ArchiveContent::Text(text.into()));
    }

    pub fn add_bytes(&mut self, path: &str, bytes: Vec<u8>) {
        self.insert(path, ArchiveContent::Bytes(bytes));
    }

    pub fn add_json(&mut self, path: &str, value: Value) {
        self.insert(path, ArchiveContent::Json(value));
    }

    /// Add any serializable value as a JSON entry
    pub fn add_serialized<T: Serialize>(&mut self, path: &str, value: &T) -> Result<(), ExportError> {
        self.add_json(path, serde_json::to_value(value)?);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(&normalize_path(path))
    }

    pub fn get(&self, path: &str) -> Option<&ArchiveContent> {
        self.index
            .get(&normalize_path(path))
            .map(|&position| &self.entries[position].1)
    }

    /// Entry paths in archive order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(path, _)| path.as_str())
    }

    /// A level only applies to Deflate
    fn compression(&self) -> (CompressionMethod, Option<i32>) {
        match self.options.compression {
            ArchiveCompression::Deflated => (CompressionMethod::Deflated, self.options.compression_level),
            ArchiveCompression::Stored => (CompressionMethod::Stored, None),
        }
    }

    fn file_options(&self) -> FileOptions {
        let (method, level) = self.compression();
        FileOptions::default()
            .compression_method(method)
            .compression_level(level)
            .last_modified_time(zip::DateTime::default())
            .unix_permissions(0o644)
    }

    /// Serialize every entry into a ZIP archive
    ///
    /// Fails as a whole; no partial archive is returned.
    pub fn finish(&self) -> Result<Vec<u8>, ExportError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = self.file_options();

        for (path, content) in &self.entries {
            if path.is_empty() {
                return Err(ExportError::ArchiveError(
                    "Archive entry with an empty path".to_string(),
                ));
            }
            writer.start_file(path.as_str(), options)?;
            writer.write_all(&content.to_bytes()?)?;
        }

        let cursor = writer.finish()?;
        Ok(cursor.into_inner())
    }

    /// [`finish`](Self::finish) on a blocking task
    #[cfg(feature = "native-fs")]
    pub async fn finish_async(self) -> Result<Vec<u8>, ExportError> {
        tokio::task::spawn_blocking(move || self.finish())
            .await
            .map_err(|e| ExportError::ArchiveError(format!("Compression task failed: {}", e)))?
    }
}

fn normalize_path(path: &str) -> String {
    path.trim().replace('\\', "/").trim_start_matches('/').to_string()
}

static UNSAFE_FILENAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\\/:*?"<>|\s]+"#).expect("Invalid regex"));

/// Name usable as a file or folder name; `Phantom` when nothing is left
pub fn safe_name(name: &str) -> String {
    let name = UNSAFE_FILENAME_CHARS.replace_all(name.trim(), "_");
    if name.is_empty() {
        "Phantom".to_string()
    } else {
        name.into_owned()
    }
}

/// `<ProjectName>_<YYYY-MM-DD>.<ext>`, with characters that are unsafe in
/// file names replaced by `_`
///
/// # Example
///
/// ```rust
/// use chrono::NaiveDate;
/// use phantom_pbi_export::export::suggested_filename;
///
/// let date = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap();
/// assert_eq!(suggested_filename("Phantom Retail", date, "pbit"), "Phantom_Retail_2024-05-17.pbit");
/// ```
pub fn suggested_filename(project: &str, date: NaiveDate, extension: &str) -> String {
    format!(
        "{}_{}.{}",
        safe_name(project),
        date.format("%Y-%m-%d"),
        extension.trim_start_matches('.')
    )
}

/// Destination of finished packages
#[cfg(feature = "native-fs")]
#[async_trait]
pub trait PackageSink: Send + Sync {
    /// Store the package, returning where the archive was written
    async fn save(&self, package: &ExportPackage) -> Result<PathBuf, ExportError>;
}

/// Writes the archive and its Markdown guide into a directory
#[cfg(feature = "native-fs")]
#[derive(Debug, Clone)]
pub struct FileSystemSink {
    dir: PathBuf,
    write_documentation: bool,
}

#[cfg(feature = "native-fs")]
impl FileSystemSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_documentation: true,
        }
    }

    pub fn without_documentation(mut self) -> Self {
        self.write_documentation = false;
        self
    }
}

#[cfg(feature = "native-fs")]
#[async_trait]
impl PackageSink for FileSystemSink {
    async fn save(&self, package: &ExportPackage) -> Result<PathBuf, ExportError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let archive_path = self.dir.join(&package.filename);
        tokio::fs::write(&archive_path, &package.archive).await?;

        if self.write_documentation {
            let guide_path = archive_path.with_extension("md");
            tokio::fs::write(&guide_path, package.documentation.as_bytes()).await?;
        }

        info!(
            "Saved {} ({} bytes) to {}",
            package.filename,
            package.archive.len(),
            self.dir.display()
        );
        Ok(archive_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Read;
    use zip::ZipArchive;

    fn read_entries(bytes: &[u8]) -> Vec<(String, String)> {
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
    fn test_entries_keep_insertion_order() {
        let mut builder = ArchiveBuilder::new();
        builder.add_text("b.txt", "b");
        builder.add_json("nested/dir/a.json", json!({"a": 1}));
        builder.add_bytes("\\c.bin", b"c".to_vec());

        let entries = read_entries(&builder.finish().unwrap());
        let names: Vec<&str> = entries.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["b.txt", "nested/dir/a.json", "c.bin"]);
        assert_eq!(entries[1].1, "{\n  \"a\": 1\n}");
    }

    #[test]
    fn test_replacing_keeps_position() {
        let mut builder = ArchiveBuilder::new();
        builder.add_text("first", "1");
        builder.add_text("second", "2");
        builder.add_text("first", "one");

        assert_eq!(builder.len(), 2);
        assert_eq!(builder.paths().collect::<Vec<_>>(), vec!["first", "second"]);
        assert_eq!(
            builder.get("first"),
            Some(&ArchiveContent::Text("one".to_string()))
        );
    }

    #[test]
    fn test_identical_entries_give_identical_bytes() {
        let build = || {
            let mut builder = ArchiveBuilder::new();
            builder.add_text("a.txt", "same content");
            builder.add_json("b.json", json!({"k": [1, 2, 3]}));
            builder.finish().unwrap()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_stored_compression() {
        let mut builder = ArchiveBuilder::with_options(ArchiveSection {
            compression: ArchiveCompression::Stored,
            compression_level: Some(9),
        });
        builder.add_text("a.txt", "stored");
        let bytes = builder.finish().unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(
            archive.by_index(0).unwrap().compression(),
            CompressionMethod::Stored
        );
        assert_eq!(builder.compression(), (CompressionMethod::Stored, None));
    }

    #[test]
    fn test_empty_path_fails() {
        let mut builder = ArchiveBuilder::new();
        builder.add_text("/", "x");
        assert!(matches!(
            builder.finish(),
            Err(ExportError::ArchiveError(_))
        ));
    }

    #[test]
    fn test_suggested_filename() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        assert_eq!(suggested_filename("Sales/Board", date, ".zip"), "Sales_Board_2025-01-02.zip");
        assert_eq!(suggested_filename("  ", date, "pbit"), "Phantom_2025-01-02.pbit");
    }

    #[cfg(feature = "native-fs")]
    #[tokio::test]
    async fn test_finish_async_matches_finish() {
        let mut builder = ArchiveBuilder::new();
        builder.add_text("a.txt", "async");
        let expected = builder.finish().unwrap();
        assert_eq!(builder.finish_async().await.unwrap(), expected);
    }

    #[cfg(feature = "native-fs")]
    #[tokio::test]
    async fn test_file_system_sink() {
        let dir = tempfile::tempdir().unwrap();
        let package = ExportPackage {
            archive: vec![1, 2, 3],
            documentation: "# Guide".to_string(),
            filename: "Phantom_2024-01-01.zip".to_string(),
        };

        let path = FileSystemSink::new(dir.path()).save(&package).await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3]);
        let guide = std::fs::read_to_string(dir.path().join("Phantom_2024-01-01.md")).unwrap();
        assert_eq!(guide, "# Guide");
    }
}
