//! DAX measure model

use serde::{Deserialize, Serialize};

/// A generated DAX measure
///
/// Measures are derived on every export from the dashboard bindings; names are
/// unique within one generation run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DaxMeasure {
    /// Measure name
    pub name: String,
    /// DAX expression (may span several lines)
    pub expression: String,
    /// Folder shown in the field list
    pub display_folder: String,
    /// Format string
    pub format_string: String,
    /// Description
    #[serde(default)]
    pub description: String,
}

impl DaxMeasure {
    pub fn new(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
            display_folder: String::new(),
            format_string: String::new(),
            description: String::new(),
        }
    }

    pub fn with_folder(mut self, folder: &str) -> Self {
        self.display_folder = folder.to_string();
        self
    }

    pub fn with_format(mut self, format_string: &str) -> Self {
        self.format_string = format_string.to_string();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Whether the expression needs more than one line
    pub fn is_multiline(&self) -> bool {
        self.expression.contains('\n')
    }
}
