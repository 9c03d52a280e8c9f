//! Configuration structures for the conversion pipeline.

use serde::{Deserialize, Serialize};

use crate::export::{ExportFormat, DEFAULT_FILENAME_PREFIX};
use crate::pdf::EngineKind;

/// Main configuration for pdfconv.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Text extraction configuration.
    pub extraction: ExtractionConfig,

    /// Export configuration.
    pub export: ExportConfig,
}

/// Text extraction configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// PDF engine used to read page text.
    pub engine: EngineKind,
}

/// Export configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Format tag used when none is given ("text", "markdown" or "doc").
    pub default_format: String,

    /// Filename stem of exported files.
    pub filename_prefix: String,

    /// Append the current date to exported filenames.
    pub date_stamp: bool,

    /// Wrap markdown exports in a code fence.
    pub markdown_code_fence: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_format: ExportFormat::Text.tag().to_string(),
            filename_prefix: DEFAULT_FILENAME_PREFIX.to_string(),
            date_stamp: false,
            markdown_code_fence: false,
        }
    }
}

impl ExportConfig {
    /// Resolved default format. Unknown tags resolve to plain text.
    pub fn format(&self) -> ExportFormat {
        ExportFormat::from_tag(&self.default_format)
    }
}

impl ConverterConfig {
    /// Parse configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
