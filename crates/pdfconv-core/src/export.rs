//! Rendering a transcript into a downloadable file.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::config::ExportConfig;

/// Filename stem used when none is configured.
pub const DEFAULT_FILENAME_PREFIX: &str = "converted-file";

/// Output format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Plain text.
    #[default]
    Text,
    /// Markdown.
    Markdown,
    /// Plain text labelled as a Word document.
    Doc,
}

impl ExportFormat {
    /// Resolve a format tag. Unknown tags fall back to plain text.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "markdown" => ExportFormat::Markdown,
            "doc" => ExportFormat::Doc,
            _ => ExportFormat::Text,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            ExportFormat::Text => "text",
            ExportFormat::Markdown => "markdown",
            ExportFormat::Doc => "doc",
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            ExportFormat::Text => "text/plain",
            ExportFormat::Markdown => "text/markdown",
            ExportFormat::Doc => "application/msword",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Markdown => "md",
            ExportFormat::Doc => "doc",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Options controlling filename and markdown rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Filename stem.
    pub filename_prefix: String,
    /// Date appended to the filename stem.
    pub date_stamp: Option<NaiveDate>,
    /// Wrap markdown exports in a code fence.
    pub markdown_code_fence: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            filename_prefix: DEFAULT_FILENAME_PREFIX.to_string(),
            date_stamp: None,
            markdown_code_fence: false,
        }
    }
}

impl ExportOptions {
    /// Build options from configuration, stamping with `today` when enabled.
    pub fn from_config(config: &ExportConfig, today: NaiveDate) -> Self {
        let prefix = config.filename_prefix.trim();
        Self {
            filename_prefix: if prefix.is_empty() {
                DEFAULT_FILENAME_PREFIX.to_string()
            } else {
                prefix.to_string()
            },
            date_stamp: config.date_stamp.then_some(today),
            markdown_code_fence: config.markdown_code_fence,
        }
    }

    /// Filename for an export in `format`.
    pub fn filename(&self, format: ExportFormat) -> String {
        match self.date_stamp {
            Some(date) => format!(
                "{}_{}.{}",
                self.filename_prefix,
                date.format("%Y-%m-%d"),
                format.extension()
            ),
            None => format!("{}.{}", self.filename_prefix, format.extension()),
        }
    }
}

/// A rendered export, ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBlob {
    pub bytes: Vec<u8>,
    pub media_type: &'static str,
    pub filename: String,
}

/// Render `content` in `format`.
///
/// Callers are expected not to export an empty transcript.
pub fn export(content: &str, format: ExportFormat, options: &ExportOptions) -> ExportBlob {
    let body = match format {
        ExportFormat::Markdown if options.markdown_code_fence => {
            format!("```\n{}\n```", content)
        }
        _ => content.to_string(),
    };

    ExportBlob {
        bytes: body.into_bytes(),
        media_type: format.media_type(),
        filename: options.filename(format),
    }
}
