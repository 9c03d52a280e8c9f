//! PDF engine capability interface.
//!
//! The extractor only needs four things from a PDF engine: open a document,
//! read its page count, fetch a page by number and list that page's text
//! fragments. Concrete engines live behind these traits so they can be
//! swapped or mocked.

mod lopdf_engine;
mod pdf_extract_engine;

pub use lopdf_engine::{LopdfDocument, LopdfEngine, LopdfPage};
pub use pdf_extract_engine::{PdfExtractDocument, PdfExtractEngine, PdfExtractPage};

use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, PdfError};

/// Result type for PDF engine operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// A single run of text as reported by an engine, in the engine's reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextFragment {
    pub text: String,
}

impl TextFragment {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Opens raw bytes as a PDF document.
#[allow(async_fn_in_trait)]
pub trait PdfEngine {
    /// Document type produced by this engine.
    type Document: PdfDocument;

    /// Open a PDF from bytes.
    async fn open(&self, data: &[u8]) -> Result<Self::Document>;
}

/// An opened PDF document.
#[allow(async_fn_in_trait)]
pub trait PdfDocument {
    /// Page type produced by this document.
    type Page: PdfPage;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Fetch a page (1-indexed).
    async fn page(&self, number: u32) -> Result<Self::Page>;
}

/// A single page of an opened document.
#[allow(async_fn_in_trait)]
pub trait PdfPage {
    /// Text fragments of this page in engine order.
    async fn text_fragments(&self) -> Result<Vec<TextFragment>>;
}

/// Available engine implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineKind {
    /// `lopdf` content-stream text extraction.
    #[default]
    Lopdf,
    /// `pdf-extract` layout-aware text extraction.
    PdfExtract,
}

impl EngineKind {
    /// Configuration name of the engine.
    pub fn name(&self) -> &'static str {
        match self {
            EngineKind::Lopdf => "lopdf",
            EngineKind::PdfExtract => "pdf-extract",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

static ENGINE: OnceLock<EngineKind> = OnceLock::new();

/// Set the process-wide engine. Only the first call succeeds.
pub fn configure_engine(kind: EngineKind) -> std::result::Result<(), ConvertError> {
    ENGINE
        .set(kind)
        .map_err(|_| ConvertError::AlreadyConfigured)?;
    tracing::debug!("PDF engine configured: {}", kind);
    Ok(())
}

/// The process-wide engine, or the default when none was configured.
pub fn configured_engine() -> EngineKind {
    ENGINE.get().copied().unwrap_or_default()
}

/// Split engine text output into fragments: one per non-blank line.
pub(crate) fn fragments_from_text(text: &str) -> Vec<TextFragment> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(TextFragment::new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fragments_from_text() {
        let fragments = fragments_from_text("  Hello \n\n\tWorld\r\n   \n");
        assert_eq!(
            fragments,
            vec![TextFragment::new("Hello"), TextFragment::new("World")]
        );
    }

    #[test]
    fn test_fragments_from_blank_text() {
        assert!(fragments_from_text(" \n \n").is_empty());
    }

    #[test]
    fn test_engine_kind_serde() {
        let json = serde_json::to_string(&EngineKind::PdfExtract).unwrap();
        assert_eq!(json, "\"pdf-extract\"");
        let kind: EngineKind = serde_json::from_str("\"lopdf\"").unwrap();
        assert_eq!(kind, EngineKind::Lopdf);
    }

    #[test]
    fn test_configure_engine_once() {
        // No other unit test in this crate configures the engine.
        assert!(configure_engine(EngineKind::Lopdf).is_ok());
        assert!(matches!(
            configure_engine(EngineKind::PdfExtract),
            Err(ConvertError::AlreadyConfigured)
        ));
        assert_eq!(configured_engine(), EngineKind::Lopdf);
    }
}
