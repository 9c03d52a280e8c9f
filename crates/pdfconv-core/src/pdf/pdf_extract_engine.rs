//! PDF page text extraction using pdf-extract.
//!
//! pdf-extract panics on some malformed documents (a page without a
//! MediaBox, for one), so the call is run behind [`panic::catch_unwind`].

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::debug;

use super::{fragments_from_text, PdfDocument, PdfEngine, PdfPage, Result, TextFragment};
use crate::error::PdfError;

/// PDF engine backed by pdf-extract.
///
/// pdf-extract lays out a whole document in one pass, so all page texts are
/// produced when the document is opened and pages only hand them out.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractEngine;

impl PdfExtractEngine {
    /// Create a new pdf-extract engine.
    pub fn new() -> Self {
        Self
    }
}

/// A document opened by [`PdfExtractEngine`].
pub struct PdfExtractDocument {
    pages: Arc<Vec<String>>,
}

/// A page of a [`PdfExtractDocument`].
pub struct PdfExtractPage {
    pages: Arc<Vec<String>>,
    index: usize,
}

impl PdfEngine for PdfExtractEngine {
    type Document = PdfExtractDocument;

    async fn open(&self, data: &[u8]) -> Result<PdfExtractDocument> {
        let pages = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(data)
        }))
        .map_err(|_| PdfError::Parse("pdf-extract panicked (malformed document)".to_string()))?
        .map_err(|e| PdfError::Parse(e.to_string()))?;

        debug!("pdf-extract laid out {} pages", pages.len());
        Ok(PdfExtractDocument {
            pages: Arc::new(pages),
        })
    }
}

impl PdfDocument for PdfExtractDocument {
    type Page = PdfExtractPage;

    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    async fn page(&self, number: u32) -> Result<PdfExtractPage> {
        if number == 0 || number > self.page_count() {
            return Err(PdfError::InvalidPage(number));
        }

        Ok(PdfExtractPage {
            pages: Arc::clone(&self.pages),
            index: (number - 1) as usize,
        })
    }
}

impl PdfPage for PdfExtractPage {
    async fn text_fragments(&self) -> Result<Vec<TextFragment>> {
        let text = self
            .pages
            .get(self.index)
            .ok_or(PdfError::InvalidPage(self.index as u32 + 1))?;
        Ok(fragments_from_text(text))
    }
}
