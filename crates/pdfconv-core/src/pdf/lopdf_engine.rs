//! PDF page text extraction using lopdf.

use std::collections::BTreeMap;
use std::sync::Arc;

use lopdf::{Document, ObjectId};
use tracing::{debug, trace};

use super::{fragments_from_text, PdfDocument, PdfEngine, PdfPage, Result, TextFragment};
use crate::error::PdfError;

/// PDF engine backed by lopdf.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfEngine;

impl LopdfEngine {
    /// Create a new lopdf engine.
    pub fn new() -> Self {
        Self
    }
}

/// A document opened by [`LopdfEngine`].
pub struct LopdfDocument {
    document: Arc<Document>,
    pages: BTreeMap<u32, ObjectId>,
}

/// A page of a [`LopdfDocument`].
pub struct LopdfPage {
    document: Arc<Document>,
    number: u32,
}

impl PdfEngine for LopdfEngine {
    type Document = LopdfDocument;

    async fn open(&self, data: &[u8]) -> Result<LopdfDocument> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");
        }

        let pages = doc.get_pages();
        debug!("Loaded PDF with {} pages", pages.len());

        Ok(LopdfDocument {
            document: Arc::new(doc),
            pages,
        })
    }
}

impl PdfDocument for LopdfDocument {
    type Page = LopdfPage;

    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    async fn page(&self, number: u32) -> Result<LopdfPage> {
        if !self.pages.contains_key(&number) {
            return Err(PdfError::InvalidPage(number));
        }

        Ok(LopdfPage {
            document: Arc::clone(&self.document),
            number,
        })
    }
}

impl PdfPage for LopdfPage {
    async fn text_fragments(&self) -> Result<Vec<TextFragment>> {
        let text = self
            .document
            .extract_text(&[self.number])
            .map_err(|e| PdfError::TextContent(e.to_string()))?;

        let fragments = fragments_from_text(&text);
        trace!("Page {}: {} text fragments", self.number, fragments.len());
        Ok(fragments)
    }
}
