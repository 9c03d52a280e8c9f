//! Error types for the pdfconv-core library.

use thiserror::Error;

/// Main error type for the pdfconv library.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Text extraction failed.
    #[error("Failed to convert PDF: {0}")]
    Extraction(#[from] ExtractionError),

    /// Extraction was aborted before it completed.
    #[error("conversion cancelled")]
    Cancelled,

    /// Another extraction is still in flight.
    #[error("a conversion is already in progress")]
    Busy,

    /// The supplied file was rejected at the input boundary.
    #[error("invalid input: {0}")]
    Input(#[from] InputError),

    /// The process-wide PDF engine was already configured.
    #[error("PDF engine already configured")]
    AlreadyConfigured,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors reported by a PDF engine.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF bytes.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The PDF is encrypted and cannot be opened without a password.
    #[error("PDF is encrypted")]
    Encrypted,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),

    /// The text content of a page could not be decoded.
    #[error("failed to extract text: {0}")]
    TextContent(String),
}

/// Failure of one extraction run. Always carries the engine error that caused it.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The bytes could not be opened as a PDF document.
    #[error("failed to open PDF: {0}")]
    Open(#[source] PdfError),

    /// A page object could not be fetched.
    #[error("failed to read page {page}: {source}")]
    Page {
        page: u32,
        #[source]
        source: PdfError,
    },

    /// The text content of a page could not be read.
    #[error("failed to read text of page {page}: {source}")]
    TextContent {
        page: u32,
        #[source]
        source: PdfError,
    },
}

/// Errors raised when accepting a file at the input boundary.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum InputError {
    /// No file was supplied.
    #[error("no file selected")]
    NoFile,

    /// More than one file was supplied.
    #[error("expected a single file, got {0}")]
    MultipleFiles(usize),

    /// The file is not a PDF.
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),
}

/// Result type for the pdfconv library.
pub type Result<T> = std::result::Result<T, ConvertError>;
