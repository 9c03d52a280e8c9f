//! Core library for PDF to text conversion.
//!
//! This crate provides:
//! - Page-by-page transcript extraction behind a swappable PDF engine
//! - Export of a transcript as text, Markdown or DOC-labelled files
//! - An in-memory session that holds the editable transcript
//! - Input validation and configuration

pub mod build_info;
pub mod error;
pub mod export;
pub mod extract;
pub mod input;
pub mod models;
pub mod pdf;
pub mod session;

pub use build_info::BuildInfo;
pub use error::{ConvertError, ExtractionError, InputError, PdfError, Result};
pub use export::{export, ExportBlob, ExportFormat, ExportOptions};
pub use extract::{extract_transcript, AbortSignal, Extractor, PageProgress};
pub use input::PdfInput;
pub use models::config::ConverterConfig;
pub use pdf::{EngineKind, PdfDocument, PdfEngine, PdfPage, TextFragment};
pub use session::{Session, SessionState};
