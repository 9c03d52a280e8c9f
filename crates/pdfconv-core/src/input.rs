//! Input boundary: one PDF file at a time.

use crate::error::InputError;

/// Media type accepted at the input boundary.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Whether a file looks like a PDF, by media type or `.pdf` extension.
pub fn is_pdf(name: &str, media_type: Option<&str>) -> bool {
    let by_type = media_type
        .map(|m| m.trim().eq_ignore_ascii_case(PDF_MEDIA_TYPE))
        .unwrap_or(false);
    let by_extension = std::path::Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);

    by_type || by_extension
}

/// Take the only item of a selection.
pub fn pick_single<T>(items: Vec<T>) -> Result<T, InputError> {
    let count = items.len();
    let mut iter = items.into_iter();
    match (iter.next(), count) {
        (None, _) => Err(InputError::NoFile),
        (Some(item), 1) => Ok(item),
        (Some(_), n) => Err(InputError::MultipleFiles(n)),
    }
}

/// An accepted PDF file.
#[derive(Debug, Clone)]
pub struct PdfInput {
    pub name: String,
    pub data: Vec<u8>,
}

impl PdfInput {
    /// Accept a file if it is a PDF.
    pub fn new(
        name: impl Into<String>,
        media_type: Option<&str>,
        data: Vec<u8>,
    ) -> Result<Self, InputError> {
        let name = name.into();
        if !is_pdf(&name, media_type) {
            return Err(InputError::UnsupportedType(
                media_type.filter(|m| !m.is_empty()).unwrap_or(&name).to_string(),
            ));
        }
        Ok(Self { name, data })
    }
}
