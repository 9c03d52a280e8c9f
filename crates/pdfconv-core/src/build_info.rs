//! Build-time display strings.

use serde::Serialize;

/// Author and build date shown by front ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    pub author: &'static str,
    pub build_date: &'static str,
    pub version: &'static str,
}

impl BuildInfo {
    /// Values baked in from `PDFCONV_AUTHOR` and `PDFCONV_BUILD_DATE` at compile time.
    pub fn current() -> Self {
        Self {
            author: option_env!("PDFCONV_AUTHOR").unwrap_or("pdfconv contributors"),
            build_date: option_env!("PDFCONV_BUILD_DATE").unwrap_or("unknown"),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}
