//! CLI commands.

pub mod config;
pub mod convert;
pub mod extract;

use std::fs;
use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use pdfconv_core::pdf::{self, LopdfEngine, PdfExtractEngine};
use pdfconv_core::{
    AbortSignal, ConvertError, ConverterConfig, EngineKind, Extractor, PdfEngine, PdfInput,
};

/// PDF engine selectable on the command line.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum EngineArg {
    /// lopdf content-stream extraction
    Lopdf,
    /// pdf-extract layout extraction
    PdfExtract,
}

impl From<EngineArg> for EngineKind {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::Lopdf => EngineKind::Lopdf,
            EngineArg::PdfExtract => EngineKind::PdfExtract,
        }
    }
}

/// Load configuration from `--config`, the default location, or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<ConverterConfig> {
    if let Some(path) = config_path {
        return Ok(ConverterConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Using config file {}", default_path.display());
        Ok(ConverterConfig::from_file(&default_path)?)
    } else {
        Ok(ConverterConfig::default())
    }
}

/// Read a PDF file from disk, rejecting anything that is not a PDF.
pub fn read_pdf(path: &Path) -> anyhow::Result<PdfInput> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    let data = fs::read(path)?;

    info!("Processing file: {}", path.display());
    Ok(PdfInput::new(name, None, data)?)
}

pub fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb
}

/// Set the process-wide engine from the command line or configuration.
pub fn configure_engine(arg: Option<EngineArg>, config: &ConverterConfig) -> anyhow::Result<()> {
    let engine = arg.map(EngineKind::from).unwrap_or(config.extraction.engine);
    pdf::configure_engine(engine)?;
    Ok(())
}

/// Extract the transcript of `input` with the configured engine, reporting
/// pages on `pb`.
///
/// Ctrl-C trips `signal`, stopping the extraction after the page being read.
pub async fn extract_text(
    input: &PdfInput,
    pb: &ProgressBar,
    signal: AbortSignal,
) -> pdfconv_core::Result<String> {
    let engine = pdf::configured_engine();
    let trip = signal.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trip.abort();
        }
    });

    pb.set_message(format!("Loading {} with {}...", input.name, engine));
    let result = match engine {
        EngineKind::Lopdf => run_extractor(LopdfEngine::new(), input, signal, pb).await,
        EngineKind::PdfExtract => run_extractor(PdfExtractEngine::new(), input, signal, pb).await,
    };
    watcher.abort();
    result
}

/// Turn a cancelled extraction into a user-facing error.
pub fn check_cancelled<T>(outcome: &pdfconv_core::Result<T>) -> anyhow::Result<()> {
    if let Err(ConvertError::Cancelled) = outcome {
        anyhow::bail!("Conversion cancelled");
    }
    Ok(())
}

async fn run_extractor<E: PdfEngine>(
    engine: E,
    input: &PdfInput,
    signal: AbortSignal,
    pb: &ProgressBar,
) -> pdfconv_core::Result<String> {
    let progress = pb.clone();
    Extractor::new(engine)
        .with_signal(signal)
        .on_page(move |p| {
            progress.set_message(format!("Reading page {}/{}", p.page, p.total));
            progress.tick();
        })
        .extract(&input.data)
        .await
}
