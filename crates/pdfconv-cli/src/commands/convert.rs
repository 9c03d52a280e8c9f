//! Convert command - extract a PDF and save it in the chosen format.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::debug;

use pdfconv_core::{ExportBlob, ExportFormat, ExportOptions, Session};

use super::{check_cancelled, configure_engine, extract_text, load_config, read_pdf, spinner, EngineArg};

/// Arguments for the convert command.
#[derive(Args)]
pub struct ConvertArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file or directory (default: current directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (default: from configuration)
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,

    /// Append today's date to the output filename
    #[arg(long)]
    date_stamp: bool,

    /// Wrap Markdown output in a code fence
    #[arg(long)]
    code_fence: bool,

    /// PDF engine (default: from configuration)
    #[arg(short, long, value_enum)]
    engine: Option<EngineArg>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum FormatArg {
    /// Plain text (.txt)
    Text,
    /// Markdown (.md)
    Markdown,
    /// Plain text labelled as Word document (.doc)
    Doc,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => ExportFormat::Text,
            FormatArg::Markdown => ExportFormat::Markdown,
            FormatArg::Doc => ExportFormat::Doc,
        }
    }
}

pub async fn run(args: ConvertArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    configure_engine(args.engine, &config)?;

    if args.date_stamp {
        config.export.date_stamp = true;
    }
    if args.code_fence {
        config.export.markdown_code_fence = true;
    }
    let format = args
        .format
        .map(ExportFormat::from)
        .unwrap_or_else(|| config.export.format());

    let input = read_pdf(&args.input)?;

    let mut session = Session::new();
    let signal = session.begin_extraction()?;

    let pb = spinner();
    let outcome = extract_text(&input, &pb, signal).await;
    pb.finish_and_clear();

    check_cancelled(&outcome)?;
    session.finish_extraction(outcome);
    if let Some(message) = session.error() {
        anyhow::bail!("{}", message);
    }

    let today = chrono::Local::now().date_naive();
    let options = ExportOptions::from_config(&config.export, today);

    let Some(blob) = session.export(format, &options) else {
        anyhow::bail!("No text could be extracted from the PDF");
    };

    let output_path = resolve_output(args.output.as_deref(), &blob);
    save(&blob, &output_path)?;

    println!(
        "{} Saved {} ({}, {} bytes) to {}",
        style("✓").green(),
        input.name,
        blob.media_type,
        blob.bytes.len(),
        output_path.display()
    );

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Target path: a directory receives the export's own filename.
fn resolve_output(output: Option<&Path>, blob: &ExportBlob) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => path.join(&blob.filename),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(&blob.filename),
    }
}

fn save(blob: &ExportBlob, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, &blob.bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob() -> ExportBlob {
        pdfconv_core::export("Hello", ExportFormat::Markdown, &ExportOptions::default())
    }

    #[test]
    fn test_resolve_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = resolve_output(Some(dir.path()), &blob());
        assert_eq!(path, dir.path().join("converted-file.md"));
    }

    #[test]
    fn test_resolve_output_file() {
        let path = resolve_output(Some(Path::new("out/notes.markdown")), &blob());
        assert_eq!(path, PathBuf::from("out/notes.markdown"));
    }

    #[test]
    fn test_resolve_output_default() {
        assert_eq!(resolve_output(None, &blob()), PathBuf::from("converted-file.md"));
    }

    #[test]
    fn test_save_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.md");
        save(&blob(), &path).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"Hello");
    }
}
