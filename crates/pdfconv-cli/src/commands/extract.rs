//! Extract command - print the text of a PDF.

use std::path::PathBuf;

use clap::Args;

use pdfconv_core::AbortSignal;

use super::{check_cancelled, configure_engine, extract_text, load_config, read_pdf, spinner, EngineArg};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// PDF engine (default: from configuration)
    #[arg(short, long, value_enum)]
    engine: Option<EngineArg>,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    configure_engine(args.engine, &config)?;

    let input = read_pdf(&args.input)?;

    let pb = spinner();
    let text = extract_text(&input, &pb, AbortSignal::new()).await;
    pb.finish_and_clear();

    check_cancelled(&text)?;
    println!("{}", text?);
    Ok(())
}
