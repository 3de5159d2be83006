//! The `docmerge convert` command: one file through the orchestrator.

use clap::Args;
use docmerge_core::{tracing_sink, Config, DocumentKind, Orchestrator};
use std::path::PathBuf;

use super::open_cache;

/// Arguments for the `convert` command.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// File to convert (pptx, pdf, docx or html)
    pub file: PathBuf,

    /// Target kind (defaults to `output.kind`)
    #[arg(long)]
    pub kind: Option<DocumentKind>,

    /// Where to write the result (defaults to `general.work_dir`)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Skip text recognition for embedded images
    #[arg(long)]
    pub no_ocr: bool,

    /// Cache file to use instead of `general.cache_file`
    #[arg(long, env = "DOCMERGE_CACHE")]
    pub cache: Option<PathBuf>,
}

/// Execute the convert command.
pub async fn execute(args: ConvertArgs, mut config: Config) -> anyhow::Result<()> {
    if args.no_ocr {
        config.ocr.enabled = false;
    }
    if let Some(cache) = &args.cache {
        config.general.cache_file = cache.clone();
    }
    let kind = match args.kind {
        Some(kind) => kind,
        None => config.output_kind()?,
    };

    let status = tracing_sink();
    let cache = open_cache(&config.cache_file(), status.clone())?;
    let mut orchestrator = Orchestrator::from_config(&config, cache, status);

    let output_dir = args
        .output_dir
        .unwrap_or_else(|| orchestrator.work_dir().to_path_buf());
    let outcome = orchestrator
        .convert_into(&args.file, &output_dir, kind)
        .await?;

    if outcome.from_cache() {
        tracing::info!("Reused cached conversion of {:?}", outcome.input);
    }
    println!("{}", outcome.output.display());
    Ok(())
}
