//! The `docmerge merge` command: concatenate converted documents.

use clap::Args;
use docmerge_core::{tracing_sink, Config, Merger};
use std::path::PathBuf;

/// Arguments for the `merge` command.
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Merged document to write (replaced if it exists)
    pub destination: PathBuf,

    /// Documents to concatenate, in order
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Also write `<stem> (Imageless).<ext>` without embedded images
    #[arg(long)]
    pub imageless: bool,
}

/// Execute the merge command.
pub async fn execute(args: MergeArgs, config: Config) -> anyhow::Result<()> {
    let imageless = args.imageless || config.output.imageless_variant;
    let report = Merger::new(tracing_sink())
        .with_imageless(imageless)
        .merge(&args.files, &args.destination)?;

    tracing::info!(
        "Merged {} file(s), {} bytes",
        report.files_merged,
        report.bytes_written
    );
    println!("{}", report.destination.display());
    if let Some(path) = report.imageless {
        println!("{}", path.display());
    }
    Ok(())
}
