//! Docmerge CLI - convert office documents to HTML and merge them per directory.
//!
//! Each subdirectory of the root becomes one merged HTML document built from
//! its presentations, PDFs and word-processor files. Conversions and image
//! text recognition are cached, so re-running only processes what changed.
//!
//! # Usage
//!
//! ```bash
//! # Convert and merge every course directory under ./courses
//! docmerge run ./courses
//!
//! # Convert a single file
//! docmerge convert slides.pptx --output-dir ./out
//!
//! # Inspect the cache
//! docmerge cache stats
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Docmerge - convert office documents to HTML and merge them per directory.
#[derive(Parser, Debug)]
#[command(name = "docmerge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert every group under a root directory and merge each one
    Run(cli::run::RunArgs),

    /// Convert a single file
    Convert(cli::convert::ConvertArgs),

    /// Merge already converted documents
    Merge(cli::merge::MergeArgs),

    /// Inspect or reset the conversion cache
    Cache(cli::cache::CacheArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let loaded = docmerge_core::Config::load();
    let config = match &loaded {
        Ok(config) => config.clone(),
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Check your config file with `docmerge config path`."
            );
            docmerge_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Docmerge v{}", docmerge_core::VERSION);

    // Only the config command may run on a broken config file.
    let valid = || loaded.context("Invalid configuration");

    match cli.command {
        Commands::Run(args) => cli::run::execute(args, valid()?).await,
        Commands::Convert(args) => cli::convert::execute(args, valid()?).await,
        Commands::Merge(args) => cli::merge::execute(args, valid()?).await,
        Commands::Cache(args) => cli::cache::execute(args, valid()?).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
