//! The `docmerge cache` command for inspecting and resetting the cache.

use clap::{Args, Subcommand};
use docmerge_core::{tracing_sink, CacheError, CacheStore, Config};
use std::path::PathBuf;

use super::open_cache;

/// Arguments for the `cache` command.
#[derive(Args, Debug)]
pub struct CacheArgs {
    /// Cache file to use instead of `general.cache_file`
    #[arg(long, global = true, env = "DOCMERGE_CACHE")]
    pub cache: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CacheCommand,
}

/// Subcommands for cache management.
#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// Show how many conversions and images are cached
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Forget converted files so the next run converts everything again
    Clear {
        /// Also forget recognized image text
        #[arg(long)]
        images: bool,
    },
}

/// Execute the cache command.
pub async fn execute(args: CacheArgs, config: Config) -> anyhow::Result<()> {
    let path = args.cache.unwrap_or_else(|| config.cache_file());

    match args.command {
        CacheCommand::Stats { json } => {
            let cache = open_cache(&path, tracing_sink())?;
            if json {
                let stats = serde_json::json!({
                    "path": path,
                    "paths": cache.path_entries(),
                    "digests": cache.content_entries(),
                    "images": cache.image_entries(),
                });
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Cache file:  {}", path.display());
                println!("Paths:       {}", cache.path_entries());
                println!("Digests:     {}", cache.content_entries());
                println!("Images:      {}", cache.image_entries());
            }
        }

        CacheCommand::Clear { images } => {
            // A corrupt file can't be loaded; clearing it means starting over.
            let mut cache = match CacheStore::open(&path, tracing_sink()) {
                Ok(cache) => cache,
                Err(e @ CacheError::Corrupt { .. }) => {
                    tracing::warn!("{e}, discarding it");
                    std::fs::remove_file(&path)?;
                    CacheStore::open(&path, tracing_sink())?
                }
                Err(e) => return Err(e.into()),
            };
            cache.clear_files();
            if images {
                cache.clear_images();
            }
            cache.persist()?;

            tracing::info!("Cache cleared at: {}", path.display());
            println!("Cache cleared: {}", path.display());
        }
    }

    Ok(())
}
