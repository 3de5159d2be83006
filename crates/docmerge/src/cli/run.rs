//! The `docmerge run` command: convert and merge every group under a root.

use clap::Args;
use docmerge_core::{BatchReport, BatchRunner, CacheStore, Config, Orchestrator, StatusSink};
use std::path::PathBuf;
use std::sync::Arc;

use super::open_cache;
use super::progress::ProgressStatus;
use super::review::DialoguerReviewer;

/// Arguments for the `run` command.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Directory whose subdirectories are merged (defaults to `discovery.root`)
    pub root: Option<PathBuf>,

    /// Target kind for converted files (html, pdf, docx)
    #[arg(long)]
    pub output_kind: Option<String>,

    /// Skip text recognition for embedded images
    #[arg(long)]
    pub no_ocr: bool,

    /// Ask before recognizing each new image
    #[arg(long)]
    pub interactive: bool,

    /// Also write `<group> (Imageless).html` without embedded images
    #[arg(long)]
    pub imageless: bool,

    /// Treat the root itself as one group instead of one per subdirectory
    #[arg(long)]
    pub single_group: bool,

    /// Delete the work directory once the run is done
    #[arg(long)]
    pub discard_work_files: bool,

    /// Cache file to use instead of `general.cache_file`
    #[arg(long, env = "DOCMERGE_CACHE")]
    pub cache: Option<PathBuf>,
}

impl RunArgs {
    /// Fold command-line overrides into the loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(root) = &self.root {
            config.discovery.root = root.clone();
        }
        if let Some(kind) = &self.output_kind {
            config.output.kind = kind.clone();
        }
        if self.no_ocr {
            config.ocr.enabled = false;
        }
        if self.interactive {
            config.ocr.interactive = true;
        }
        if self.imageless {
            config.output.imageless_variant = true;
        }
        if self.single_group {
            config.discovery.per_subdirectory = false;
        }
        if self.discard_work_files {
            config.general.keep_work_files = false;
        }
        if let Some(cache) = &self.cache {
            config.general.cache_file = cache.clone();
        }
    }
}

/// Execute the run command.
pub async fn execute(args: RunArgs, mut config: Config) -> anyhow::Result<()> {
    args.apply(&mut config);
    config.validate()?;

    let root = config.root();
    if !root.is_dir() {
        anyhow::bail!("Root directory not found: {}", root.display());
    }

    let progress = Arc::new(ProgressStatus::new());
    let status: Arc<dyn StatusSink> = progress.clone();

    let cache = open_cache(&config.cache_file(), status.clone())?;
    let mut orchestrator = Orchestrator::from_config(&config, cache, status.clone());
    if config.ocr.enabled && config.ocr.interactive {
        let previews = config
            .image_output_dir()
            .unwrap_or_else(|| std::env::temp_dir().join("docmerge-review"));
        orchestrator.set_reviewer(Box::new(
            DialoguerReviewer::new(previews).with_progress(progress.bar().clone()),
        ));
    }

    tracing::info!("Processing {:?}", root);
    let start = std::time::Instant::now();
    let mut runner = BatchRunner::from_config(&config, orchestrator, status)?;
    let report = runner.run().await;
    progress.finish();
    let report = report?;

    print_summary(&report, runner.orchestrator().cache(), start.elapsed());
    for merged in &report.merged_documents {
        println!("{}", merged.display());
    }

    Ok(())
}

/// Print a formatted summary table after a batch run.
fn print_summary(report: &BatchReport, cache: &CacheStore, elapsed: std::time::Duration) {
    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Converted:    {:>8}", report.converted);
    eprintln!("    From cache:   {:>8}", report.cached);
    if report.unsupported > 0 {
        eprintln!("    Unsupported:  {:>8}", report.unsupported);
    }
    if report.failed > 0 {
        eprintln!("    Failed:       {:>8}", report.failed);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", report.total());
    eprintln!("    Merged:       {:>8}", report.groups_merged);
    eprintln!("    Cached images:{:>8}", cache.image_entries());
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
    eprintln!("  ====================================");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_applied() {
        let args = RunArgs {
            root: Some(PathBuf::from("/courses")),
            output_kind: Some("pdf".to_string()),
            no_ocr: true,
            single_group: true,
            discard_work_files: true,
            cache: Some(PathBuf::from("/tmp/c.json")),
            ..RunArgs::default()
        };
        let mut config = Config::default();
        args.apply(&mut config);

        assert_eq!(config.discovery.root, PathBuf::from("/courses"));
        assert_eq!(config.output.kind, "pdf");
        assert!(!config.ocr.enabled);
        assert!(!config.discovery.per_subdirectory);
        assert!(!config.general.keep_work_files);
        assert_eq!(config.cache_file(), PathBuf::from("/tmp/c.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_no_flags_keep_config() {
        let mut config = Config::default();
        RunArgs::default().apply(&mut config);
        assert!(config.ocr.enabled);
        assert!(config.discovery.per_subdirectory);
        assert!(config.general.keep_work_files);
        assert_eq!(config.output.kind, "html");
    }
}
