//! Batch runs: discover groups, convert every file, merge per group.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::error::{ConfigError, DocmergeError, PipelineError};
use crate::merge::{imageless_path, Merger};
use crate::status::{StatusEvent, StatusSink};
use crate::types::{BatchReport, DocumentKind};

use super::discovery::{DiscoveredGroup, FileDiscovery};
use super::orchestrator::Orchestrator;

/// Drives an [`Orchestrator`] over every group under a root directory.
pub struct BatchRunner {
    orchestrator: Orchestrator,
    discovery: FileDiscovery,
    root: PathBuf,
    output_kind: DocumentKind,
    imageless: bool,
    keep_work_files: bool,
    status: Arc<dyn StatusSink>,
}

impl BatchRunner {
    pub fn new(
        orchestrator: Orchestrator,
        discovery: FileDiscovery,
        root: impl Into<PathBuf>,
        output_kind: DocumentKind,
        status: Arc<dyn StatusSink>,
    ) -> Self {
        Self {
            orchestrator,
            discovery,
            root: root.into(),
            output_kind,
            imageless: false,
            keep_work_files: true,
            status,
        }
    }

    /// Runner with root, output kind and merge options taken from `config`.
    pub fn from_config(
        config: &Config,
        orchestrator: Orchestrator,
        status: Arc<dyn StatusSink>,
    ) -> Result<Self, ConfigError> {
        let output_kind = config.output_kind()?;
        Ok(Self::new(
            orchestrator,
            FileDiscovery::new(config.discovery.clone()),
            config.root(),
            output_kind,
            status,
        )
        .with_imageless(config.output.imageless_variant)
        .keep_work_files(config.general.keep_work_files))
    }

    /// Also write `<group> (Imageless).<ext>` next to each merged document.
    pub fn with_imageless(mut self, imageless: bool) -> Self {
        self.imageless = imageless;
        self
    }

    /// Keep converted files in the work directory after the run.
    pub fn keep_work_files(mut self, keep: bool) -> Self {
        self.keep_work_files = keep;
        self
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Groups that [`BatchRunner::run`] would process.
    pub fn groups(&self) -> Result<Vec<DiscoveredGroup>, DocmergeError> {
        self.discovery
            .discover_groups(&self.root)
            .map_err(|e| PipelineError::io(&self.root, e).into())
    }

    /// Process every group.
    ///
    /// Per-file failures are counted and reported; only cache failures and
    /// an unreadable root abort the run.
    pub async fn run(&mut self) -> Result<BatchReport, DocmergeError> {
        let groups = self.groups()?;
        tracing::info!("Found {} group(s) under {:?}", groups.len(), self.root);

        let mut report = BatchReport::default();
        for group in &groups {
            self.run_group(group, &mut report).await?;
        }

        if !self.keep_work_files {
            self.remove_work_dir().await;
        }

        Ok(report)
    }

    async fn run_group(
        &mut self,
        group: &DiscoveredGroup,
        report: &mut BatchReport,
    ) -> Result<(), DocmergeError> {
        let destination = group
            .dir
            .join(format!("{}.{}", group.name, self.output_kind.extension()));
        let imageless = imageless_path(&destination);

        // A previous run's merged documents are not inputs.
        let inputs: Vec<_> = group
            .files
            .iter()
            .filter(|f| f.path != destination && f.path != imageless)
            .collect();

        self.status.report(StatusEvent::GroupStarted {
            name: group.name.clone(),
            files: inputs.len(),
        });

        let group_work = self.orchestrator.work_dir().join(&group.name);
        let mut outputs = Vec::with_capacity(inputs.len());

        for file in inputs {
            // Mirror the group's subfolders so same-named inputs stay apart.
            let output_dir = file
                .path
                .parent()
                .and_then(|parent| parent.strip_prefix(&group.dir).ok())
                .map(|relative| group_work.join(relative))
                .unwrap_or_else(|| group_work.clone());

            match self
                .orchestrator
                .convert_into(&file.path, &output_dir, self.output_kind)
                .await
            {
                Ok(outcome) => {
                    if outcome.from_cache() {
                        report.cached += 1;
                    } else {
                        report.converted += 1;
                    }
                    outputs.push(outcome.output);
                }
                Err(e) if !e.is_recoverable() => return Err(e.into()),
                Err(e) => {
                    match e {
                        PipelineError::UnsupportedFormat { .. }
                        | PipelineError::UnsupportedConversion { .. } => report.unsupported += 1,
                        _ => report.failed += 1,
                    }
                    self.status.report(StatusEvent::FileFailed {
                        file: file.path.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if outputs.is_empty() {
            tracing::info!("Nothing to merge for group {}", group.name);
            return Ok(());
        }

        let merger = Merger::new(self.status.clone()).with_imageless(self.imageless);
        match merger.merge(&outputs, &destination) {
            Ok(merged) => {
                report.groups_merged += 1;
                report.merged_documents.push(merged.destination);
                report.merged_documents.extend(merged.imageless);
            }
            Err(e) => {
                self.status.report(StatusEvent::FileFailed {
                    file: destination,
                    reason: e.to_string(),
                });
            }
        }
        Ok(())
    }

    async fn remove_work_dir(&self) {
        let work_dir: &Path = self.orchestrator.work_dir();
        if !work_dir.exists() {
            return;
        }
        if let Err(e) = tokio::fs::remove_dir_all(work_dir).await {
            let message = format!("Could not remove work directory {:?}: {e}", work_dir);
            tracing::warn!("{message}");
            self.status.report(StatusEvent::Warning { message });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use crate::config::DiscoveryConfig;
    use crate::status::RecordingStatus;
    use crate::tools::ConverterRegistry;

    fn runner(root: &Path, work: &Path, status: Arc<RecordingStatus>) -> BatchRunner {
        // Identity copies only: html inputs merge as they are.
        let orchestrator = Orchestrator::new(
            CacheStore::in_memory(),
            ConverterRegistry::new().with_identity_copies(),
            work,
            status.clone(),
        );
        let discovery = FileDiscovery::new(DiscoveryConfig {
            input_formats: vec!["html".to_string(), "pdf".to_string()],
            ..DiscoveryConfig::default()
        });
        BatchRunner::new(orchestrator, discovery, root, DocumentKind::Markup, status)
    }

    #[tokio::test]
    async fn test_run_merges_each_group() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("root");
        std::fs::create_dir_all(root.join("g1")).unwrap();
        std::fs::write(root.join("g1/b.html"), "B").unwrap();
        std::fs::write(root.join("g1/a.html"), "A").unwrap();
        // No pdf converter registered: counted, not fatal.
        std::fs::write(root.join("g1/c.pdf"), "C").unwrap();

        let status = RecordingStatus::shared();
        let mut runner = runner(&root, &dir.path().join("work"), status.clone());
        let report = runner.run().await.unwrap();

        assert_eq!(report.groups_merged, 1);
        assert_eq!(report.converted, 2);
        assert_eq!(report.unsupported, 1);
        assert_eq!(report.total(), 3);
        let merged = root.canonicalize().unwrap().join("g1/g1.html");
        assert_eq!(report.merged_documents, vec![merged.clone()]);
        assert_eq!(std::fs::read_to_string(merged).unwrap(), "AB");
        assert_eq!(
            status.count(|e| matches!(e, StatusEvent::FileFailed { .. })),
            1
        );
    }

    #[tokio::test]
    async fn test_work_dir_removed_unless_kept() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("root");
        std::fs::create_dir_all(root.join("g1")).unwrap();
        std::fs::write(root.join("g1/a.html"), "A").unwrap();
        let work = dir.path().join("work");

        let mut kept = runner(&root, &work, RecordingStatus::shared());
        kept.run().await.unwrap();
        assert!(work.exists());

        let mut removed = runner(&root, &work, RecordingStatus::shared()).keep_work_files(false);
        let report = removed.run().await.unwrap();
        assert!(!work.exists());
        // g1/g1.html from the first run is skipped.
        assert_eq!(report.converted, 1);
    }

    #[tokio::test]
    async fn test_same_file_name_in_subfolders() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("root");
        std::fs::create_dir_all(root.join("g1/week1")).unwrap();
        std::fs::create_dir_all(root.join("g1/week2")).unwrap();
        std::fs::write(root.join("g1/week1/notes.html"), "ONE").unwrap();
        std::fs::write(root.join("g1/week2/notes.html"), "TWO").unwrap();
        let work = dir.path().join("work");

        let mut runner = runner(&root, &work, RecordingStatus::shared());
        let report = runner.run().await.unwrap();

        assert_eq!(report.converted, 2);
        assert_eq!(
            std::fs::read_to_string(&report.merged_documents[0]).unwrap(),
            "ONETWO"
        );

        let cache = runner.orchestrator().cache();
        let week1 = root.join("g1/week1/notes.html").canonicalize().unwrap();
        let output = cache.lookup_by_path(&week1).unwrap();
        assert!(output.ends_with("g1/week1/notes.html.html"));
        assert_eq!(std::fs::read_to_string(output).unwrap(), "ONE");
    }

    #[tokio::test]
    async fn test_missing_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut runner = runner(
            &dir.path().join("nope"),
            &dir.path().join("work"),
            RecordingStatus::shared(),
        );
        assert!(runner.run().await.is_err());
    }
}
