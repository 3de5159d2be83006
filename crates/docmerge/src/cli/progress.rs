//! Progress bar rendering of pipeline status events.

use docmerge_core::{StatusEvent, StatusSink, TracingStatus};
use indicatif::{ProgressBar, ProgressStyle};

/// Shows per-group progress and forwards every event to the log.
pub struct ProgressStatus {
    bar: ProgressBar,
    log: TracingStatus,
}

impl ProgressStatus {
    pub fn new() -> Self {
        Self::with_bar(create_progress_bar(0))
    }

    pub fn with_bar(bar: ProgressBar) -> Self {
        Self {
            bar,
            log: TracingStatus,
        }
    }

    /// The bar, so prompts can suspend it while they wait for input.
    pub fn bar(&self) -> &ProgressBar {
        &self.bar
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusSink for ProgressStatus {
    fn report(&self, event: StatusEvent) {
        match &event {
            StatusEvent::GroupStarted { name, files } => {
                self.bar.set_length(*files as u64);
                self.bar.set_position(0);
                self.bar.set_message(name.clone());
            }
            StatusEvent::Converting { file, from, to } => {
                let name = file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                self.bar.set_message(format!("{name} ({from} -> {to})"));
            }
            StatusEvent::OcrStarted { images, .. } if *images > 0 => {
                self.bar.set_message(format!("OCR: {images} image(s)"));
            }
            StatusEvent::AlreadyProcessed { .. }
            | StatusEvent::Converted { .. }
            | StatusEvent::FileFailed { .. } => self.bar.inc(1),
            _ => {}
        }
        self.bar.suspend(|| self.log.report(event));
    }
}

fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    // The template is a literal; fall back to the default style rather than fail.
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_group_progress() {
        let status = ProgressStatus::with_bar(ProgressBar::hidden());
        status.report(StatusEvent::GroupStarted {
            name: "course1".to_string(),
            files: 3,
        });
        status.report(StatusEvent::AlreadyProcessed {
            file: PathBuf::from("a.pdf"),
        });
        status.report(StatusEvent::Converted {
            file: PathBuf::from("b.pdf"),
            output: PathBuf::from("b.pdf.html"),
        });
        status.report(StatusEvent::Warning {
            message: "ignored".to_string(),
        });

        assert_eq!(status.bar().length(), Some(3));
        assert_eq!(status.bar().position(), 2);

        status.report(StatusEvent::GroupStarted {
            name: "course2".to_string(),
            files: 1,
        });
        assert_eq!(status.bar().position(), 0);
    }
}
