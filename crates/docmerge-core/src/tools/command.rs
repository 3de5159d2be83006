//! Converters backed by external command-line tools.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::process::run_tool;
use super::FormatConverter;
use crate::config::CommandSpec;
use crate::error::{PipelineError, PipelineResult};

/// Runs a configured program to convert one file.
///
/// The tool writes into a scratch directory next to the final output; the
/// produced file is then moved into place. Tools that pick their own output
/// name (e.g. `soffice --outdir`) work as long as they emit a single file with
/// the expected extension.
pub struct CommandConverter {
    spec: CommandSpec,
    timeout_ms: u64,
}

impl CommandConverter {
    pub fn new(spec: CommandSpec, timeout_ms: u64) -> Self {
        Self { spec, timeout_ms }
    }

    /// Substitute `{input}`, `{output}` and `{output_dir}` in the argument templates.
    fn render_args(&self, input: &Path, output: &Path, output_dir: &Path) -> Vec<String> {
        self.spec
            .args
            .iter()
            .map(|arg| {
                arg.replace("{input}", &input.to_string_lossy())
                    .replace("{output_dir}", &output_dir.to_string_lossy())
                    .replace("{output}", &output.to_string_lossy())
            })
            .collect()
    }

    fn tool_error(&self, input: &Path, message: impl Into<String>) -> PipelineError {
        PipelineError::ExternalTool {
            tool: self.spec.program.clone(),
            path: input.to_path_buf(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl FormatConverter for CommandConverter {
    fn name(&self) -> &str {
        &self.spec.program
    }

    async fn convert(&self, input: &Path, output: &Path) -> PipelineResult<()> {
        let parent = output.parent().unwrap_or(Path::new("."));
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| PipelineError::io(parent, e))?;

        let scratch = tempfile::Builder::new()
            .prefix(".docmerge-")
            .tempdir_in(parent)
            .map_err(|e| PipelineError::io(parent, e))?;
        let file_name = output
            .file_name()
            .ok_or_else(|| self.tool_error(input, "output path has no file name"))?;
        let staged = scratch.path().join(file_name);

        let args = self.render_args(input, &staged, scratch.path());
        run_tool(&self.spec.program, &args, self.timeout_ms, "convert", input).await?;

        let produced = find_produced(scratch.path(), &staged, output)
            .ok_or_else(|| self.tool_error(input, "tool exited successfully but wrote no output"))?;

        if output.exists() {
            tokio::fs::remove_file(output)
                .await
                .map_err(|e| PipelineError::io(output, e))?;
        }
        tokio::fs::rename(&produced, output)
            .await
            .map_err(|e| PipelineError::io(output, e))?;
        Ok(())
    }
}

/// The file a tool produced: the requested path, or the only file in the
/// scratch directory carrying the output's extension.
fn find_produced(scratch: &Path, staged: &Path, output: &Path) -> Option<PathBuf> {
    if staged.is_file() {
        return Some(staged.to_path_buf());
    }
    let wanted = output.extension()?.to_string_lossy().to_lowercase();
    let mut candidates = std::fs::read_dir(scratch)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .map(|ext| ext.to_string_lossy().to_lowercase() == wanted)
                    .unwrap_or(false)
        });
    let first = candidates.next()?;
    if candidates.next().is_some() {
        return None;
    }
    Some(first)
}

/// Identity conversion: copies the input to the output path.
pub struct CopyConverter;

#[async_trait]
impl FormatConverter for CopyConverter {
    fn name(&self) -> &str {
        "copy"
    }

    async fn convert(&self, input: &Path, output: &Path) -> PipelineResult<()> {
        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PipelineError::io(parent, e))?;
        }
        tokio::fs::copy(input, output)
            .await
            .map_err(|e| PipelineError::io(input, e))?;
        Ok(())
    }
}
