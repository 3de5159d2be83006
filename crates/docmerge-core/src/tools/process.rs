//! Running external programs with a time limit.

use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use crate::error::{PipelineError, PipelineResult};

/// Run `program args...` to completion, capturing stdout/stderr.
///
/// A non-zero exit status is an [`PipelineError::ExternalTool`]; `subject`
/// is the file the error is attributed to.
pub(crate) async fn run_tool(
    program: &str,
    args: &[String],
    timeout_ms: u64,
    stage: &str,
    subject: &Path,
) -> PipelineResult<Output> {
    tracing::debug!("Running {program} {}", args.join(" "));

    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| PipelineError::ExternalTool {
            tool: program.to_string(),
            path: subject.to_path_buf(),
            message: format!("cannot start: {e}"),
        })?;

    let output = match timeout(Duration::from_millis(timeout_ms), child.wait_with_output()).await
    {
        Ok(result) => result.map_err(|e| PipelineError::ExternalTool {
            tool: program.to_string(),
            path: subject.to_path_buf(),
            message: e.to_string(),
        })?,
        Err(_) => {
            return Err(PipelineError::Timeout {
                path: subject.to_path_buf(),
                stage: stage.to_string(),
                timeout_ms,
            })
        }
    };

    if !output.status.success() {
        return Err(PipelineError::ExternalTool {
            tool: program.to_string(),
            path: subject.to_path_buf(),
            message: format!("{} ({})", output.status, stderr_tail(&output.stderr)),
        });
    }

    Ok(output)
}

/// Last non-empty line of stderr, for compact error messages.
fn stderr_tail(stderr: &[u8]) -> String {
    String::from_utf8_lossy(stderr)
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .map(|line| line.trim().to_string())
        .unwrap_or_else(|| "no output".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stderr_tail() {
        assert_eq!(stderr_tail(b"warning\nerror: bad file\n\n"), "error: bad file");
        assert_eq!(stderr_tail(b""), "no output");
    }

    #[tokio::test]
    async fn test_missing_program_is_tool_error() {
        let err = run_tool(
            "docmerge-no-such-program",
            &[],
            1000,
            "convert",
            Path::new("a.pdf"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, PipelineError::ExternalTool { .. }));
        assert!(err.is_recoverable());
    }
}
