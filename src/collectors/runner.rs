//! External process execution.

use crate::timeout::{with_timeout, TimeoutConfig};
use std::ffi::OsString;
use std::future::Future;
use std::io;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Why an external tool produced no usable output.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("'{program}' command not found")]
    NotFound { program: String },

    #[error("'{program}' timed out after {millis}ms")]
    Timeout { program: String, millis: u64 },

    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("'{program}' exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
}

/// Captured result of a finished tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code; `None` when the process was terminated by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Convert a non-zero exit into [`ToolError::Failed`].
    pub fn into_failure(self, program: &Path) -> ToolError {
        ToolError::Failed {
            program: program.display().to_string(),
            status: self
                .status
                .map(|code| format!("status {code}"))
                .unwrap_or_else(|| "a signal".to_string()),
            stderr: self.stderr.lines().next().unwrap_or_default().trim().to_string(),
        }
    }
}

/// Runs external programs under a time budget.
pub trait ToolRunner: Send + Sync {
    fn run(
        &self,
        program: &Path,
        args: &[OsString],
        timeout: Duration,
    ) -> impl Future<Output = Result<ToolOutput, ToolError>> + Send;
}

/// Spawns real child processes through tokio.
///
/// Children are spawned with `kill_on_drop`, so a timed-out run kills its own
/// process and leaves sibling work alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    async fn run(
        &self,
        program: &Path,
        args: &[OsString],
        timeout: Duration,
    ) -> Result<ToolOutput, ToolError> {
        let name = program.display().to_string();
        debug!(program = %name, ?args, "Spawning external tool");

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match with_timeout(TimeoutConfig::new(timeout, name.clone()), command.output())
            .await
        {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ToolError::NotFound { program: name });
            }
            Ok(Err(source)) => {
                return Err(ToolError::Spawn {
                    program: name,
                    source,
                });
            }
            Err(_) => {
                return Err(ToolError::Timeout {
                    program: name,
                    millis: timeout.as_millis() as u64,
                });
            }
        };

        Ok(ToolOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
