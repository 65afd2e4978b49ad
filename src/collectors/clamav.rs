//! Reputation lookup through `clamscan`.

use crate::collectors::{Collector, ToolOutput, ToolRunner};
use crate::triage::report::ReputationVerdict;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Suffix clamscan puts on a result line after the signature name of a detection
pub const FOUND_MARKER: &str = " FOUND";

pub struct ClamAvCollector<R> {
    runner: Arc<R>,
    program: PathBuf,
    timeout: Duration,
}

impl<R: ToolRunner> ClamAvCollector<R> {
    pub fn new(runner: Arc<R>, program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            runner,
            program: program.into(),
            timeout,
        }
    }
}

impl<R: ToolRunner> Collector for ClamAvCollector<R> {
    type Signal = ReputationVerdict;

    fn name(&self) -> &'static str {
        "clamscan"
    }

    async fn collect(&self, target: &Path) -> ReputationVerdict {
        let args = [OsString::from("--no-summary"), OsString::from(target)];
        match self.runner.run(&self.program, &args, self.timeout).await {
            Ok(output) => classify(output, &self.program),
            Err(err) => {
                warn!(error = %err, "ClamAV scan unavailable");
                ReputationVerdict::unavailable(err.to_string())
            }
        }
    }
}

/// Classify a finished clamscan run.
///
/// A detection is a result line ending in ` FOUND`; the scanned path is echoed
/// on every line, so the marker is only trusted at the end. Exit status 1
/// means "virus found" and 0 "clean"; anything else without a detection line
/// is a scanner error.
pub fn classify(output: ToolOutput, program: &Path) -> ReputationVerdict {
    if has_detection(&output.stdout) {
        debug!("ClamAV reported a detection");
        return ReputationVerdict::Infected;
    }
    match output.status {
        Some(0) | Some(1) => ReputationVerdict::Clean,
        _ => {
            let err = output.into_failure(program);
            warn!(error = %err, "ClamAV scan failed");
            ReputationVerdict::unavailable(err.to_string())
        }
    }
}

fn has_detection(stdout: &str) -> bool {
    stdout
        .lines()
        .any(|line| line.trim_end().ends_with(FOUND_MARKER))
}
