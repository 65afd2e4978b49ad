//! Type sniffing through the `file` utility.

use crate::collectors::{Collector, ToolRunner};
use crate::triage::report::TypeDescription;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

pub struct FileTypeCollector<R> {
    runner: Arc<R>,
    program: PathBuf,
    timeout: Duration,
}

impl<R: ToolRunner> FileTypeCollector<R> {
    pub fn new(runner: Arc<R>, program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            runner,
            program: program.into(),
            timeout,
        }
    }
}

impl<R: ToolRunner> Collector for FileTypeCollector<R> {
    type Signal = TypeDescription;

    fn name(&self) -> &'static str {
        "file"
    }

    async fn collect(&self, target: &Path) -> TypeDescription {
        // --brief keeps the target path out of the description
        let args = [OsString::from("--brief"), OsString::from(target)];
        match self.runner.run(&self.program, &args, self.timeout).await {
            Ok(output) if output.success() => {
                TypeDescription::Described(output.stdout.trim().to_string())
            }
            Ok(output) => {
                let err = output.into_failure(&self.program);
                warn!(error = %err, "Type sniffing failed");
                TypeDescription::unavailable(err.to_string())
            }
            Err(err) => {
                warn!(error = %err, "Type sniffer unavailable");
                TypeDescription::unavailable(err.to_string())
            }
        }
    }
}
