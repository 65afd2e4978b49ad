//! Signature matching through the `yara` command-line scanner.

use crate::collectors::{Collector, ToolRunner};
use crate::triage::report::SignatureMatchSet;
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub struct YaraCollector<R> {
    runner: Arc<R>,
    program: PathBuf,
    rules: PathBuf,
    timeout: Duration,
}

impl<R: ToolRunner> YaraCollector<R> {
    pub fn new(
        runner: Arc<R>,
        program: impl Into<PathBuf>,
        rules: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            runner,
            program: program.into(),
            rules: rules.into(),
            timeout,
        }
    }
}

impl<R: ToolRunner> Collector for YaraCollector<R> {
    type Signal = SignatureMatchSet;

    fn name(&self) -> &'static str {
        "yara"
    }

    async fn collect(&self, target: &Path) -> SignatureMatchSet {
        let rules_present = tokio::fs::metadata(&self.rules)
            .await
            .is_ok_and(|meta| meta.is_file());
        if !rules_present {
            warn!(rules = %self.rules.display(), "YARA rules file not found");
            return SignatureMatchSet::unavailable(format!(
                "rules file not found: {}",
                self.rules.display()
            ));
        }

        let args = [OsString::from(&self.rules), OsString::from(target)];
        let output = match self.runner.run(&self.program, &args, self.timeout).await {
            Ok(output) if output.success() => output,
            Ok(output) => {
                let err = output.into_failure(&self.program);
                warn!(error = %err, "YARA scan failed");
                return SignatureMatchSet::unavailable(err.to_string());
            }
            Err(err) => {
                warn!(error = %err, "YARA scan unavailable");
                return SignatureMatchSet::unavailable(err.to_string());
            }
        };

        let rules = parse_matches(&output.stdout);
        debug!(matches = rules.len(), "YARA scan complete");
        SignatureMatchSet::Matched(rules)
    }
}

/// Rule identifiers from scanner output, one per non-empty line.
///
/// Each line reads `<rule> <path>`; repeated rules keep their first position.
pub fn parse_matches(stdout: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    stdout
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .filter(|rule| seen.insert(*rule))
        .map(str::to_string)
        .collect()
}
