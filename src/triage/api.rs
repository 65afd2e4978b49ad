//! The analysis pipeline.
//!
//! One run opens the target once, then computes the in-process stages
//! (digest, strings, metadata, content hint) on the blocking pool while the
//! three external collectors run concurrently. The report is assembled only
//! after every stage has finished.

use crate::collectors::{
    ClamAvCollector, Collector, FileTypeCollector, ProcessRunner, YaraCollector,
};
use crate::config::ScanConfig;
use crate::error::{Result, ScanError};
use crate::hashing::{sha256_reader, ContentDigest};
use crate::io::AnalysisTarget;
use crate::strings::{extract_all, ExtractedString, StringsConfig};
use crate::triage::metadata::extract_metadata;
use crate::triage::report::{
    AnalysisReport, ExecutableMetadata, ReportParts, ReputationVerdict, SignatureMatchSet,
    TypeDescription,
};
use crate::triage::sniffers::{sniff_content, ContentHint};
use crate::triage::verdict::{Signals, VerdictPolicy};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, info_span, Instrument};

/// Results of the stages that only read the target's bytes.
#[derive(Debug, Clone)]
pub struct LocalFindings {
    pub digest: ContentDigest,
    pub strings: Vec<ExtractedString>,
    pub metadata: ExecutableMetadata,
    pub content_type: Option<ContentHint>,
}

/// Run the in-process stages over `target`, in parallel on the rayon pool.
pub fn analyze_local(target: &AnalysisTarget, strings: &StringsConfig) -> Result<LocalFindings> {
    let data = target.bytes();
    let (digest, (strings, (metadata, content_type))) = rayon::join(
        || sha256_reader(data),
        || {
            rayon::join(
                || extract_all(data, strings),
                || rayon::join(|| extract_metadata(data), || sniff_content(data)),
            )
        },
    );

    let digest = digest.map_err(|source| ScanError::TargetUnreadable {
        path: target
            .path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| target.name().into()),
        source,
    })?;

    Ok(LocalFindings {
        digest,
        strings,
        metadata,
        content_type,
    })
}

/// Static triage of one file per call.
///
/// Collectors are type parameters so tests and embedders can substitute
/// their own signal sources; [`Analyzer::new`] wires the command-line tools.
pub struct Analyzer<
    S = YaraCollector<ProcessRunner>,
    V = ClamAvCollector<ProcessRunner>,
    T = FileTypeCollector<ProcessRunner>,
> {
    config: ScanConfig,
    policy: VerdictPolicy,
    signatures: S,
    reputation: V,
    file_type: T,
}

impl Analyzer {
    /// Build an analyzer backed by the `yara`, `clamscan` and `file` executables.
    pub fn new(config: ScanConfig) -> Result<Self> {
        let runner = Arc::new(ProcessRunner);
        let timeout = config.external_tool_timeout;
        let signatures = YaraCollector::new(
            Arc::clone(&runner),
            config.tools.yara.clone(),
            config.yara_rules_path.clone(),
            timeout,
        );
        let reputation =
            ClamAvCollector::new(Arc::clone(&runner), config.tools.clamscan.clone(), timeout);
        let file_type = FileTypeCollector::new(runner, config.tools.file.clone(), timeout);
        Self::with_collectors(config, signatures, reputation, file_type)
    }
}

impl<S, V, T> Analyzer<S, V, T>
where
    S: Collector<Signal = SignatureMatchSet>,
    V: Collector<Signal = ReputationVerdict>,
    T: Collector<Signal = TypeDescription>,
{
    pub fn with_collectors(
        config: ScanConfig,
        signatures: S,
        reputation: V,
        file_type: T,
    ) -> Result<Self> {
        config.validate()?;
        let policy = VerdictPolicy::from_config(&config)?;
        Ok(Self {
            config,
            policy,
            signatures,
            reputation,
            file_type,
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Analyze the file at `path`, reporting it under `name`.
    ///
    /// # Errors
    ///
    /// Only an unreadable target fails the run; every other failure is
    /// recorded in the report.
    pub async fn analyze(&self, path: &Path, name: &str) -> Result<AnalysisReport> {
        let span = info_span!("analyze", file = %name);
        self.run(path, name).instrument(span).await
    }

    /// Blocking wrapper around [`Analyzer::analyze`] for callers without a runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Internal`] when called from inside a tokio runtime,
    /// where blocking on a nested runtime would panic; use [`Analyzer::analyze`]
    /// there instead.
    pub fn analyze_blocking(&self, path: &Path, name: &str) -> Result<AnalysisReport> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(ScanError::Internal(
                "analyze_blocking called from within an async runtime; use analyze".to_string(),
            ));
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.analyze(path, name))
    }

    async fn run(&self, path: &Path, name: &str) -> Result<AnalysisReport> {
        let target = Arc::new(AnalysisTarget::open(path, name)?);
        info!(size = target.len(), "Starting analysis");

        let local = {
            let target = Arc::clone(&target);
            let strings = self.config.strings();
            tokio::task::spawn_blocking(move || analyze_local(&target, &strings))
        };
        let signals = async {
            tokio::join!(
                self.signatures.collect(path),
                self.reputation.collect(path),
                self.file_type.collect(path),
            )
        };

        let (local, (yara_matches, clamav_scan, file_type_info)) = tokio::join!(local, signals);
        let local = local.map_err(|e| ScanError::Internal(format!("local analysis task: {e}")))??;
        debug!(
            collectors = ?[
                self.signatures.name(),
                self.reputation.name(),
                self.file_type.name()
            ],
            "All signals collected"
        );

        let verdict = self.policy.evaluate(&Signals {
            signatures: &yara_matches,
            reputation: &clamav_scan,
            metadata: &local.metadata,
        });
        info!(
            malicious = verdict.malicious,
            reasons = verdict.reasons.len(),
            "Analysis complete"
        );

        Ok(AnalysisReport::new(
            ReportParts {
                file_name: target.name().to_string(),
                sha256: local.digest,
                strings: local.strings,
                yara_matches,
                clamav_scan,
                pe_analysis: local.metadata,
                file_type_info,
                content_type: local.content_type,
            },
            verdict,
        ))
    }
}
