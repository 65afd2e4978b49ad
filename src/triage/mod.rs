//! Triage pipeline: local stages, verdict policy and the report model.

pub mod api;
pub mod metadata;
pub mod report;
pub mod sniffers;
pub mod verdict;

pub use api::{analyze_local, Analyzer, LocalFindings};
pub use metadata::extract_metadata;
pub use report::{
    AnalysisReport, ExecutableMetadata, ImageMetadata, ReportParts, ReputationVerdict,
    SignatureMatchSet, TypeDescription,
};
pub use sniffers::{sniff_content, ContentHint};
pub use verdict::{Signals, Verdict, VerdictPolicy, VerdictReason};
