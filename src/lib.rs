//! Static triage of untrusted binaries.
//!
//! A run digests the file, extracts printable strings, reads PE imports,
//! collects signature, reputation and type signals from external tools, and
//! folds everything into one [`AnalysisReport`] with a boolean verdict.

pub mod collectors;
pub mod config;
pub mod error;
pub mod formats;
pub mod hashing;
pub mod io;
pub mod logging;
pub mod strings;
pub mod timeout;
pub mod triage;

pub use config::ScanConfig;
pub use error::{Result, ScanError};
pub use hashing::{sha256_digest, sha256_file, sha256_reader, ContentDigest};
pub use io::AnalysisTarget;
pub use triage::{AnalysisReport, Analyzer, VerdictReason};
