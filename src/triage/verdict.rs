//! Verdict aggregation.
//!
//! The verdict is a flat OR over three clauses: any signature match, any
//! imported name containing a suspicious substring, or an infected
//! reputation. Sentinel values never contribute.

use crate::config::ScanConfig;
use crate::error::{Result, ScanError};
use crate::triage::report::{ExecutableMetadata, ReputationVerdict, SignatureMatchSet};
use aho_corasick::AhoCorasick;
use serde::Serialize;

/// One clause of the policy that fired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "clause", rename_all = "snake_case")]
pub enum VerdictReason {
    /// The signature matcher reported these rules.
    SignatureMatch { rules: Vec<String> },
    /// These imported names contain a suspicious substring.
    SuspiciousImports { imports: Vec<String> },
    /// The reputation scanner flagged the file.
    ReputationInfected,
}

/// Outcome of applying the policy.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Verdict {
    pub malicious: bool,
    pub reasons: Vec<VerdictReason>,
}

/// Borrowed view of the signals the policy reads.
#[derive(Debug, Clone, Copy)]
pub struct Signals<'a> {
    pub signatures: &'a SignatureMatchSet,
    pub reputation: &'a ReputationVerdict,
    pub metadata: &'a ExecutableMetadata,
}

/// Compiled suspicious-API policy.
#[derive(Debug, Clone)]
pub struct VerdictPolicy {
    // None when no substrings are configured
    matcher: Option<AhoCorasick>,
}

impl VerdictPolicy {
    pub fn new<S: AsRef<str>>(substrings: &[S], ignore_case: bool) -> Result<Self> {
        if substrings.is_empty() {
            return Ok(Self { matcher: None });
        }
        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(ignore_case)
            .build(substrings.iter().map(|s| s.as_ref()))
            .map_err(|e| ScanError::InvalidConfig(format!("suspicious API patterns: {e}")))?;
        Ok(Self {
            matcher: Some(matcher),
        })
    }

    pub fn from_config(config: &ScanConfig) -> Result<Self> {
        Self::new(
            config.suspicious_api_substrings.as_slice(),
            config.api_match_ignore_case,
        )
    }

    /// Imported names that contain any configured substring, in import order.
    pub fn suspicious_imports(&self, imports: &[String]) -> Vec<String> {
        let Some(matcher) = &self.matcher else {
            return Vec::new();
        };
        imports
            .iter()
            .filter(|name| matcher.is_match(name.as_str()))
            .cloned()
            .collect()
    }

    /// Apply the policy. Pure; performs no I/O and cannot fail.
    pub fn evaluate(&self, signals: &Signals<'_>) -> Verdict {
        let mut reasons = Vec::new();

        let rules = signals.signatures.rules();
        if !rules.is_empty() {
            reasons.push(VerdictReason::SignatureMatch {
                rules: rules.to_vec(),
            });
        }

        let imports = self.suspicious_imports(signals.metadata.imports());
        if !imports.is_empty() {
            reasons.push(VerdictReason::SuspiciousImports { imports });
        }

        if *signals.reputation == ReputationVerdict::Infected {
            reasons.push(VerdictReason::ReputationInfected);
        }

        Verdict {
            malicious: !reasons.is_empty(),
            reasons,
        }
    }
}
