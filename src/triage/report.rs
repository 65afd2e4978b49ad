//! Report model for one analysis run.
//!
//! Every signal type carries its own failure sentinel, so a report is always
//! complete: a field is either a result or a typed "could not compute" value.

use crate::hashing::ContentDigest;
use crate::strings::ExtractedString;
use crate::triage::sniffers::ContentHint;
use crate::triage::verdict::{Verdict, VerdictReason};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Description used for inputs the executable parser does not accept.
pub const NOT_RECOGNIZED_DESC: &str = "Not a PE file";

/// Rule identifiers reported by the signature matcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SignatureMatchSet {
    /// The matcher ran; an empty list means no rule matched.
    Matched(Vec<String>),
    /// The matcher could not run at all.
    Unavailable {
        #[serde(rename = "unavailable")]
        reason: String,
    },
}

impl SignatureMatchSet {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Matched rules; empty when nothing matched or the matcher was unavailable.
    pub fn rules(&self) -> &[String] {
        match self {
            Self::Matched(rules) => rules,
            Self::Unavailable { .. } => &[],
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Outcome of the reputation scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReputationVerdict {
    Clean,
    Infected,
    Unavailable { reason: String },
}

impl ReputationVerdict {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}

impl Serialize for ReputationVerdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Clean => serializer.serialize_str("Clean"),
            Self::Infected => serializer.serialize_str("Malware Found"),
            Self::Unavailable { reason } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("unavailable", reason)?;
                map.end()
            }
        }
    }
}

/// Free-text classification from the type sniffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescription {
    Described(String),
    Unavailable { reason: String },
}

impl TypeDescription {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}

// Rendered as one string either way; failures read "Error: <reason>".
impl Serialize for TypeDescription {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Described(text) => serializer.serialize_str(text),
            Self::Unavailable { reason } => serializer.serialize_str(&format!("Error: {reason}")),
        }
    }
}

/// Static metadata of a recognized executable image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageMetadata {
    /// Imported symbol names across all import descriptors, in traversal order.
    pub imports: Vec<String>,
    /// Imported library names, in traversal order.
    pub libraries: Vec<String>,
    /// Imports bound by ordinal, which carry no name.
    pub ordinal_imports: usize,
    pub machine: String,
    pub is_64bit: bool,
    pub entry_point: u32,
    pub image_base: u64,
    pub sections: Vec<String>,
}

/// Result of trying to read the target as an executable image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutableMetadata {
    RecognizedImage(ImageMetadata),
    NotRecognized { reason: String },
}

impl ExecutableMetadata {
    /// Imported names, empty unless the image was recognized.
    pub fn imports(&self) -> &[String] {
        match self {
            Self::RecognizedImage(image) => &image.imports,
            Self::NotRecognized { .. } => &[],
        }
    }

    pub fn is_recognized(&self) -> bool {
        matches!(self, Self::RecognizedImage(_))
    }
}

impl Serialize for ExecutableMetadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::RecognizedImage(image) => image.serialize(serializer),
            Self::NotRecognized { reason } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("desc", NOT_RECOGNIZED_DESC)?;
                map.serialize_entry("reason", reason)?;
                map.end()
            }
        }
    }
}

/// Everything one run collected, before the verdict is applied.
#[derive(Debug, Clone)]
pub struct ReportParts {
    pub file_name: String,
    pub sha256: ContentDigest,
    pub strings: Vec<ExtractedString>,
    pub yara_matches: SignatureMatchSet,
    pub clamav_scan: ReputationVerdict,
    pub pe_analysis: ExecutableMetadata,
    pub file_type_info: TypeDescription,
    pub content_type: Option<ContentHint>,
}

/// The immutable result of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    file_name: String,
    sha256: ContentDigest,
    strings: Vec<ExtractedString>,
    yara_matches: SignatureMatchSet,
    clamav_scan: ReputationVerdict,
    pe_analysis: ExecutableMetadata,
    file_type_info: TypeDescription,
    content_type: Option<ContentHint>,
    verdict_reasons: Vec<VerdictReason>,
    malicious: bool,
}

impl AnalysisReport {
    pub fn new(parts: ReportParts, verdict: Verdict) -> Self {
        Self {
            file_name: parts.file_name,
            sha256: parts.sha256,
            strings: parts.strings,
            yara_matches: parts.yara_matches,
            clamav_scan: parts.clamav_scan,
            pe_analysis: parts.pe_analysis,
            file_type_info: parts.file_type_info,
            content_type: parts.content_type,
            malicious: verdict.malicious,
            verdict_reasons: verdict.reasons,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn sha256(&self) -> &ContentDigest {
        &self.sha256
    }

    pub fn strings(&self) -> &[ExtractedString] {
        &self.strings
    }

    pub fn yara_matches(&self) -> &SignatureMatchSet {
        &self.yara_matches
    }

    pub fn clamav_scan(&self) -> &ReputationVerdict {
        &self.clamav_scan
    }

    pub fn pe_analysis(&self) -> &ExecutableMetadata {
        &self.pe_analysis
    }

    pub fn file_type_info(&self) -> &TypeDescription {
        &self.file_type_info
    }

    pub fn content_type(&self) -> Option<&ContentHint> {
        self.content_type.as_ref()
    }

    pub fn verdict_reasons(&self) -> &[VerdictReason] {
        &self.verdict_reasons
    }

    pub fn malicious(&self) -> bool {
        self.malicious
    }

    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
