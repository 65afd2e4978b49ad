//! Configuration for an analysis run.
//!
//! Everything the pipeline needs is carried explicitly in [`ScanConfig`];
//! nothing is read from module-level defaults at analysis time.

use crate::error::{Result, ScanError};
use crate::strings::StringsConfig;
use crate::timeout::DEFAULT_TOOL_TIMEOUT_SECONDS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Master configuration for the triage pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Rule file handed to the signature matcher.
    pub yara_rules_path: PathBuf,
    /// Minimum printable run length reported by the string extractor.
    pub min_string_length: usize,
    /// Longest string the prefix extractor will grow from one offset.
    pub max_string_window: usize,
    /// Report every printable prefix (true) or only maximal runs (false).
    pub emit_all_prefixes: bool,
    /// Import names containing any of these substrings raise the verdict.
    pub suspicious_api_substrings: Vec<String>,
    /// Match suspicious substrings ignoring ASCII case.
    pub api_match_ignore_case: bool,
    /// Wall-clock budget for each external tool invocation.
    #[serde(with = "duration_secs")]
    pub external_tool_timeout: Duration,
    /// Executables used by the signal collectors.
    pub tools: ToolPaths,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            yara_rules_path: PathBuf::from("malware_rules.yar"),
            min_string_length: 4,
            max_string_window: 128,
            emit_all_prefixes: true,
            suspicious_api_substrings: Vec::new(),
            api_match_ignore_case: false,
            external_tool_timeout: Duration::from_secs(DEFAULT_TOOL_TIMEOUT_SECONDS),
            tools: ToolPaths::default(),
        }
    }
}

impl ScanConfig {
    /// Load a configuration from a JSON document; absent keys keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let body = std::fs::read_to_string(path).map_err(|e| {
            ScanError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: ScanConfig = serde_json::from_str(&body)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.min_string_length == 0 {
            return Err(ScanError::InvalidConfig(
                "min_string_length must be at least 1".to_string(),
            ));
        }
        if self.max_string_window < self.min_string_length {
            return Err(ScanError::InvalidConfig(format!(
                "max_string_window ({}) is smaller than min_string_length ({})",
                self.max_string_window, self.min_string_length
            )));
        }
        if self.external_tool_timeout.is_zero() {
            return Err(ScanError::InvalidConfig(
                "external_tool_timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// String extractor settings derived from this configuration.
    pub fn strings(&self) -> StringsConfig {
        StringsConfig {
            min_length: self.min_string_length,
            max_window: self.max_string_window,
            emit_all_prefixes: self.emit_all_prefixes,
        }
    }
}

// Durations are written as whole seconds in configuration files.
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

/// Executable names or paths for the external collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    pub yara: PathBuf,
    pub clamscan: PathBuf,
    pub file: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            yara: PathBuf::from("yara"),
            clamscan: PathBuf::from("clamscan"),
            file: PathBuf::from("file"),
        }
    }
}
