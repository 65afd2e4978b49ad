//! binscan - static triage of a single file
//!
//! Prints the analysis report as JSON on stdout. Logs go to stderr.

use anyhow::{Context, Result};
use binscan::logging::{init_tracing, init_tracing_json};
use binscan::{Analyzer, ScanConfig};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "binscan")]
#[command(
    author,
    version,
    about = "Static triage of untrusted binaries"
)]
#[command(long_about = "
binscan hashes a file, extracts printable strings, reads PE imports and
asks yara, clamscan and file for their opinion, then prints one JSON
report with a malicious/benign verdict. Missing tools degrade their own
field only.

EXAMPLES:
    binscan sample.exe
    binscan upload.tmp invoice.pdf.exe --rules rules/malware.yar
    binscan sample.exe --suspicious-api VirtualAllocEx --suspicious-api WriteProcessMemory
    binscan sample.exe --config binscan.json --maximal-runs
")]
struct Cli {
    /// File to analyze
    file: PathBuf,

    /// Name to report for the file (defaults to its file name)
    name: Option<String>,

    /// JSON configuration file; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// YARA rules file
    #[arg(short, long)]
    rules: Option<PathBuf>,

    /// Timeout for each external tool, in seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Import-name substring that marks a file malicious (repeatable)
    #[arg(long = "suspicious-api", value_name = "SUBSTRING")]
    suspicious_api: Vec<String>,

    /// Report each maximal printable run once instead of every prefix
    #[arg(long)]
    maximal_runs: bool,

    /// Minimum printable run length
    #[arg(short = 'm', long)]
    min_length: Option<usize>,

    /// Longest string grown from one offset in prefix mode
    #[arg(short, long)]
    window: Option<usize>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    fn scan_config(&self) -> Result<ScanConfig> {
        let mut config = match &self.config {
            Some(path) => ScanConfig::from_json_file(path)?,
            None => ScanConfig::default(),
        };
        if let Some(rules) = &self.rules {
            config.yara_rules_path = rules.clone();
        }
        if let Some(secs) = self.timeout {
            config.external_tool_timeout = Duration::from_secs(secs);
        }
        if !self.suspicious_api.is_empty() {
            config.suspicious_api_substrings = self.suspicious_api.clone();
        }
        if self.maximal_runs {
            config.emit_all_prefixes = false;
        }
        if let Some(min) = self.min_length {
            config.min_string_length = min;
        }
        if let Some(window) = self.window {
            config.max_string_window = window;
        }
        config.validate()?;
        Ok(config)
    }

    fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| {
            self.file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.file.display().to_string())
        })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.json_logs {
        init_tracing_json();
    } else {
        init_tracing();
    }

    let config = cli.scan_config().context("invalid configuration")?;
    let analyzer = Analyzer::new(config)?;
    let report = analyzer.analyze_blocking(&cli.file, &cli.display_name())?;

    println!("{}", report.to_json_pretty()?);
    Ok(())
}
