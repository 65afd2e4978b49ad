//! Signal collectors wrapping external scanning tools.
//!
//! Each collector runs one tool against the target path and always returns
//! its signal: failures of any kind degrade to that signal's `Unavailable`
//! variant instead of surfacing as errors.

use std::future::Future;
use std::path::Path;

pub mod clamav;
pub mod file_type;
pub mod runner;
pub mod yara;

pub use clamav::ClamAvCollector;
pub use file_type::FileTypeCollector;
pub use runner::{ProcessRunner, ToolError, ToolOutput, ToolRunner};
pub use yara::YaraCollector;

/// One independent signal source.
pub trait Collector: Send + Sync {
    /// The signal this collector produces, including its failure sentinel.
    type Signal: Send;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Collect the signal for the file at `target`. Never fails.
    fn collect(&self, target: &Path) -> impl Future<Output = Self::Signal> + Send;
}
