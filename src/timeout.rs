//! Timeout utilities for bounding external work.
//!
//! Every external tool invocation is wrapped in [`with_timeout`]. When the
//! deadline passes the inner future is dropped, which for a child process
//! spawned with `kill_on_drop` terminates that child and nothing else.

use crate::error::{Result, ScanError};
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Default timeout for one external tool run, in seconds
pub const DEFAULT_TOOL_TIMEOUT_SECONDS: u64 = 30;

/// Timeout configuration for a single bounded operation
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Maximum duration for the operation
    pub duration: Duration,
    /// Operation name for logging
    pub operation_name: String,
}

impl TimeoutConfig {
    /// Create a new timeout configuration
    pub fn new(duration: Duration, operation: impl Into<String>) -> Self {
        Self {
            duration,
            operation_name: operation.into(),
        }
    }
}

/// Run `future` to completion or fail with [`ScanError::Timeout`].
pub async fn with_timeout<T, F>(config: TimeoutConfig, future: F) -> Result<T>
where
    F: Future<Output = T>,
{
    debug!(
        "Starting operation '{}' with timeout of {:?}",
        config.operation_name, config.duration
    );

    match timeout(config.duration, future).await {
        Ok(value) => {
            debug!("Operation '{}' completed", config.operation_name);
            Ok(value)
        }
        Err(_) => {
            warn!(
                "Operation '{}' timed out after {:?}",
                config.operation_name, config.duration
            );

            Err(ScanError::Timeout {
                millis: config.duration.as_millis() as u64,
            })
        }
    }
}
