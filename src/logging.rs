//! Logging and tracing infrastructure for binscan.
//!
//! Structured logging through the tracing crate. Output goes to stderr so
//! that a report written to stdout stays machine readable.

use std::sync::Once;
use tracing::info;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

static INIT: Once = Once::new();

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the global tracing subscriber.
///
/// This should be called once at program startup.
/// Subsequent calls are ignored.
pub fn init_tracing() {
    INIT.call_once(|| {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .with_thread_names(true)
            .with_line_number(true);

        // A subscriber may already be installed by the host process.
        let _ = tracing_subscriber::registry()
            .with(env_filter())
            .with(fmt_layer)
            .try_init();

        info!("binscan tracing initialized");
    });
}

/// Initialize tracing with JSON output for structured logging.
pub fn init_tracing_json() {
    INIT.call_once(|| {
        let fmt_layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .with_thread_names(true)
            .with_line_number(true)
            .with_current_span(true);

        let _ = tracing_subscriber::registry()
            .with(env_filter())
            .with(fmt_layer)
            .try_init();

        info!("binscan tracing initialized (JSON mode)");
    });
}
