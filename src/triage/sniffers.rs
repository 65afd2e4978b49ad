//! In-process content sniffing.
//!
//! Uses `infer` on a bounded prefix. The hint is informational and never
//! feeds the verdict.

use serde::Serialize;
use tracing::debug;

/// Maximum prefix handed to the content sniffer
pub const MAX_SNIFF_SIZE: usize = 8192;

/// MIME type and canonical extension detected from content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentHint {
    pub mime: String,
    pub extension: String,
}

/// Sniff a content type from the start of `data`.
pub fn sniff_content(data: &[u8]) -> Option<ContentHint> {
    let prefix = &data[..data.len().min(MAX_SNIFF_SIZE)];
    match infer::get(prefix) {
        Some(kind) => {
            debug!(
                mime = kind.mime_type(),
                extension = kind.extension(),
                "Content type detected"
            );
            Some(ContentHint {
                mime: kind.mime_type().to_string(),
                extension: kind.extension().to_string(),
            })
        }
        None => {
            debug!("No content type detected from {} bytes", prefix.len());
            None
        }
    }
}
