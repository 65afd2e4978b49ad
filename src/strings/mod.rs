//! Printable string extraction.
//!
//! A byte is printable when it lies in `32..=126`. Bytes are decoded one to
//! one as Latin-1 code points, so decoding can never fail.
//!
//! Two reporting modes exist. Prefix mode (the default) reports every
//! printable `[i, j)` grown from every start offset, overlaps included,
//! which costs `O(n * window)` entries on fully printable input. Maximal-run
//! mode reports each printable run once.

mod config;
mod scan;

pub use config::StringsConfig;
pub use scan::{MaximalRuns, PrefixRuns};

use serde::{Serialize, Serializer};

/// Lowest printable byte (space).
pub const PRINTABLE_MIN: u8 = 32;
/// Highest printable byte (`~`).
pub const PRINTABLE_MAX: u8 = 126;

#[inline(always)]
pub fn is_printable(b: u8) -> bool {
    (PRINTABLE_MIN..=PRINTABLE_MAX).contains(&b)
}

/// A printable run copied out of the target, with its byte offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedString {
    pub offset: usize,
    pub text: String,
}

impl ExtractedString {
    fn decode(data: &[u8], start: usize, end: usize) -> Self {
        Self {
            offset: start,
            text: data[start..end].iter().copied().map(char::from).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

// Reports carry the text only; offsets are an in-memory convenience.
impl Serialize for ExtractedString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

enum Ranges<'a> {
    Prefixes(PrefixRuns<'a>),
    Maximal(MaximalRuns<'a>),
}

/// Lazy sequence of [`ExtractedString`] borrowed from a buffer.
pub struct Strings<'a> {
    data: &'a [u8],
    ranges: Ranges<'a>,
}

impl Iterator for Strings<'_> {
    type Item = ExtractedString;

    fn next(&mut self) -> Option<Self::Item> {
        let (start, end) = match &mut self.ranges {
            Ranges::Prefixes(r) => r.next()?,
            Ranges::Maximal(r) => r.next()?,
        };
        Some(ExtractedString::decode(self.data, start, end))
    }
}

/// Iterate the printable strings of `data` according to `cfg`.
pub fn extract<'a>(data: &'a [u8], cfg: &StringsConfig) -> Strings<'a> {
    let ranges = if cfg.emit_all_prefixes {
        Ranges::Prefixes(PrefixRuns::new(data, cfg.min_length, cfg.max_window))
    } else {
        Ranges::Maximal(MaximalRuns::new(data, cfg.min_length))
    };
    Strings { data, ranges }
}

/// Collect every string of `data` into a vector.
pub fn extract_all(data: &[u8], cfg: &StringsConfig) -> Vec<ExtractedString> {
    let strings: Vec<_> = extract(data, cfg).collect();
    tracing::debug!(
        bytes = data.len(),
        count = strings.len(),
        all_prefixes = cfg.emit_all_prefixes,
        "Extracted printable strings"
    );
    strings
}
