//! Configuration for printable string extraction.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringsConfig {
    /// Minimum length for a reported run (in bytes)
    pub min_length: usize,
    /// Longest run grown from a single start offset in prefix mode
    pub max_window: usize,
    /// Report every printable prefix from every offset, not only maximal runs
    pub emit_all_prefixes: bool,
}

impl Default for StringsConfig {
    fn default() -> Self {
        Self {
            min_length: 4,
            max_window: 128,
            emit_all_prefixes: true,
        }
    }
}

impl StringsConfig {
    /// Cheaper mode reporting each maximal printable run once.
    pub fn maximal_runs() -> Self {
        Self {
            emit_all_prefixes: false,
            ..Self::default()
        }
    }
}
