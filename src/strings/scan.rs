//! Lazy scanners over printable byte runs.
//!
//! Both scanners borrow the buffer and yield `(start, end)` ranges; nothing
//! is allocated until the caller decodes a range.

use super::is_printable;

/// Every printable prefix `[i, j)` with `i + min <= j <= min(i + window, len)`,
/// ordered by start offset and then by end offset.
pub struct PrefixRuns<'a> {
    data: &'a [u8],
    min_length: usize,
    max_window: usize,
    start: usize,
    // Next end offset to emit for `start`, and the last one allowed.
    next_end: usize,
    last_end: usize,
    // First non-printable index at or after `start`.
    run_end: usize,
}

impl<'a> PrefixRuns<'a> {
    pub fn new(data: &'a [u8], min_length: usize, max_window: usize) -> Self {
        let mut runs = Self {
            data,
            min_length: min_length.max(1),
            max_window,
            start: 0,
            next_end: 1,
            last_end: 0,
            run_end: 0,
        };
        runs.prepare_start();
        runs
    }

    /// Compute the emit range for the current start offset.
    fn prepare_start(&mut self) {
        if self.start >= self.run_end {
            self.run_end = self.start;
            while self.run_end < self.data.len() && is_printable(self.data[self.run_end]) {
                self.run_end += 1;
            }
        }
        let window_end = self.start.saturating_add(self.max_window);
        self.last_end = self.run_end.min(window_end);
        self.next_end = self.start.saturating_add(self.min_length);
    }
}

impl Iterator for PrefixRuns<'_> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        while self.start < self.data.len() {
            if self.next_end <= self.last_end {
                let item = (self.start, self.next_end);
                self.next_end += 1;
                return Some(item);
            }
            self.start += 1;
            self.prepare_start();
        }
        None
    }
}

/// Each maximal printable run of at least `min` bytes, reported once.
pub struct MaximalRuns<'a> {
    data: &'a [u8],
    min_length: usize,
    pos: usize,
}

impl<'a> MaximalRuns<'a> {
    pub fn new(data: &'a [u8], min_length: usize) -> Self {
        Self {
            data,
            min_length: min_length.max(1),
            pos: 0,
        }
    }
}

impl Iterator for MaximalRuns<'_> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.data.len() {
            if !is_printable(self.data[self.pos]) {
                self.pos += 1;
                continue;
            }
            let start = self.pos;
            while self.pos < self.data.len() && is_printable(self.data[self.pos]) {
                self.pos += 1;
            }
            if self.pos - start >= self.min_length {
                return Some((start, self.pos));
            }
        }
        None
    }
}
