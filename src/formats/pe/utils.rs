//! Utility functions for PE parsing

use crate::formats::pe::types::{PeError, Result};

/// Extension trait for bounds-checked reads of primitive types from byte slices
pub trait ReadExt {
    fn read_u8_at(&self, offset: usize) -> Option<u8>;
    fn read_u16_le_at(&self, offset: usize) -> Option<u16>;
    fn read_u32_le_at(&self, offset: usize) -> Option<u32>;
    fn read_u64_le_at(&self, offset: usize) -> Option<u64>;
    fn read_cstring_at(&self, offset: usize, max_len: usize) -> Option<&str>;
    fn read_slice_at(&self, offset: usize, len: usize) -> Option<&[u8]>;
}

impl ReadExt for [u8] {
    #[inline(always)]
    fn read_u8_at(&self, offset: usize) -> Option<u8> {
        self.get(offset).copied()
    }

    #[inline(always)]
    fn read_u16_le_at(&self, offset: usize) -> Option<u16> {
        self.read_slice_at(offset, 2)
            .and_then(|b| b.try_into().ok())
            .map(u16::from_le_bytes)
    }

    #[inline(always)]
    fn read_u32_le_at(&self, offset: usize) -> Option<u32> {
        self.read_slice_at(offset, 4)
            .and_then(|b| b.try_into().ok())
            .map(u32::from_le_bytes)
    }

    #[inline(always)]
    fn read_u64_le_at(&self, offset: usize) -> Option<u64> {
        self.read_slice_at(offset, 8)
            .and_then(|b| b.try_into().ok())
            .map(u64::from_le_bytes)
    }

    fn read_cstring_at(&self, offset: usize, max_len: usize) -> Option<&str> {
        if offset >= self.len() {
            return None;
        }
        let end = offset.saturating_add(max_len).min(self.len());
        let slice = &self[offset..end];

        // Find null terminator
        let len = slice.iter().position(|&b| b == 0).unwrap_or(slice.len());
        std::str::from_utf8(&slice[..len]).ok()
    }

    #[inline(always)]
    fn read_slice_at(&self, offset: usize, len: usize) -> Option<&[u8]> {
        let end = offset.checked_add(len)?;
        self.get(offset..end)
    }
}

/// Helper to read a null-terminated string from a buffer.
///
/// Unlike [`ReadExt::read_cstring_at`], the terminator must be present within
/// `max_len` bytes and inside the buffer.
pub fn read_cstring(data: &[u8], offset: usize, max_len: usize) -> Result<&str> {
    let s = data
        .read_cstring_at(offset, max_len)
        .ok_or(PeError::InvalidString)?;
    match offset.checked_add(s.len()).and_then(|end| data.get(end)) {
        Some(0) => Ok(s),
        _ => Err(PeError::InvalidString),
    }
}

/// Check that `size` bytes starting at `offset` lie inside a buffer of `data_len` bytes
#[inline(always)]
pub fn check_bounds(offset: usize, size: usize, data_len: usize) -> Result<()> {
    match offset.checked_add(size) {
        Some(end) if end <= data_len => Ok(()),
        _ => Err(PeError::InvalidOffset { offset }),
    }
}

/// Convert a section name array to a string
pub fn section_name_to_string(name: &[u8; 8]) -> String {
    let end = name.iter().position(|&b| b == 0).unwrap_or(8);
    String::from_utf8_lossy(&name[..end]).to_string()
}
