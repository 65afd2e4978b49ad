//! Read-only access to the file under analysis.
//!
//! The target is opened once per run and memory-mapped, so every stage sees
//! the same immutable bytes without copying them. Failure to open or map the
//! target is the only fatal error of an analysis run.

use crate::error::{Result, ScanError};
use memmap2::Mmap;
use std::fs::File;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use tracing::debug;

enum Backing {
    Mapped(Mmap),
    // Zero-length files cannot be mapped; in-memory targets land here too.
    Owned(Vec<u8>),
}

impl Deref for Backing {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Backing::Mapped(m) => m,
            Backing::Owned(v) => v,
        }
    }
}

/// An opened, read-only view of the target's bytes plus its display name.
pub struct AnalysisTarget {
    name: String,
    path: Option<PathBuf>,
    bytes: Backing,
}

impl AnalysisTarget {
    /// Open and map `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::TargetUnreadable`] when the file cannot be opened,
    /// inspected or mapped.
    pub fn open<P: AsRef<Path>>(path: P, name: impl Into<String>) -> Result<Self> {
        let path = path.as_ref();
        let unreadable = |source| ScanError::TargetUnreadable {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(unreadable)?;
        let metadata = file.metadata().map_err(unreadable)?;
        if !metadata.is_file() {
            return Err(unreadable(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }

        let bytes = if metadata.len() == 0 {
            Backing::Owned(Vec::new())
        } else {
            // Safety: read-only private map of a regular file; the run never writes through it.
            Backing::Mapped(unsafe { Mmap::map(&file) }.map_err(unreadable)?)
        };

        debug!(path = %path.display(), size = bytes.len(), "Mapped analysis target");

        Ok(Self {
            name: name.into(),
            path: Some(path.to_path_buf()),
            bytes,
        })
    }

    /// Wrap an in-memory buffer. External collectors need a path, so targets
    /// built this way are only suitable for the in-process stages.
    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            path: None,
            bytes: Backing::Owned(data),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for AnalysisTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisTarget")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("len", &self.bytes.len())
            .finish()
    }
}
