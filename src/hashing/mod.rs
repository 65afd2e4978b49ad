//! Content fingerprinting with SHA-256.
//!
//! Sources are consumed in fixed-size chunks so that arbitrarily large
//! inputs never have to be buffered just to be hashed.

use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Bytes pulled from the source per hasher update.
pub const CHUNK_SIZE: usize = 4096;

/// A SHA-256 fingerprint of some content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    fn from_hasher(hasher: Sha256) -> Self {
        let mut out = [0u8; 32];
        out.copy_from_slice(&hasher.finalize());
        Self(out)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hexadecimal rendering.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for ContentDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Stream `reader` through SHA-256 in [`CHUNK_SIZE`] pieces.
pub fn sha256_reader<R: Read>(mut reader: R) -> io::Result<ContentDigest> {
    let mut hasher = Sha256::new();
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(ContentDigest::from_hasher(hasher))
}

/// Hash a file on disk without loading it into memory.
pub fn sha256_file<P: AsRef<Path>>(path: P) -> io::Result<ContentDigest> {
    sha256_reader(io::BufReader::new(File::open(path)?))
}

/// Hash an in-memory buffer.
pub fn sha256_digest(data: &[u8]) -> ContentDigest {
    let mut hasher = Sha256::new();
    hasher.update(data);
    ContentDigest::from_hasher(hasher)
}
