//! Source media identity.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// A read-only handle to a source media file.
///
/// The core never reads the media bytes themselves (that is the job of the
/// external audio extractor, §6); it only needs the path and a cheap,
/// stable fingerprint for cache keying.
#[derive(Debug, Clone)]
pub struct Source {
    path: PathBuf,
}

impl Source {
    /// Create a source handle from a path. The path is canonicalized so
    /// that the fingerprint is stable across relative/absolute invocations.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let path = std::fs::canonicalize(&path).unwrap_or(path);
        Ok(Self { path })
    }

    /// Absolute (or best-effort canonicalized) path to the source file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Compute this source's fingerprint.
    ///
    /// Per the spec's documented Open Question (§9), the fingerprint is
    /// `(path, byte length)`: cheap, stable, and collision-prone only for
    /// two distinct files sharing both an absolute path and a byte count,
    /// which cannot occur for a single path on one filesystem at one time.
    pub fn fingerprint(&self) -> Result<SourceFingerprint> {
        let metadata = std::fs::metadata(&self.path)?;
        Ok(SourceFingerprint {
            path: self.path.clone(),
            byte_len: metadata.len(),
        })
    }
}

/// A stable, cheap-to-compute identity for a [`Source`], used to key
/// checkpoint records.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceFingerprint {
    path: PathBuf,
    byte_len: u64,
}

impl SourceFingerprint {
    /// Construct a fingerprint directly from its parts, without touching the
    /// filesystem. Used by callers that already know a path/length pair
    /// (tests, and resume paths that re-derive a fingerprint from a stored
    /// checkpoint's own record of it).
    #[must_use]
    pub fn from_parts(path: PathBuf, byte_len: u64) -> Self {
        Self { path, byte_len }
    }

    /// The fingerprinted path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The fingerprinted byte length.
    #[must_use]
    pub const fn byte_len(&self) -> u64 {
        self.byte_len
    }

    /// A filesystem-safe key derived from this fingerprint, suitable for use
    /// as a checkpoint or spill filename stem.
    #[must_use]
    pub fn cache_key(&self) -> String {
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.hash(&mut hasher);
        format!("{:016x}", hasher.finish())
    }

    /// Whether this fingerprint still matches the file on disk at `path`.
    #[must_use]
    pub fn matches(&self, path: &Path, byte_len: u64) -> bool {
        self.path == path && self.byte_len == byte_len
    }
}
