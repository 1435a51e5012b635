//! State-Spill Writer (Component G, §4.5): persists a one-shot record of
//! scoring progress when the remote side imposes a cooldown longer than
//! the engine is willing to wait. Spill records live outside the
//! checkpoint store; resuming from one is out of scope (§9).

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::constants::SPILL_SUBDIR;
use crate::error::{Error, Result};
use crate::model::{CandidateSegment, ScoredSegment, SourceFingerprint};

/// A spill record, written verbatim to JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpillRecord {
    /// Wall-clock time the spill was written, epoch seconds.
    pub timestamp: u64,
    /// Segments already scored before the cooldown was hit.
    pub scored_segments: Vec<ScoredSegment>,
    /// The still-unscored remainder.
    pub remaining_segments: Vec<CandidateSegment>,
    /// Why the engine stopped.
    pub reason: String,
}

/// Writes spill records under `<cache_dir>/spill/`.
#[derive(Debug, Clone)]
pub struct SpillWriter {
    cache_dir: PathBuf,
}

impl SpillWriter {
    /// Create a writer rooted at `cache_dir`.
    #[must_use]
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// Write a spill record for `fingerprint`, naming the file
    /// `<fingerprint-hash>-<unix-timestamp>.json` so repeated spills for
    /// the same source never collide.
    pub fn write(
        &self,
        fingerprint: &SourceFingerprint,
        scored_segments: Vec<ScoredSegment>,
        remaining_segments: Vec<CandidateSegment>,
        reason: &str,
    ) -> Result<PathBuf> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let record = SpillRecord {
            timestamp,
            scored_segments,
            remaining_segments,
            reason: reason.to_string(),
        };

        let dir = self.cache_dir.join(SPILL_SUBDIR);
        std::fs::create_dir_all(&dir)?;

        let path = dir.join(format!("{}-{timestamp}.json", fingerprint.cache_key()));
        let json = serde_json::to_string_pretty(&record).map_err(|source| Error::JsonSerialize { source })?;
        std::fs::write(&path, json)?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn write_produces_a_file_under_spill_subdir() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SpillWriter::new(dir.path());
        let fingerprint = SourceFingerprint::from_parts(PathBuf::from("/videos/a.mp4"), 10);

        let path = writer
            .write(&fingerprint, Vec::new(), Vec::new(), "rate_limit_exceeded")
            .unwrap();

        assert!(path.starts_with(dir.path().join(SPILL_SUBDIR)));
        assert!(path.exists());

        let content = std::fs::read_to_string(&path).unwrap();
        let record: SpillRecord = serde_json::from_str(&content).unwrap();
        assert_eq!(record.reason, "rate_limit_exceeded");
    }
}
