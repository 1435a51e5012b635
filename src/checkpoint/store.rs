//! On-disk checkpoint persistence.

use std::path::{Path, PathBuf};

use crate::constants::{CHECKPOINT_FILE_EXTENSION, CHECKPOINT_SUBDIR};
use crate::error::{Error, Result};
use crate::model::{PipelineState, SourceFingerprint};

/// Persists and loads [`PipelineState`] records, one per source fingerprint,
/// under a cache root directory.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    cache_dir: PathBuf,
}

impl CheckpointStore {
    /// Create a store rooted at `cache_dir`. The directory (and its
    /// checkpoint subdirectory) are created lazily on first write.
    #[must_use]
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    fn checkpoint_path(&self, fingerprint: &SourceFingerprint) -> PathBuf {
        self.cache_dir
            .join(CHECKPOINT_SUBDIR)
            .join(format!("{}{CHECKPOINT_FILE_EXTENSION}", fingerprint.cache_key()))
    }

    /// Load the checkpoint for `fingerprint`, if one exists, parses
    /// cleanly, and still matches the current source.
    ///
    /// A missing file, a corrupt file, and a record whose stored path/byte
    /// length no longer match `fingerprint` are all treated as "no state":
    /// each case is logged at `warn` and never surfaced as an error,
    /// matching the rest of the pipeline's graceful-degrade contract. The
    /// fingerprint check is what makes stage resumption safe when the
    /// underlying file has changed since the checkpoint was written (§4.1).
    pub fn load(&self, fingerprint: &SourceFingerprint) -> Result<Option<PipelineState>> {
        let path = self.checkpoint_path(fingerprint);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)?;
        let state: PipelineState = match serde_json::from_str(&content) {
            Ok(state) => state,
            Err(source) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %source,
                    "checkpoint file is corrupt, treating source as unprocessed"
                );
                return Ok(None);
            }
        };

        if !fingerprint.matches(&state.video_path, state.source_byte_len) {
            tracing::warn!(
                path = %path.display(),
                "checkpoint record no longer matches the source, treating as unprocessed"
            );
            return Ok(None);
        }

        Ok(Some(state))
    }

    /// Persist `state` for `fingerprint`, replacing any existing checkpoint.
    ///
    /// Writes go to a sibling temp file first, then an atomic rename, so a
    /// process killed mid-write never leaves a half-written checkpoint in
    /// place of a good one.
    pub fn save(&self, fingerprint: &SourceFingerprint, state: &PipelineState) -> Result<()> {
        let path = self.checkpoint_path(fingerprint);
        let dir = path.parent().ok_or_else(|| Error::Internal {
            message: "checkpoint path has no parent directory".to_string(),
        })?;
        std::fs::create_dir_all(dir)?;

        let json = serde_json::to_string_pretty(state)
            .map_err(|source| Error::JsonSerialize { source })?;

        let tmp_path = tmp_path_for(&path);
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Remove the checkpoint for `fingerprint`, if any. Used to implement
    /// cache invalidation (`clear_cache`).
    pub fn clear(&self, fingerprint: &SourceFingerprint) -> Result<()> {
        let path = self.checkpoint_path(fingerprint);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Io(e)),
        }
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Stage;

    fn fingerprint() -> SourceFingerprint {
        SourceFingerprint::from_parts(PathBuf::from("/videos/a.mp4"), 1_234)
    }

    #[test]
    fn load_missing_checkpoint_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path());
        assert!(store.load(&fingerprint()).unwrap().is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path());
        let fp = fingerprint();
        let state = PipelineState::fresh(PathBuf::from("/videos/a.mp4"), 1_234);

        store.save(&fp, &state).unwrap();
        let loaded = store.load(&fp).unwrap().expect("checkpoint should exist");
        assert_eq!(loaded.last_stage, Stage::None);
    }

    #[test]
    fn stale_record_with_mismatched_byte_len_is_treated_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path());
        let fp = fingerprint();
        // The source file changed size since this checkpoint was written.
        let state = PipelineState::fresh(PathBuf::from("/videos/a.mp4"), 999);

        store.save(&fp, &state).unwrap();
        assert!(store.load(&fp).unwrap().is_none());
    }

    #[test]
    fn corrupt_checkpoint_is_treated_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path());
        let fp = fingerprint();

        let path = store.checkpoint_path(&fp);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"{not valid json").unwrap();

        assert!(store.load(&fp).unwrap().is_none());
    }

    #[test]
    fn clear_removes_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path());
        let fp = fingerprint();
        let state = PipelineState::fresh(PathBuf::from("/videos/a.mp4"), 1_234);

        store.save(&fp, &state).unwrap();
        store.clear(&fp).unwrap();
        assert!(store.load(&fp).unwrap().is_none());
    }

    #[test]
    fn clear_missing_checkpoint_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path());
        assert!(store.clear(&fingerprint()).is_ok());
    }
}
