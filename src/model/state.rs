//! Pipeline state data model (§3, checkpoint JSON schema in §6).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::segment::CandidateSegment;
use super::score::ScoredSegment;

/// The last pipeline stage that completed successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// No stage has completed yet.
    None,
    /// Audio extraction completed.
    Audio,
    /// Transcription completed.
    Transcript,
    /// Segmentation completed.
    Segmentation,
    /// Scoring completed.
    Scoring,
}

/// Audio extraction stage payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioExtractionPayload {
    /// Whether this stage completed.
    pub completed: bool,
    /// Path to the extracted audio artifact.
    pub audio_path: PathBuf,
}

/// Transcription stage payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionPayload {
    /// Whether this stage completed.
    pub completed: bool,
    /// Path to the transcript artifact.
    pub transcript_path: PathBuf,
    /// Number of transcript segments.
    pub segment_count: usize,
}

/// Segmentation stage payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationPayload {
    /// Whether this stage completed.
    pub completed: bool,
    /// The full candidate list (persisted inline per §3).
    pub candidates: Vec<CandidateSegment>,
    /// Count of candidates from the sentence-window strategy.
    pub sentence_count: usize,
    /// Count of candidates from the pause-window strategy.
    pub pause_count: usize,
}

/// Scoring stage payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiScoringPayload {
    /// Whether this stage completed.
    pub completed: bool,
    /// The full scored-segment list (persisted inline per §3).
    pub scored_segments: Vec<ScoredSegment>,
    /// Count of segments with verdict `viral` or `maybe`.
    pub high_quality_count: usize,
}

/// Per-source, versioned pipeline state, as persisted by the Checkpoint
/// Store (§4.1) and described by the schema in §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineState {
    /// The last stage that completed.
    pub last_stage: Stage,
    /// Timestamp of the last update, UTC.
    pub last_updated: DateTime<Utc>,
    /// Absolute path of the source video.
    pub video_path: PathBuf,
    /// Byte length of the source video at the time this state was written,
    /// used by the Checkpoint Store to validate a loaded record still
    /// matches the current source (§4.1).
    pub source_byte_len: u64,
    /// Audio extraction payload, if that stage has run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_extraction: Option<AudioExtractionPayload>,
    /// Transcription payload, if that stage has run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcription: Option<TranscriptionPayload>,
    /// Segmentation payload, if that stage has run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segmentation: Option<SegmentationPayload>,
    /// Scoring payload, if that stage has run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_scoring: Option<AiScoringPayload>,
}

impl PipelineState {
    /// A fresh state for a source that has not been processed yet.
    #[must_use]
    pub fn fresh(video_path: PathBuf, source_byte_len: u64) -> Self {
        Self {
            last_stage: Stage::None,
            last_updated: Utc::now(),
            video_path,
            source_byte_len,
            audio_extraction: None,
            transcription: None,
            segmentation: None,
            ai_scoring: None,
        }
    }

    /// Clear every payload downstream of `stage`, called whenever `stage`
    /// actually (re-)executes rather than being served from cache. Without
    /// this, a later stage's own `completed` flag stays set after an
    /// earlier stage reruns, so it would keep serving a payload computed
    /// from data that no longer exists (§4.1: invalidation is transitive).
    pub fn invalidate_downstream_of(&mut self, stage: Stage) {
        match stage {
            Stage::None => {}
            Stage::Audio => {
                self.transcription = None;
                self.segmentation = None;
                self.ai_scoring = None;
            }
            Stage::Transcript => {
                self.segmentation = None;
                self.ai_scoring = None;
            }
            Stage::Segmentation => {
                self.ai_scoring = None;
            }
            Stage::Scoring => {}
        }
    }

    /// Whether a given stage's payload is present *and* every file artifact
    /// it references still exists on disk (§4.1).
    #[must_use]
    pub fn has_completed_stage(&self, stage: Stage) -> bool {
        match stage {
            Stage::None => true,
            Stage::Audio => self
                .audio_extraction
                .as_ref()
                .is_some_and(|p| p.completed && p.audio_path.exists()),
            Stage::Transcript => self
                .transcription
                .as_ref()
                .is_some_and(|p| p.completed && p.transcript_path.exists()),
            Stage::Segmentation => self
                .segmentation
                .as_ref()
                .is_some_and(|p| p.completed),
            Stage::Scoring => self.ai_scoring.as_ref().is_some_and(|p| p.completed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_has_no_completed_stages() {
        let state = PipelineState::fresh(PathBuf::from("/tmp/video.mp4"), 100);
        assert_eq!(state.last_stage, Stage::None);
        assert!(!state.has_completed_stage(Stage::Audio));
    }

    #[test]
    fn missing_referenced_file_invalidates_stage() {
        let mut state = PipelineState::fresh(PathBuf::from("/tmp/video.mp4"), 100);
        state.audio_extraction = Some(AudioExtractionPayload {
            completed: true,
            audio_path: PathBuf::from("/nonexistent/audio.wav"),
        });
        assert!(!state.has_completed_stage(Stage::Audio));
    }

    #[test]
    fn existing_referenced_file_validates_stage() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut state = PipelineState::fresh(PathBuf::from("/tmp/video.mp4"), 100);
        state.audio_extraction = Some(AudioExtractionPayload {
            completed: true,
            audio_path: file.path().to_path_buf(),
        });
        assert!(state.has_completed_stage(Stage::Audio));
    }

    #[test]
    fn re_running_a_stage_invalidates_everything_downstream() {
        let mut state = PipelineState::fresh(PathBuf::from("/tmp/video.mp4"), 100);
        state.transcription = Some(TranscriptionPayload {
            completed: true,
            transcript_path: PathBuf::from("/tmp/t.json"),
            segment_count: 2,
        });
        state.segmentation = Some(SegmentationPayload {
            completed: true,
            candidates: Vec::new(),
            sentence_count: 0,
            pause_count: 0,
        });
        state.ai_scoring = Some(AiScoringPayload {
            completed: true,
            scored_segments: Vec::new(),
            high_quality_count: 0,
        });

        state.invalidate_downstream_of(Stage::Transcript);

        assert!(state.transcription.is_some());
        assert!(state.segmentation.is_none());
        assert!(state.ai_scoring.is_none());
    }
}
