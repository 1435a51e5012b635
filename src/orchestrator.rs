//! Orchestrator (Component F, §4.7): drives the pipeline stages in order,
//! consulting the Checkpoint Store at each boundary so a resumed run
//! skips whatever already completed.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cancellation::CancellationToken;
use crate::checkpoint::CheckpointStore;
use crate::config::PipelineConfig;
use crate::diagnostics::{DiagnosticsSink, Event};
use crate::error::{Error, Result};
use crate::external::{AudioExtractor, Transcriber};
use crate::model::{
    AiScoringPayload, AudioExtractionPayload, PipelineState, ScoredSegment, SegmentationPayload, Source,
    SourceFingerprint, Stage, Transcript, TranscriptionPayload, Verdict,
};
use crate::scoring::client::RemoteScorer;
use crate::scoring::ScoringEngine;
use crate::{segmentation, validator};

/// Everything the orchestrator produces from one `run` call (§6's
/// `run(source, config) -> {scored_segments, validated_clips, stats}`).
#[derive(Debug)]
pub struct PipelineOutput {
    /// All scored segments, sorted by `final_score` descending.
    pub scored_segments: Vec<ScoredSegment>,
    /// The subset surviving overlap removal and semantic dedup.
    pub validated_clips: Vec<ScoredSegment>,
    /// Run statistics.
    pub stats: PipelineStats,
}

/// Counters describing one `run` call, useful for logging/telemetry at
/// the caller's boundary.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineStats {
    /// Candidates produced by the Segment Builder.
    pub candidate_count: usize,
    /// Segments actually scored (after pre-filtering).
    pub scored_count: usize,
    /// Clips surviving validation.
    pub validated_count: usize,
    /// Whether the scoring engine stopped early and spilled state.
    pub spilled: bool,
}

/// Drives stages A→B→D→E (audio and transcription are external
/// collaborators, supplied per call) in order, per §4.7.
pub struct Orchestrator {
    cache_dir: PathBuf,
    checkpoint_store: CheckpointStore,
    diagnostics: Arc<dyn DiagnosticsSink>,
}

impl Orchestrator {
    /// Build an orchestrator rooted at `cache_dir`, where checkpoints,
    /// extracted audio, transcripts, and spill records all live.
    #[must_use]
    pub fn new(cache_dir: impl Into<PathBuf>, diagnostics: Arc<dyn DiagnosticsSink>) -> Self {
        let cache_dir = cache_dir.into();
        Self {
            checkpoint_store: CheckpointStore::new(cache_dir.clone()),
            cache_dir,
            diagnostics,
        }
    }

    /// Run the full pipeline for `source_path`, resuming from whatever
    /// checkpoint already exists.
    pub async fn run(
        &self,
        source_path: &Path,
        config: &PipelineConfig,
        audio_extractor: &dyn AudioExtractor,
        transcriber: &dyn Transcriber,
        remote_scorer: Arc<dyn RemoteScorer>,
        cancellation: &CancellationToken,
    ) -> Result<PipelineOutput> {
        let source = Source::new(source_path)?;
        let fingerprint = source.fingerprint()?;

        let mut state = self
            .checkpoint_store
            .load(&fingerprint)?
            .unwrap_or_else(|| PipelineState::fresh(source.path().to_path_buf(), fingerprint.byte_len()));

        self.run_audio_stage(&source, &fingerprint, &mut state, audio_extractor).await?;
        let transcript = self.run_transcription_stage(&fingerprint, &mut state, transcriber).await?;
        let candidates = self.run_segmentation_stage(&fingerprint, &mut state, &transcript, config)?;
        let (scored_segments, spilled) = self
            .run_scoring_stage(&fingerprint, &mut state, &candidates, config, remote_scorer, cancellation)
            .await?;

        let validated_clips = validator::validate(&scored_segments, config.validator.jaccard_threshold);

        let stats = PipelineStats {
            candidate_count: candidates.len(),
            scored_count: scored_segments.len(),
            validated_count: validated_clips.len(),
            spilled,
        };

        Ok(PipelineOutput {
            scored_segments,
            validated_clips,
            stats,
        })
    }

    /// Invalidate and remove any cached state for `source_path`.
    pub fn clear_cache(&self, source_path: &Path) -> Result<()> {
        let source = Source::new(source_path)?;
        let fingerprint = source.fingerprint()?;
        self.checkpoint_store.clear(&fingerprint)
    }

    async fn run_audio_stage(
        &self,
        source: &Source,
        fingerprint: &SourceFingerprint,
        state: &mut PipelineState,
        audio_extractor: &dyn AudioExtractor,
    ) -> Result<PathBuf> {
        if state.has_completed_stage(Stage::Audio) {
            if let Some(payload) = &state.audio_extraction {
                return Ok(payload.audio_path.clone());
            }
        }

        self.diagnostics.report(Event::StageStarted { stage: Stage::Audio });
        let audio_path = self.cache_dir.join("audio").join(format!("{}.wav", fingerprint.cache_key()));
        if let Some(parent) = audio_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        audio_extractor
            .extract(source.path(), &audio_path)
            .await
            .map_err(|source_error| Error::AudioExtraction {
                path: source.path().to_path_buf(),
                source: source_error,
            })?;

        state.invalidate_downstream_of(Stage::Audio);
        state.audio_extraction = Some(AudioExtractionPayload {
            completed: true,
            audio_path: audio_path.clone(),
        });
        state.last_stage = Stage::Audio;
        self.save_checkpoint(fingerprint, state)?;
        self.diagnostics.report(Event::StageCompleted { stage: Stage::Audio });

        Ok(audio_path)
    }

    async fn run_transcription_stage(
        &self,
        fingerprint: &SourceFingerprint,
        state: &mut PipelineState,
        transcriber: &dyn Transcriber,
    ) -> Result<Transcript> {
        if state.has_completed_stage(Stage::Transcript) {
            if let Some(payload) = &state.transcription {
                if let Some(transcript) = self.load_transcript(&payload.transcript_path) {
                    return Ok(transcript);
                }
                tracing::warn!(
                    path = %payload.transcript_path.display(),
                    "cached transcript file is corrupt, re-transcribing"
                );
            }
        }

        self.diagnostics.report(Event::StageStarted {
            stage: Stage::Transcript,
        });
        let audio_path = state
            .audio_extraction
            .as_ref()
            .map(|p| p.audio_path.clone())
            .ok_or_else(|| Error::Internal {
                message: "transcription stage reached without an audio artifact".to_string(),
            })?;

        let transcript = transcriber
            .transcribe(&audio_path)
            .await
            .map_err(|source_error| Error::Transcription {
                path: audio_path.clone(),
                source: source_error,
            })?;

        let transcript_path = self
            .cache_dir
            .join("transcripts")
            .join(format!("{}.json", fingerprint.cache_key()));
        if let Some(parent) = transcript_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&transcript).map_err(|source| Error::JsonSerialize { source })?;
        std::fs::write(&transcript_path, json)?;

        state.invalidate_downstream_of(Stage::Transcript);
        state.transcription = Some(TranscriptionPayload {
            completed: true,
            transcript_path,
            segment_count: transcript.len(),
        });
        state.last_stage = Stage::Transcript;
        self.save_checkpoint(fingerprint, state)?;
        self.diagnostics.report(Event::StageCompleted {
            stage: Stage::Transcript,
        });

        Ok(transcript)
    }

    fn load_transcript(&self, path: &Path) -> Option<Transcript> {
        let content = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str(&content) {
            Ok(transcript) => Some(transcript),
            Err(source) => {
                let error = Error::JsonParse {
                    path: path.to_path_buf(),
                    source,
                };
                tracing::warn!(error = %error, "cached transcript file failed to parse");
                None
            }
        }
    }

    fn run_segmentation_stage(
        &self,
        fingerprint: &SourceFingerprint,
        state: &mut PipelineState,
        transcript: &Transcript,
        config: &PipelineConfig,
    ) -> Result<Vec<crate::model::CandidateSegment>> {
        if state.has_completed_stage(Stage::Segmentation) {
            if let Some(payload) = &state.segmentation {
                return Ok(payload.candidates.clone());
            }
        }

        self.diagnostics.report(Event::StageStarted {
            stage: Stage::Segmentation,
        });
        let candidates = segmentation::build_candidates(
            transcript,
            config.segmentation.min_duration_secs,
            config.segmentation.max_duration_secs,
            config.segmentation.pause_threshold_secs,
        );

        let sentence_count = candidates
            .iter()
            .filter(|c| c.kind == crate::model::SegmentKind::SentenceWindow)
            .count();
        let pause_count = candidates.len() - sentence_count;

        state.invalidate_downstream_of(Stage::Segmentation);
        state.segmentation = Some(SegmentationPayload {
            completed: true,
            candidates: candidates.clone(),
            sentence_count,
            pause_count,
        });
        state.last_stage = Stage::Segmentation;
        self.save_checkpoint(fingerprint, state)?;
        self.diagnostics.report(Event::StageCompleted {
            stage: Stage::Segmentation,
        });

        Ok(candidates)
    }

    async fn run_scoring_stage(
        &self,
        fingerprint: &SourceFingerprint,
        state: &mut PipelineState,
        candidates: &[crate::model::CandidateSegment],
        config: &PipelineConfig,
        remote_scorer: Arc<dyn RemoteScorer>,
        cancellation: &CancellationToken,
    ) -> Result<(Vec<ScoredSegment>, bool)> {
        if state.has_completed_stage(Stage::Scoring) {
            if let Some(payload) = &state.ai_scoring {
                return Ok((payload.scored_segments.clone(), false));
            }
        }

        self.diagnostics.report(Event::StageStarted { stage: Stage::Scoring });
        let engine = ScoringEngine::new(
            config.model.clone(),
            remote_scorer,
            self.cache_dir.clone(),
            Arc::clone(&self.diagnostics),
            config.preflight.min_prompt_chars,
            cancellation.clone(),
        );
        let outcome = engine.run(candidates, &config.prompt_template, fingerprint).await;

        if outcome.cancelled {
            // A cancellation mid-request must at minimum refuse to write a
            // checkpoint for this stage; the next run starts scoring over.
            return Err(Error::Cancelled);
        }

        let high_quality_count = outcome
            .scored_segments
            .iter()
            .filter(|s| s.score.verdict != Verdict::Skip)
            .count();

        // A spilled run has no complete scoring payload to cache; the next
        // invocation will re-run scoring from the same segmentation stage.
        if !outcome.spilled {
            state.ai_scoring = Some(AiScoringPayload {
                completed: true,
                scored_segments: outcome.scored_segments.clone(),
                high_quality_count,
            });
            state.last_stage = Stage::Scoring;
            self.save_checkpoint(fingerprint, state)?;
        }

        self.diagnostics.report(Event::StageCompleted { stage: Stage::Scoring });
        Ok((outcome.scored_segments, outcome.spilled))
    }

    fn save_checkpoint(&self, fingerprint: &SourceFingerprint, state: &mut PipelineState) -> Result<()> {
        state.last_updated = chrono::Utc::now();
        self.checkpoint_store.save(fingerprint, state)
    }
}
