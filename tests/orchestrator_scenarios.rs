//! End-to-end scenarios driving `Orchestrator::run` against fake
//! collaborators, covering the seed scenarios.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use clipforge_core::config::PipelineConfig;
use clipforge_core::diagnostics::TracingSink;
use clipforge_core::external::{AudioExtractor, ExternalError, Transcriber};
use clipforge_core::model::{Transcript, TranscriptSegment};
use clipforge_core::scoring::client::{RemoteFailure, RemoteScorer, ScoreBatchRequest, ScoreBatchResponse};
use clipforge_core::{CancellationToken, Orchestrator};

struct WritesAudioFile;

#[async_trait]
impl AudioExtractor for WritesAudioFile {
    async fn extract(&self, _source: &Path, destination: &Path) -> Result<(), ExternalError> {
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(destination, b"fake pcm data")?;
        Ok(())
    }
}

fn sample_transcript() -> Transcript {
    Transcript::new(vec![
        TranscriptSegment {
            start: 0.0,
            end: 12.0,
            text: "This is the first sentence of the clip.".to_string(),
            words: None,
        },
        TranscriptSegment {
            start: 12.0,
            end: 28.0,
            text: "Here is a second sentence that keeps talking.".to_string(),
            words: None,
        },
    ])
}

struct FixedTranscriber {
    transcript: Transcript,
    call_count: Mutex<u32>,
}

impl FixedTranscriber {
    fn new(transcript: Transcript) -> Self {
        Self {
            transcript,
            call_count: Mutex::new(0),
        }
    }
}

#[async_trait]
impl Transcriber for FixedTranscriber {
    async fn transcribe(&self, _audio_path: &Path) -> Result<Transcript, ExternalError> {
        *self.call_count.lock().unwrap() += 1;
        Ok(self.transcript.clone())
    }
}

struct ScriptedScorer {
    responses: Mutex<VecDeque<Result<&'static str, RemoteFailure>>>,
    call_count: std::sync::atomic::AtomicU32,
}

impl ScriptedScorer {
    fn new(responses: Vec<Result<&'static str, RemoteFailure>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            call_count: std::sync::atomic::AtomicU32::new(0),
        })
    }
}

#[async_trait]
impl RemoteScorer for ScriptedScorer {
    async fn score_batch(&self, _request: ScoreBatchRequest) -> Result<ScoreBatchResponse, RemoteFailure> {
        self.call_count.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(ScoreBatchResponse {
                raw_text: text.to_string(),
                token_usage: None,
            }),
            Some(Err(failure)) => Err(failure),
            None => Err(RemoteFailure::Fatal {
                message: "no more scripted responses".to_string(),
            }),
        }
    }
}

fn make_source_file(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"not real video bytes").unwrap();
    path
}

fn base_config(prompt: &str) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.prompt_template = prompt.to_string();
    config.model.credential = "a-credential".to_string();
    config.model.model_name = "test-model".to_string();
    config.model.inter_request_delay_secs = 0.0;
    config.model.max_retries = 1;
    config
}

#[tokio::test]
async fn cache_hit_skips_remote_calls_and_reuses_scored_segments() {
    let cache_dir = tempfile::tempdir().unwrap();
    let source_dir = tempfile::tempdir().unwrap();
    let source_path = make_source_file(source_dir.path(), "video.mp4");

    let config = base_config("Score these short-form clip candidates for viral appeal.");
    let orchestrator = Orchestrator::new(cache_dir.path(), Arc::new(TracingSink));

    let scorer = ScriptedScorer::new(vec![Ok(
        r#"{"results": [{"id": 0, "hook_score": 9.0, "final_score": 88.0, "verdict": "viral"}]}"#,
    )]);
    let first = orchestrator
        .run(
            &source_path,
            &config,
            &WritesAudioFile,
            &FixedTranscriber::new(sample_transcript()),
            scorer,
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    assert!(!first.scored_segments.is_empty());

    // A second run gets a scorer with zero scripted responses: if it were
    // called at all, the run would fail. Cache hits on every stage mean it
    // never is, and the scored segments come back identical.
    let empty_scorer = ScriptedScorer::new(vec![]);
    let second = orchestrator
        .run(
            &source_path,
            &config,
            &WritesAudioFile,
            &FixedTranscriber::new(sample_transcript()),
            empty_scorer,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(first.scored_segments, second.scored_segments);
    assert!(!second.stats.spilled);
}

#[tokio::test]
async fn missing_transcript_file_triggers_retranscription() {
    let cache_dir = tempfile::tempdir().unwrap();
    let source_dir = tempfile::tempdir().unwrap();
    let source_path = make_source_file(source_dir.path(), "video.mp4");

    let config = base_config("Score these short-form clip candidates for viral appeal.");
    let orchestrator = Orchestrator::new(cache_dir.path(), Arc::new(TracingSink));

    let transcriber = Arc::new(FixedTranscriber::new(sample_transcript()));
    let scorer = ScriptedScorer::new(vec![Ok(
        r#"{"results": [{"id": 0, "hook_score": 9.0, "final_score": 88.0, "verdict": "viral"}]}"#,
    )]);
    orchestrator
        .run(
            &source_path,
            &config,
            &WritesAudioFile,
            transcriber.as_ref(),
            scorer,
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    assert_eq!(*transcriber.call_count.lock().unwrap(), 1);

    // Corrupt the cached transcript artifact so it fails to parse.
    let transcript_dir = cache_dir.path().join("transcripts");
    let mut entries = std::fs::read_dir(&transcript_dir).unwrap();
    let transcript_file = entries.next().unwrap().unwrap().path();
    std::fs::write(&transcript_file, b"not json").unwrap();

    let scorer = ScriptedScorer::new(vec![Ok(
        r#"{"results": [{"id": 0, "hook_score": 9.0, "final_score": 88.0, "verdict": "viral"}]}"#,
    )]);
    orchestrator
        .run(
            &source_path,
            &config,
            &WritesAudioFile,
            transcriber.as_ref(),
            Arc::clone(&scorer),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(*transcriber.call_count.lock().unwrap(), 2);
    // The corrupted transcript forces re-transcription, which must
    // transitively invalidate segmentation and scoring too; if the stale
    // `ai_scoring` payload were still being served, the scorer would never
    // have been called on this second run.
    assert_eq!(scorer.call_count.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn long_cooldown_rate_limit_spills_and_returns_partial_results() {
    let cache_dir = tempfile::tempdir().unwrap();
    let source_dir = tempfile::tempdir().unwrap();
    let source_path = make_source_file(source_dir.path(), "video.mp4");

    let mut config = base_config("Score these short-form clip candidates for viral appeal.");
    config.model.batch_size = 1;
    config.model.max_cooldown_threshold_secs = 60;

    let orchestrator = Orchestrator::new(cache_dir.path(), Arc::new(TracingSink));
    let scorer = ScriptedScorer::new(vec![
        Ok(r#"{"results": [{"id": 0, "hook_score": 9.0, "final_score": 88.0, "verdict": "viral"}]}"#),
        Err(RemoteFailure::Transient {
            message: "rate limited".to_string(),
            retry_after: Some(3600),
        }),
    ]);

    let output = orchestrator
        .run(
            &source_path,
            &config,
            &WritesAudioFile,
            &FixedTranscriber::new(sample_transcript()),
            scorer,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert!(output.stats.spilled);
    assert!(!output.scored_segments.is_empty());

    let spill_dir = cache_dir.path().join("spill");
    let spill_files: Vec<_> = std::fs::read_dir(&spill_dir).unwrap().collect();
    assert_eq!(spill_files.len(), 1);

    // A spilled run writes no scoring checkpoint, so a later run with a
    // quiet scorer re-attempts scoring from scratch rather than reusing it.
    let checkpoint_dir = cache_dir.path().join("checkpoints");
    let checkpoint_path = std::fs::read_dir(&checkpoint_dir).unwrap().next().unwrap().unwrap().path();
    let content = std::fs::read_to_string(checkpoint_path).unwrap();
    assert!(!content.contains("\"scoring\""));
}

#[tokio::test]
async fn malformed_json_response_yields_skip_verdict_fallback() {
    let cache_dir = tempfile::tempdir().unwrap();
    let source_dir = tempfile::tempdir().unwrap();
    let source_path = make_source_file(source_dir.path(), "video.mp4");

    let config = base_config("Score these short-form clip candidates for viral appeal.");
    let orchestrator = Orchestrator::new(cache_dir.path(), Arc::new(TracingSink));

    let scorer = ScriptedScorer::new(vec![Ok(
        "```json\n{ \"results\": [ { \"id\": 0, \"hook_score\": 7.0,",
    )]);

    let output = orchestrator
        .run(
            &source_path,
            &config,
            &WritesAudioFile,
            &FixedTranscriber::new(sample_transcript()),
            scorer,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert!(!output.scored_segments.is_empty());
    for segment in &output.scored_segments {
        assert_eq!(segment.score.verdict, clipforge_core::model::Verdict::Skip);
    }
}

#[tokio::test]
async fn empty_prompt_yields_fallback_without_remote_call() {
    let cache_dir = tempfile::tempdir().unwrap();
    let source_dir = tempfile::tempdir().unwrap();
    let source_path = make_source_file(source_dir.path(), "video.mp4");

    let config = base_config("   \n\t  ");
    let orchestrator = Orchestrator::new(cache_dir.path(), Arc::new(TracingSink));

    // No scripted responses at all: any remote call would fail the run.
    let scorer = ScriptedScorer::new(vec![]);
    let output = orchestrator
        .run(
            &source_path,
            &config,
            &WritesAudioFile,
            &FixedTranscriber::new(sample_transcript()),
            scorer,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert!(!output.scored_segments.is_empty());
    for segment in &output.scored_segments {
        assert_eq!(segment.score.verdict, clipforge_core::model::Verdict::Skip);
    }
}

#[tokio::test]
async fn pre_cancelled_token_aborts_scoring_without_writing_a_checkpoint() {
    let cache_dir = tempfile::tempdir().unwrap();
    let source_dir = tempfile::tempdir().unwrap();
    let source_path = make_source_file(source_dir.path(), "video.mp4");

    let config = base_config("Score these short-form clip candidates for viral appeal.");
    let orchestrator = Orchestrator::new(cache_dir.path(), Arc::new(TracingSink));

    // Scripted with a response that would otherwise succeed, proving the
    // abort happens before any batch is actually dispatched.
    let scorer = ScriptedScorer::new(vec![Ok(
        r#"{"results": [{"id": 0, "hook_score": 9.0, "final_score": 88.0, "verdict": "viral"}]}"#,
    )]);
    let cancellation = CancellationToken::new();
    cancellation.cancel();

    let result = orchestrator
        .run(
            &source_path,
            &config,
            &WritesAudioFile,
            &FixedTranscriber::new(sample_transcript()),
            scorer,
            &cancellation,
        )
        .await;

    assert!(matches!(result, Err(clipforge_core::Error::Cancelled)));

    let checkpoint_dir = cache_dir.path().join("checkpoints");
    let checkpoint_path = std::fs::read_dir(&checkpoint_dir).unwrap().next().unwrap().unwrap().path();
    let content = std::fs::read_to_string(checkpoint_path).unwrap();
    assert!(!content.contains("\"scoring\""));
}
