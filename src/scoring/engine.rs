//! Scoring Engine (Component D, §4.4): batches pre-filtered candidates to
//! a remote (or local) scorer, with retry/backoff, a circuit breaker
//! between an optional local path and the remote path, and a hard stop
//! into the State-Spill Writer when a cooldown exceeds the configured
//! threshold.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use crate::cancellation::CancellationToken;
use crate::config::ModelConfig;
use crate::constants::MAX_NO_HINT_BACKOFF_SECS;
use crate::diagnostics::{DiagnosticsSink, Event};
use crate::model::{CandidateSegment, ScoreReport, ScoredSegment, SourceFingerprint, sort_scored_segments};

use super::client::{RemoteFailure, RemoteScorer, ScoreBatchRequest};
use super::extractor;
use super::format_batch_prompt;
use super::preflight;
use super::spill::SpillWriter;

const SYSTEM_INSTRUCTION: &str =
    "You are a short-form video clip scoring assistant. Respond with exactly one JSON object \
     and nothing else, shaped as {\"results\": [{\"id\": <int>, \"hook_score\": <0-10>, ...}]}.";

/// Circuit breaker between an optional local scorer and the remote path
/// (§4.4 Circuit breaker). Three consecutive failures or allocation
/// errors trip it; any success resets the counter.
#[derive(Debug, Default)]
struct CircuitBreaker {
    consecutive_failures: AtomicU32,
    threshold: u32,
}

impl CircuitBreaker {
    fn new(threshold: u32) -> Self {
        Self {
            consecutive_failures: AtomicU32::new(0),
            threshold,
        }
    }

    fn is_open(&self) -> bool {
        self.consecutive_failures.load(Ordering::Relaxed) >= self.threshold
    }

    fn record_success(&self) {
        self.consecutive_failures.store(0, Ordering::Relaxed);
    }

    fn record_failure(&self) {
        self.consecutive_failures.fetch_add(1, Ordering::Relaxed);
    }
}

/// The result of one [`ScoringEngine::run`] call.
#[derive(Debug)]
pub struct ScoringOutcome {
    /// Scored segments, sorted by `final_score` descending.
    pub scored_segments: Vec<ScoredSegment>,
    /// Whether the engine stopped early and spilled state because of a
    /// long rate-limit cooldown.
    pub spilled: bool,
    /// Path to the spill record, if one was written.
    pub spill_path: Option<PathBuf>,
    /// Whether the run was aborted by a cancellation request rather than
    /// running to completion.
    pub cancelled: bool,
}

/// Drives the batching/retry/circuit-breaker protocol described in §4.4.
pub struct ScoringEngine {
    config: ModelConfig,
    remote: Arc<dyn RemoteScorer>,
    primary: Option<Arc<dyn RemoteScorer>>,
    breaker: CircuitBreaker,
    spill_writer: SpillWriter,
    diagnostics: Arc<dyn DiagnosticsSink>,
    min_prompt_chars: usize,
    cancellation: CancellationToken,
}

impl ScoringEngine {
    /// Build an engine with the given remote scorer as the sole path.
    #[must_use]
    pub fn new(
        config: ModelConfig,
        remote: Arc<dyn RemoteScorer>,
        cache_dir: impl Into<PathBuf>,
        diagnostics: Arc<dyn DiagnosticsSink>,
        min_prompt_chars: usize,
        cancellation: CancellationToken,
    ) -> Self {
        let threshold = config.circuit_breaker_threshold;
        Self {
            config,
            remote,
            primary: None,
            breaker: CircuitBreaker::new(threshold),
            spill_writer: SpillWriter::new(cache_dir),
            diagnostics,
            min_prompt_chars,
            cancellation,
        }
    }

    /// Configure an optional on-device primary path, tried before the
    /// remote path while the circuit breaker is closed.
    #[must_use]
    pub fn with_primary(mut self, primary: Arc<dyn RemoteScorer>) -> Self {
        self.primary = Some(primary);
        self
    }

    /// Score `candidates` against `prompt_template`, returning scored
    /// segments sorted by `final_score` descending.
    ///
    /// Runs the heuristic pre-filter internally (§4.4 step 1), then the
    /// pre-flight validator (§4.8); a pre-flight rejection yields an
    /// all-fallback result rather than an error, per §4.8.
    pub async fn run(
        &self,
        candidates: &[CandidateSegment],
        prompt_template: &str,
        fingerprint: &SourceFingerprint,
    ) -> ScoringOutcome {
        let shortlisted = crate::prefilter::select_top(candidates, self.config.pre_filter_count);

        if let Err(error) = preflight::validate(prompt_template, &self.config.credential, self.min_prompt_chars) {
            self.diagnostics.report(Event::Warning {
                message: format!("pre-flight validation failed: {error}"),
            });
            let scored = shortlisted
                .into_iter()
                .map(|candidate| fallback_segment(candidate, "invalid prompt"))
                .collect();
            return ScoringOutcome {
                scored_segments: scored,
                spilled: false,
                spill_path: None,
                cancelled: false,
            };
        }

        let ids_and_candidates: Vec<(u64, &CandidateSegment)> =
            shortlisted.iter().enumerate().map(|(i, c)| (i as u64, c)).collect();
        let batches: Vec<&[(u64, &CandidateSegment)]> = ids_and_candidates.chunks(self.config.batch_size).collect();

        let mut scored = Vec::with_capacity(shortlisted.len());
        let mut spilled = false;
        let mut spill_path = None;
        let mut cancelled = false;

        for (batch_index, batch) in batches.iter().enumerate() {
            if self.cancellation.is_cancelled() {
                cancelled = true;
                break;
            }

            if batch_index > 0 {
                self.cancellation
                    .sleep(Duration::from_secs_f64(self.config.inter_request_delay_secs))
                    .await;
                if self.cancellation.is_cancelled() {
                    cancelled = true;
                    break;
                }
            }

            match self.send_batch_with_retry(batch, prompt_template).await {
                BatchOutcome::Scored(mut reports) => {
                    scored.append(&mut reports);
                    self.diagnostics.report(Event::BatchProgress {
                        completed_batches: batch_index + 1,
                        total_batches: batches.len(),
                    });
                }
                BatchOutcome::Exhausted => {
                    self.diagnostics.report(Event::Warning {
                        message: format!("batch {batch_index} failed after exhausting retries"),
                    });
                    scored.extend(
                        batch
                            .iter()
                            .map(|(_, c)| fallback_segment((*c).clone(), "remote scoring failed")),
                    );
                }
                BatchOutcome::Spill => {
                    let remaining: Vec<CandidateSegment> = batches[batch_index..]
                        .iter()
                        .flat_map(|b| b.iter().map(|(_, c)| (*c).clone()))
                        .collect();

                    match self.spill_writer.write(
                        fingerprint,
                        scored.clone(),
                        remaining,
                        crate::constants::SPILL_REASON_RATE_LIMIT,
                    ) {
                        Ok(path) => spill_path = Some(path),
                        Err(error) => {
                            self.diagnostics.report(Event::Error {
                                message: format!("failed to write spill record: {error}"),
                            });
                        }
                    }
                    spilled = true;
                    break;
                }
                BatchOutcome::Cancelled => {
                    cancelled = true;
                    break;
                }
            }
        }

        sort_scored_segments(&mut scored);
        ScoringOutcome {
            scored_segments: scored,
            spilled,
            spill_path,
            cancelled,
        }
    }

    async fn send_batch_with_retry(
        &self,
        batch: &[(u64, &CandidateSegment)],
        prompt_template: &str,
    ) -> BatchOutcome {
        let mut attempt = 0u32;

        loop {
            if self.cancellation.is_cancelled() {
                return BatchOutcome::Cancelled;
            }

            let scorer = self.select_scorer();
            let request = ScoreBatchRequest {
                system_instruction: SYSTEM_INSTRUCTION.to_string(),
                user_payload: format_batch_prompt(prompt_template, batch),
                model_name: self.config.model_name.clone(),
                temperature: self.config.temperature,
            };

            match scorer.score_batch(request).await {
                Ok(response) => {
                    self.breaker.record_success();
                    tracing::info!(
                        batch_size = batch.len(),
                        token_usage = ?response.token_usage,
                        "scoring batch completed"
                    );
                    return BatchOutcome::Scored(parse_batch_response(&response.raw_text, batch));
                }
                Err(RemoteFailure::Allocation { message }) => {
                    tracing::warn!(message = %message, "local scorer allocation failure");
                    self.breaker.record_failure();
                    if attempt >= self.config.max_retries {
                        return BatchOutcome::Exhausted;
                    }
                    attempt += 1;
                }
                Err(RemoteFailure::Fatal { message }) => {
                    tracing::warn!(message = %message, "non-retryable scoring failure");
                    return BatchOutcome::Exhausted;
                }
                Err(RemoteFailure::Transient { message, retry_after }) => {
                    tracing::warn!(message = %message, retry_after = ?retry_after, "transient scoring failure");
                    self.breaker.record_failure();

                    if let Some(seconds) = retry_after {
                        if seconds > self.config.max_cooldown_threshold_secs {
                            return BatchOutcome::Spill;
                        }
                        let jitter = jitter_secs(1.0, 5.0);
                        self.cancellation.sleep(Duration::from_secs_f64(seconds as f64 + jitter)).await;
                    } else {
                        let backoff = (2f64.powi(attempt as i32) + jitter_secs(0.0, 1.0)).min(MAX_NO_HINT_BACKOFF_SECS);
                        self.cancellation.sleep(Duration::from_secs_f64(backoff)).await;
                    }

                    if self.cancellation.is_cancelled() {
                        return BatchOutcome::Cancelled;
                    }
                    if attempt >= self.config.max_retries {
                        return BatchOutcome::Exhausted;
                    }
                    attempt += 1;
                }
            }
        }
    }

    fn select_scorer(&self) -> &Arc<dyn RemoteScorer> {
        match &self.primary {
            Some(primary) if !self.breaker.is_open() => primary,
            _ => &self.remote,
        }
    }
}

enum BatchOutcome {
    Scored(Vec<ScoredSegment>),
    Exhausted,
    Spill,
    Cancelled,
}

fn jitter_secs(min: f64, max: f64) -> f64 {
    rand::thread_rng().gen_range(min..=max)
}

/// Parse a raw response into one [`ScoredSegment`] per candidate in
/// `batch`, matching by `id` and falling back to positional matching,
/// then to a fallback report for any candidate with no corresponding
/// result at all (§4.4 step 6).
fn parse_batch_response(raw_text: &str, batch: &[(u64, &CandidateSegment)]) -> Vec<ScoredSegment> {
    let Some(document) = extractor::extract_first_json_object(raw_text) else {
        return batch
            .iter()
            .map(|(_, c)| fallback_segment((*c).clone(), "AI analysis failed"))
            .collect();
    };

    let results = extractor::extract_results(&document);

    batch
        .iter()
        .enumerate()
        .map(|(position, (id, candidate))| {
            let matched = results
                .iter()
                .find(|(result_id, _)| *result_id == Some(*id as i64))
                .or_else(|| results.get(position))
                .map(|(_, object)| object);

            match matched {
                Some(object) => ScoredSegment {
                    candidate: (*candidate).clone(),
                    score: extractor::score_report_from_object(object),
                },
                None => fallback_segment((*candidate).clone(), "AI analysis failed"),
            }
        })
        .collect()
}

fn fallback_segment(candidate: CandidateSegment, reason: &str) -> ScoredSegment {
    ScoredSegment {
        candidate,
        score: ScoreReport::fallback(reason),
    }
}
