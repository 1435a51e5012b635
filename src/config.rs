//! Tunable configuration types for the core pipeline.
//!
//! These are plain data types, not a configuration *loader*: parsing a
//! config file and wiring CLI flags is the external driver's job (out of
//! scope per spec.md §1). Every field has a spec-documented default.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_CIRCUIT_BREAKER_THRESHOLD, DEFAULT_INTER_REQUEST_DELAY_SECS,
    DEFAULT_JACCARD_THRESHOLD, DEFAULT_MAX_COOLDOWN_THRESHOLD_SECS, DEFAULT_MAX_RETRIES,
    DEFAULT_MIN_PROMPT_CHARS, DEFAULT_PAUSE_THRESHOLD_SECS, DEFAULT_PREFILTER_COUNT,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TEMPERATURE, MAX_SEGMENT_DURATION_SECS,
    MIN_SEGMENT_DURATION_SECS,
};

/// Configuration for the Segment Builder (§4.2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Minimum candidate duration, in seconds.
    pub min_duration_secs: f64,
    /// Maximum candidate duration, in seconds.
    pub max_duration_secs: f64,
    /// Inter-sentence gap, in seconds, above which a pause boundary is
    /// detected.
    pub pause_threshold_secs: f64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            min_duration_secs: MIN_SEGMENT_DURATION_SECS,
            max_duration_secs: MAX_SEGMENT_DURATION_SECS,
            pause_threshold_secs: DEFAULT_PAUSE_THRESHOLD_SECS,
        }
    }
}

/// Configuration for the Validator (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Jaccard similarity threshold above which two clips are duplicates
    /// (strict greater-than).
    pub jaccard_threshold: f64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            jaccard_threshold: DEFAULT_JACCARD_THRESHOLD,
        }
    }
}

/// Remote model connection details and scoring-engine tunables (§4.4
/// Inputs).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Remote scorer endpoint (opaque to the core; interpreted by the
    /// `RemoteScorer` implementation).
    pub endpoint: String,
    /// Credential for the remote scorer. Never logged or persisted.
    #[serde(skip_serializing)]
    pub credential: String,
    /// Model name/identifier to request.
    pub model_name: String,
    /// Number of candidates grouped into a single scoring request.
    pub batch_size: usize,
    /// Delay enforced between successive requests, in seconds.
    pub inter_request_delay_secs: f64,
    /// Cooldown, in seconds, above which the engine spills and stops rather
    /// than waiting.
    pub max_cooldown_threshold_secs: u64,
    /// Sampling temperature passed to the remote model.
    pub temperature: f32,
    /// Number of candidates the heuristic pre-filter keeps before batching.
    pub pre_filter_count: usize,
    /// Consecutive local-scorer failures before the circuit breaker
    /// disables the local path for the remainder of the run.
    pub circuit_breaker_threshold: u32,
    /// Maximum number of retries per batch for transient failures.
    pub max_retries: u32,
    /// Per-attempt wall-clock timeout, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            credential: String::new(),
            model_name: String::new(),
            batch_size: DEFAULT_BATCH_SIZE,
            inter_request_delay_secs: DEFAULT_INTER_REQUEST_DELAY_SECS,
            max_cooldown_threshold_secs: DEFAULT_MAX_COOLDOWN_THRESHOLD_SECS,
            temperature: DEFAULT_TEMPERATURE,
            pre_filter_count: DEFAULT_PREFILTER_COUNT,
            circuit_breaker_threshold: DEFAULT_CIRCUIT_BREAKER_THRESHOLD,
            max_retries: DEFAULT_MAX_RETRIES,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Pre-flight validation tunables (§4.8).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreflightConfig {
    /// Minimum character count for a prompt template to pass validation.
    pub min_prompt_chars: usize,
}

impl Default for PreflightConfig {
    fn default() -> Self {
        Self {
            min_prompt_chars: DEFAULT_MIN_PROMPT_CHARS,
        }
    }
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Segment Builder settings.
    pub segmentation: SegmentationConfig,
    /// Validator settings.
    pub validator: ValidatorConfig,
    /// Scoring Engine / remote model settings.
    pub model: ModelConfig,
    /// Pre-flight validation settings.
    pub preflight: PreflightConfig,
    /// The prompt template used to format each scoring batch request.
    pub prompt_template: String,
}
