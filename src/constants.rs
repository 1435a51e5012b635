//! Crate-wide constants.
//!
//! All magic numbers and strings are defined here to ensure consistency
//! and make changes easy to track.

/// Minimum candidate segment duration, in seconds.
pub const MIN_SEGMENT_DURATION_SECS: f64 = 10.0;

/// Maximum candidate segment duration, in seconds.
pub const MAX_SEGMENT_DURATION_SECS: f64 = 75.0;

/// Default pause threshold (inter-sentence gap) used to detect pause-window
/// boundaries, in seconds.
pub const DEFAULT_PAUSE_THRESHOLD_SECS: f64 = 1.0;

/// Default Jaccard similarity threshold above which two clips are considered
/// semantic duplicates (strict greater-than, not greater-or-equal).
pub const DEFAULT_JACCARD_THRESHOLD: f64 = 0.7;

/// Default number of candidates the heuristic pre-filter keeps.
pub const DEFAULT_PREFILTER_COUNT: usize = 20;

/// Default number of candidates per scoring request batch.
pub const DEFAULT_BATCH_SIZE: usize = 6;

/// Default delay enforced between successive scoring requests, in seconds.
pub const DEFAULT_INTER_REQUEST_DELAY_SECS: f64 = 1.5;

/// Default cooldown threshold above which the engine spills state instead of
/// waiting, in seconds.
pub const DEFAULT_MAX_COOLDOWN_THRESHOLD_SECS: u64 = 60;

/// Default sampling temperature passed to the remote model.
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Default number of retries for a single batch request before giving up.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Default consecutive-failure threshold before the local scoring path's
/// circuit breaker disables it for the remainder of the run.
pub const DEFAULT_CIRCUIT_BREAKER_THRESHOLD: u32 = 3;

/// Default per-attempt wall-clock timeout for a remote call, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Default minimum character length for a prompt template to be considered
/// non-trivial during pre-flight validation.
pub const DEFAULT_MIN_PROMPT_CHARS: usize = 10;

/// Upper bound on the backoff delay computed for failures without a
/// `retry-after` hint, in seconds.
pub const MAX_NO_HINT_BACKOFF_SECS: f64 = 300.0;

/// Score report component-weighting used when the remote scorer does not
/// supply a `final_score` directly. Must sum to 1.0; see DESIGN.md for the
/// Open Question this resolves.
pub mod score_weights {
    /// Weight applied to the hook component score.
    pub const HOOK: f64 = 0.35;
    /// Weight applied to the retention component score.
    pub const RETENTION: f64 = 0.25;
    /// Weight applied to the emotion component score.
    pub const EMOTION: f64 = 0.20;
    /// Weight applied to the completion component score.
    pub const COMPLETION: f64 = 0.10;
    /// Weight applied to the platform-fit component score.
    pub const PLATFORM_FIT: f64 = 0.05;
    /// Weight applied to the relatability component score.
    pub const RELATABILITY: f64 = 0.05;
}

/// Heuristic pre-filter scoring constants (§4.3).
pub mod prefilter_scoring {
    /// Bonus for duration within the tight ideal band.
    pub const TIGHT_DURATION_BONUS: f64 = 3.0;
    /// Lower bound of the tight ideal duration band, in seconds.
    pub const TIGHT_DURATION_MIN: f64 = 20.0;
    /// Upper bound of the tight ideal duration band, in seconds.
    pub const TIGHT_DURATION_MAX: f64 = 60.0;
    /// Bonus for duration within the loose acceptable band.
    pub const LOOSE_DURATION_BONUS: f64 = 1.5;
    /// Lower bound of the loose acceptable duration band, in seconds.
    pub const LOOSE_DURATION_MIN: f64 = 15.0;
    /// Upper bound of the loose acceptable duration band, in seconds.
    pub const LOOSE_DURATION_MAX: f64 = 75.0;
    /// Per-hit weight for emotional-keyword matches.
    pub const KEYWORD_HIT_WEIGHT: f64 = 0.5;
    /// Cap on the emotional-keyword bonus.
    pub const KEYWORD_BONUS_CAP: f64 = 3.0;
    /// Weight applied to sentence density (terminators per 10s).
    pub const SENTENCE_DENSITY_WEIGHT: f64 = 0.8;
    /// Cap on the sentence-density bonus.
    pub const SENTENCE_DENSITY_CAP: f64 = 2.0;
    /// Weight applied to pause density.
    pub const PAUSE_DENSITY_WEIGHT: f64 = 2.0;
    /// Cap on the pause-density bonus.
    pub const PAUSE_DENSITY_CAP: f64 = 2.0;
}

/// Fixed lexicon of intensity/emotional keywords used by the heuristic
/// pre-filter. Lower-case, matched against whole words.
pub const EMOTIONAL_KEYWORDS: &[&str] = &[
    "never",
    "always",
    "nobody",
    "everybody",
    "shocked",
    "shocking",
    "secret",
    "truth",
    "lie",
    "lied",
    "wrong",
    "right",
    "mistake",
    "regret",
    "worst",
    "best",
    "impossible",
    "unbelievable",
    "terrified",
    "devastated",
];

/// Sentence-terminator characters used for sentence-boundary detection and
/// for the pre-filter's sentence-density feature.
pub const SENTENCE_TERMINATORS: &[char] = &['.', '!', '?'];

/// File extension used for on-disk checkpoint records.
pub const CHECKPOINT_FILE_EXTENSION: &str = ".json";

/// Subdirectory name, under the cache directory, holding checkpoint files.
pub const CHECKPOINT_SUBDIR: &str = "checkpoints";

/// Subdirectory name, under the cache directory, holding spill records.
pub const SPILL_SUBDIR: &str = "spill";

/// Reason code written into a spill record when the remote rate limit
/// exceeds the configured cooldown threshold.
pub const SPILL_REASON_RATE_LIMIT: &str = "rate_limit_exceeded";
