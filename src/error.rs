//! Error types for the clip scoring and extraction core.

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the core pipeline.
///
/// Per §7 of the spec, only configuration errors, external-tool errors, and
/// cancellation are ever returned from [`crate::orchestrator::Orchestrator::run`].
/// Remote transient errors, response-parse errors, and cache-integrity
/// errors are handled internally and never surface as a variant here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to serialize a value to JSON.
    #[error("failed to serialize to JSON")]
    JsonSerialize {
        /// Underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to parse a JSON value.
    #[error("failed to parse JSON at '{path}'")]
    JsonParse {
        /// Path of the file that failed to parse.
        path: std::path::PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// Prompt template is empty or whitespace-only.
    #[error("prompt_empty: prompt template is empty or whitespace-only")]
    PromptEmpty,

    /// Prompt template is shorter than the configured minimum length.
    #[error("prompt_too_short: prompt template has {len} characters, minimum is {min}")]
    PromptTooShort {
        /// Actual character length of the prompt.
        len: usize,
        /// Configured minimum character length.
        min: usize,
    },

    /// Required credential was not supplied.
    #[error("credential_missing: no credential configured for the remote scorer")]
    CredentialMissing,

    /// Audio extraction (external collaborator) failed.
    #[error("audio extraction failed for '{path}'")]
    AudioExtraction {
        /// Path of the source being extracted.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Transcription (external collaborator) failed.
    #[error("transcription failed for '{path}'")]
    Transcription {
        /// Path of the audio file being transcribed.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The run was cancelled cooperatively between suspension points.
    #[error("cancelled")]
    Cancelled,

    /// Internal invariant violation (should not occur in normal operation).
    #[error("internal error: {message}")]
    Internal {
        /// Description of the invariant that was violated.
        message: String,
    },
}
