//! Trait boundaries toward collaborators the core pipeline does not itself
//! implement: pulling audio out of a source video, and transcribing audio
//! into text with word-level timing.
//!
//! The core ships no concrete implementation of either trait. Callers wire
//! a decoder/ASR engine of their choosing at the orchestrator boundary.

use std::error::Error as StdError;
use std::path::Path;

use async_trait::async_trait;

use crate::model::Transcript;

/// Opaque error type for external collaborators. Implementations report
/// their own failures however they like; the orchestrator boxes them into
/// the crate's [`crate::error::Error::AudioExtraction`] /
/// [`crate::error::Error::Transcription`] variants, naming the failing
/// stage.
pub type ExternalError = Box<dyn StdError + Send + Sync>;

/// Extracts a mono audio track from a source video into a file the
/// transcriber can consume.
#[async_trait]
pub trait AudioExtractor: Send + Sync {
    /// Extract audio from `source` into `destination`, creating parent
    /// directories as needed. Returns once the file is fully written.
    async fn extract(&self, source: &Path, destination: &Path) -> Result<(), ExternalError>;
}

/// Transcribes an audio file into a [`Transcript`] with segment- and,
/// where available, word-level timing.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe the audio file at `audio_path`.
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript, ExternalError>;
}
