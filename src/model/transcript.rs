//! Transcript data model (§3).

use serde::{Deserialize, Serialize};

/// Per-word timing within a [`TranscriptSegment`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTiming {
    /// The word text.
    pub word: String,
    /// Start time of the word, in seconds.
    pub start: f64,
    /// End time of the word, in seconds.
    pub end: f64,
}

/// A single transcribed segment (typically a sentence or clause).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Start time, in seconds, >= 0.
    pub start: f64,
    /// End time, in seconds, > start.
    pub end: f64,
    /// UTF-8 transcript text for this segment.
    pub text: String,
    /// Optional per-word timings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<WordTiming>>,
}

impl TranscriptSegment {
    /// Duration of this segment, in seconds.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether this segment's text ends in a sentence terminator.
    #[must_use]
    pub fn ends_sentence(&self) -> bool {
        self.text
            .trim_end()
            .chars()
            .next_back()
            .is_some_and(|c| crate::constants::SENTENCE_TERMINATORS.contains(&c))
    }
}

/// An ordered, finite sequence of [`TranscriptSegment`]s.
///
/// Non-overlapping and monotonically non-decreasing in start time, per §3's
/// invariant. This type does not itself enforce the invariant (it describes
/// the contract of an already-produced transcript from the external
/// transcriber, §6); callers that construct transcripts directly (e.g. in
/// tests) are responsible for respecting it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    /// The ordered segments.
    pub segments: Vec<TranscriptSegment>,
}

impl Transcript {
    /// Create a transcript from an ordered sequence of segments.
    #[must_use]
    pub fn new(segments: Vec<TranscriptSegment>) -> Self {
        Self { segments }
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the transcript has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
