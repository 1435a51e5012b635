//! Core data model (§3).

mod score;
mod segment;
mod source;
mod state;
mod transcript;

pub use score::{Annotations, ComponentScores, ScoreReport, ScoredSegment, Verdict, sort_scored_segments};
pub use segment::{CandidateSegment, DerivedFeatures, SegmentKind};
pub use source::{Source, SourceFingerprint};
pub use state::{
    AiScoringPayload, AudioExtractionPayload, PipelineState, SegmentationPayload, Stage,
    TranscriptionPayload,
};
pub use transcript::{Transcript, TranscriptSegment, WordTiming};
