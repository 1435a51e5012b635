//! Candidate segment data model (§3, §4.2).

use serde::{Deserialize, Serialize};

/// Which strategy in the Segment Builder (§4.2) produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    /// Produced by the sentence-window sliding strategy.
    SentenceWindow,
    /// Produced by the pause-boundary strategy.
    PauseWindow,
}

/// Cheap, locally-derived features of a candidate segment, used by the
/// heuristic pre-filter (§4.3).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedFeatures {
    /// Number of sentence terminators within the segment's text.
    pub sentence_count: u32,
    /// Pauses per second within the segment (inter-sentence gaps above the
    /// configured pause threshold, normalized by duration).
    pub pause_density: f64,
    /// Count of emotional-keyword lexicon hits within the segment's text.
    pub emotional_keyword_count: u32,
}

/// A time window over a transcript proposed for scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSegment {
    /// Start time, in seconds.
    pub start: f64,
    /// End time, in seconds.
    pub end: f64,
    /// Joined transcript text covered by this window.
    pub text: String,
    /// Which builder strategy produced this candidate.
    pub kind: SegmentKind,
    /// Cheap derived features, computed once at build time.
    #[serde(default)]
    pub features: DerivedFeatures,
}

impl CandidateSegment {
    /// Duration of this candidate, in seconds.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether this candidate's time range intersects `other`'s.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start: f64, end: f64) -> CandidateSegment {
        CandidateSegment {
            start,
            end,
            text: String::new(),
            kind: SegmentKind::SentenceWindow,
            features: DerivedFeatures::default(),
        }
    }

    #[test]
    fn duration_computed_correctly() {
        assert!((seg(10.0, 40.0).duration() - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn overlap_detection() {
        assert!(seg(10.0, 40.0).overlaps(&seg(30.0, 50.0)));
        assert!(!seg(10.0, 40.0).overlaps(&seg(40.0, 50.0)));
        assert!(!seg(10.0, 40.0).overlaps(&seg(50.0, 60.0)));
    }
}
