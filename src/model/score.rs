//! Score report and scored segment data model (§3).

use serde::{Deserialize, Serialize};

use super::segment::CandidateSegment;
use crate::constants::score_weights;

/// Verdict assigned to a scored segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Strong candidate for short-form upload.
    Viral,
    /// Borderline candidate.
    Maybe,
    /// Not recommended.
    Skip,
}

impl Default for Verdict {
    fn default() -> Self {
        Self::Skip
    }
}

/// The six component scores returned (or defaulted) by the remote scorer,
/// each in `[0, 10]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    /// How strongly the opening hooks attention.
    pub hook: f64,
    /// How well the segment retains attention through its middle.
    pub retention: f64,
    /// Emotional intensity.
    pub emotion: f64,
    /// How relatable the content is to a general audience.
    pub relatability: f64,
    /// Whether the segment feels complete on its own.
    pub completion: f64,
    /// Fit for short-form platforms specifically.
    pub platform_fit: f64,
}

impl ComponentScores {
    /// Weighted combination used when the remote scorer does not supply a
    /// `final_score` directly (§3).
    #[must_use]
    pub fn weighted_final_score(&self) -> f64 {
        let weighted = self.hook * score_weights::HOOK
            + self.retention * score_weights::RETENTION
            + self.emotion * score_weights::EMOTION
            + self.completion * score_weights::COMPLETION
            + self.platform_fit * score_weights::PLATFORM_FIT
            + self.relatability * score_weights::RELATABILITY;
        weighted * 10.0
    }
}

/// Free-form annotations accompanying a [`ScoreReport`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotations {
    /// Strengths called out by the scorer.
    #[serde(default)]
    pub strengths: Vec<String>,
    /// Weaknesses called out by the scorer.
    #[serde(default)]
    pub key_weaknesses: Vec<String>,
    /// A quote pulled from the first three seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_three_seconds_quote: Option<String>,
    /// The primary emotion identified in the segment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_emotion: Option<String>,
    /// The platform the scorer judges best suited to this segment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimal_platform: Option<String>,
}

/// A full score report for one candidate segment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    /// The six component scores.
    #[serde(flatten)]
    pub components: ComponentScores,
    /// Final score in `[0, 100]`.
    pub final_score: f64,
    /// Categorical verdict.
    pub verdict: Verdict,
    /// Free-form annotations.
    #[serde(flatten)]
    pub annotations: Annotations,
    /// Fields present in the remote response but outside the documented
    /// schema, preserved verbatim for downstream consumers (§6).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ScoreReport {
    /// Build a fallback report (all-zero scores, `verdict = skip`) used
    /// when a segment could not be scored (§4.4 step 6, §4.8).
    #[must_use]
    pub fn fallback(reason: &str) -> Self {
        Self {
            components: ComponentScores::default(),
            final_score: 0.0,
            verdict: Verdict::Skip,
            annotations: Annotations {
                key_weaknesses: vec![reason.to_string()],
                ..Annotations::default()
            },
            extra: serde_json::Map::new(),
        }
    }
}

/// A [`CandidateSegment`] extended with its [`ScoreReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredSegment {
    /// The underlying candidate.
    #[serde(flatten)]
    pub candidate: CandidateSegment,
    /// Its score report.
    pub score: ScoreReport,
}

/// Sort scored segments per the determinism rule in §4.4: `final_score`
/// descending, ties broken by `(start, end)` ascending.
pub fn sort_scored_segments(segments: &mut [ScoredSegment]) {
    segments.sort_by(|a, b| {
        b.score
            .final_score
            .partial_cmp(&a.score.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                a.candidate
                    .start
                    .partial_cmp(&b.candidate.start)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| {
                a.candidate
                    .end
                    .partial_cmp(&b.candidate.end)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    });
}
