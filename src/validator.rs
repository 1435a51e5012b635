//! Validator (Component E, §4.6): removes overlapping and near-duplicate
//! clips from a scored-segment list, in two ordered passes.

use std::collections::HashSet;

use crate::constants::DEFAULT_JACCARD_THRESHOLD;
use crate::model::ScoredSegment;

/// Run both validation passes over `scored_segments`, which must already
/// be sorted by `final_score` descending (the walk order that guarantees
/// higher-scoring clips always win ties). Returns the surviving subset,
/// in the same relative order.
#[must_use]
pub fn validate(scored_segments: &[ScoredSegment], jaccard_threshold: f64) -> Vec<ScoredSegment> {
    let non_overlapping = remove_overlaps(scored_segments);
    remove_semantic_duplicates(&non_overlapping, jaccard_threshold)
}

/// Walk the list; keep a segment if its time range does not intersect
/// any already-kept range (§4.6 step 1).
fn remove_overlaps(scored_segments: &[ScoredSegment]) -> Vec<ScoredSegment> {
    let mut kept: Vec<ScoredSegment> = Vec::new();

    for candidate in scored_segments {
        let overlaps_kept = kept
            .iter()
            .any(|kept_segment| candidate.candidate.overlaps(&kept_segment.candidate));
        if !overlaps_kept {
            kept.push(candidate.clone());
        }
    }
    kept
}

/// For each surviving segment, reject it if its text's Jaccard similarity
/// against any already-kept segment strictly exceeds `threshold` (§4.6
/// step 2).
fn remove_semantic_duplicates(scored_segments: &[ScoredSegment], threshold: f64) -> Vec<ScoredSegment> {
    let mut kept: Vec<ScoredSegment> = Vec::new();
    let mut kept_tokens: Vec<HashSet<String>> = Vec::new();

    for candidate in scored_segments {
        let tokens = tokenize(&candidate.candidate.text);
        let is_duplicate = kept_tokens
            .iter()
            .any(|kept| jaccard_similarity(&tokens, kept) > threshold);

        if !is_duplicate {
            kept.push(candidate.clone());
            kept_tokens.push(tokens);
        }
    }
    kept
}

/// Lower-case, punctuation-stripped whitespace tokenization, matching the
/// pre-filter's keyword-matching approach for consistency (§4.6
/// Tokenization).
fn tokenize(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// `|A ∩ B| / |A ∪ B|`. Two empty token sets are considered identical
/// (similarity 1.0) since the division would otherwise be undefined.
fn jaccard_similarity(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CandidateSegment, DerivedFeatures, ScoreReport, SegmentKind, Verdict};

    fn scored(start: f64, end: f64, text: &str, final_score: f64) -> ScoredSegment {
        ScoredSegment {
            candidate: CandidateSegment {
                start,
                end,
                text: text.to_string(),
                kind: SegmentKind::SentenceWindow,
                features: DerivedFeatures::default(),
            },
            score: ScoreReport {
                final_score,
                verdict: Verdict::Maybe,
                ..ScoreReport::default()
            },
        }
    }

    #[test]
    fn overlapping_lower_scored_segment_is_dropped() {
        let segments = vec![
            scored(0.0, 30.0, "the quick brown fox jumps", 90.0),
            scored(20.0, 50.0, "completely different words here", 80.0),
        ];
        let result = validate(&segments, DEFAULT_JACCARD_THRESHOLD);
        assert_eq!(result.len(), 1);
        assert!((result[0].candidate.start - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn near_duplicate_text_is_dropped_even_without_overlap() {
        let segments = vec![
            scored(0.0, 20.0, "the quick brown fox jumps over", 90.0),
            scored(100.0, 120.0, "the quick brown fox jumps over", 80.0),
        ];
        let result = validate(&segments, DEFAULT_JACCARD_THRESHOLD);
        assert_eq!(result.len(), 1);
        assert!((result[0].score.final_score - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn distinct_non_overlapping_segments_both_survive() {
        let segments = vec![
            scored(0.0, 20.0, "alpha beta gamma delta", 90.0),
            scored(100.0, 120.0, "epsilon zeta eta theta", 80.0),
        ];
        let result = validate(&segments, DEFAULT_JACCARD_THRESHOLD);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn jaccard_similarity_matches_known_value() {
        let a: HashSet<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let b: HashSet<String> = ["b", "c", "d"].iter().map(|s| s.to_string()).collect();
        // intersection {b,c} = 2, union {a,b,c,d} = 4
        assert!((jaccard_similarity(&a, &b) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn threshold_is_strict_greater_than() {
        let segments = vec![
            scored(0.0, 20.0, "alpha beta gamma delta epsilon", 90.0),
            // Shares 3 of 5 tokens with the first -> jaccard = 3/7 ≈ 0.4286,
            // below the 0.7 threshold, so both should survive.
            scored(100.0, 120.0, "alpha beta gamma zeta eta", 80.0),
        ];
        let result = validate(&segments, 0.7);
        assert_eq!(result.len(), 2);
    }
}
