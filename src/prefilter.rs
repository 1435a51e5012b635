//! Heuristic Pre-filter (Component C, §4.3): a pure, side-effect-free
//! cheap local scoring pass that shrinks a large candidate list down to
//! the top N before the expensive remote scoring pass.

use crate::constants::prefilter_scoring as weights;
use crate::model::CandidateSegment;

/// Score one candidate using only its cheap, locally-derived features.
/// Exposed separately from [`select_top`] so callers (and tests) can
/// inspect the raw score.
#[must_use]
pub fn score(candidate: &CandidateSegment) -> f64 {
    let mut total = 0.0;

    let duration = candidate.duration();
    if (weights::TIGHT_DURATION_MIN..=weights::TIGHT_DURATION_MAX).contains(&duration) {
        total += weights::TIGHT_DURATION_BONUS;
    } else if (weights::LOOSE_DURATION_MIN..=weights::LOOSE_DURATION_MAX).contains(&duration) {
        total += weights::LOOSE_DURATION_BONUS;
    }

    let keyword_bonus =
        f64::from(candidate.features.emotional_keyword_count) * weights::KEYWORD_HIT_WEIGHT;
    total += keyword_bonus.min(weights::KEYWORD_BONUS_CAP);

    let sentence_density = f64::from(candidate.features.sentence_count) / (duration / 10.0).max(f64::EPSILON);
    let sentence_bonus = sentence_density * weights::SENTENCE_DENSITY_WEIGHT;
    total += sentence_bonus.min(weights::SENTENCE_DENSITY_CAP);

    let pause_bonus = candidate.features.pause_density * weights::PAUSE_DENSITY_WEIGHT;
    total += pause_bonus.min(weights::PAUSE_DENSITY_CAP);

    total
}

/// Select the top `count` candidates by pre-filter score, ties broken by
/// earlier start time. The input is never mutated; the filter is pure.
#[must_use]
pub fn select_top(candidates: &[CandidateSegment], count: usize) -> Vec<CandidateSegment> {
    let mut scored: Vec<(f64, &CandidateSegment)> = candidates.iter().map(|c| (score(c), c)).collect();

    scored.sort_by(|(score_a, cand_a), (score_b, cand_b)| {
        score_b
            .partial_cmp(score_a)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                cand_a
                    .start
                    .partial_cmp(&cand_b.start)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    });

    scored.into_iter().take(count).map(|(_, c)| c.clone()).collect()
}
