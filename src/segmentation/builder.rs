//! Sentence-window and pause-window candidate generation.

use crate::constants::{EMOTIONAL_KEYWORDS, SENTENCE_TERMINATORS};
use crate::model::{CandidateSegment, DerivedFeatures, SegmentKind, Transcript, TranscriptSegment};

/// Build the full candidate list for a transcript: the sentence-window and
/// pause-window strategies run independently, their outputs are combined,
/// and exact-range duplicates between the two are collapsed to one entry
/// (§4.2 edge case: identical ranges from both strategies merge to a
/// single candidate).
///
/// The returned list is sorted by `(start, end)` ascending, which is
/// itself deterministic given a deterministic transcript.
#[must_use]
pub fn build_candidates(
    transcript: &Transcript,
    min_duration_secs: f64,
    max_duration_secs: f64,
    pause_threshold_secs: f64,
) -> Vec<CandidateSegment> {
    let mut candidates = sentence_window_candidates(transcript, min_duration_secs, max_duration_secs);
    candidates.extend(pause_window_candidates(
        transcript,
        pause_threshold_secs,
        min_duration_secs,
        max_duration_secs,
    ));

    dedup_by_range(&mut candidates);
    candidates.sort_by(|a, b| {
        a.start
            .partial_cmp(&b.start)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.end.partial_cmp(&b.end).unwrap_or(std::cmp::Ordering::Equal))
    });
    candidates
}

/// Slide a window anchored at each sentence-ending transcript segment,
/// extending it sentence-by-sentence and emitting one candidate per
/// extension whose duration falls within `[min, max]` and which ends on a
/// sentence boundary.
fn sentence_window_candidates(
    transcript: &Transcript,
    min_duration_secs: f64,
    max_duration_secs: f64,
) -> Vec<CandidateSegment> {
    let segments = &transcript.segments;
    let mut candidates = Vec::new();

    for start_idx in 0..segments.len() {
        for end_idx in start_idx..segments.len() {
            let end_segment = &segments[end_idx];
            if !end_segment.ends_sentence() {
                continue;
            }

            let start = segments[start_idx].start;
            let end = end_segment.end;
            let duration = end - start;

            if duration > max_duration_secs {
                break;
            }
            if duration < min_duration_secs {
                continue;
            }

            let window = &segments[start_idx..=end_idx];
            candidates.push(make_candidate(window, SegmentKind::SentenceWindow));
        }
    }

    candidates
}

/// Split the transcript into runs separated by inter-segment gaps above
/// `pause_threshold_secs`. A run within `[min, max]` becomes one
/// candidate; a longer run is greedily chopped into max-duration-bounded
/// sub-windows; a shorter run is dropped (pause boundaries are not
/// merged across a gap by this strategy).
fn pause_window_candidates(
    transcript: &Transcript,
    pause_threshold_secs: f64,
    min_duration_secs: f64,
    max_duration_secs: f64,
) -> Vec<CandidateSegment> {
    let segments = &transcript.segments;
    let mut candidates = Vec::new();

    for run in split_on_pauses(segments, pause_threshold_secs) {
        let run_start = run[0].start;
        let run_end = run[run.len() - 1].end;
        let run_duration = run_end - run_start;

        if run_duration <= max_duration_secs {
            if run_duration >= min_duration_secs {
                candidates.push(make_candidate(run, SegmentKind::PauseWindow));
            }
            continue;
        }

        let mut chunk_start_idx = 0;
        for idx in 0..run.len() {
            let chunk_duration = run[idx].end - run[chunk_start_idx].start;
            let at_last = idx + 1 == run.len();
            let next_would_overflow = !at_last && run[idx + 1].end - run[chunk_start_idx].start > max_duration_secs;

            if chunk_duration >= min_duration_secs && (at_last || next_would_overflow) {
                candidates.push(make_candidate(&run[chunk_start_idx..=idx], SegmentKind::PauseWindow));
                chunk_start_idx = idx + 1;
            }
        }
    }

    candidates
}

fn split_on_pauses(segments: &[TranscriptSegment], pause_threshold_secs: f64) -> Vec<&[TranscriptSegment]> {
    let mut runs = Vec::new();
    let mut run_start = 0;

    for idx in 1..segments.len() {
        let gap = segments[idx].start - segments[idx - 1].end;
        if gap > pause_threshold_secs {
            runs.push(&segments[run_start..idx]);
            run_start = idx;
        }
    }
    if run_start < segments.len() {
        runs.push(&segments[run_start..]);
    }
    runs
}

fn make_candidate(window: &[TranscriptSegment], kind: SegmentKind) -> CandidateSegment {
    let start = window[0].start;
    let end = window[window.len() - 1].end;
    let text = window
        .iter()
        .map(|s| s.text.trim())
        .collect::<Vec<_>>()
        .join(" ");

    let features = derive_features(window, &text, start, end);

    CandidateSegment {
        start,
        end,
        text,
        kind,
        features,
    }
}

fn derive_features(window: &[TranscriptSegment], text: &str, start: f64, end: f64) -> DerivedFeatures {
    let duration = (end - start).max(f64::EPSILON);

    let sentence_count = text
        .chars()
        .filter(|c| SENTENCE_TERMINATORS.contains(c))
        .count() as u32;

    let emotional_keyword_count = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .filter(|word| EMOTIONAL_KEYWORDS.contains(&word.to_lowercase().as_str()))
        .count() as u32;

    let pause_count = window
        .windows(2)
        .filter(|pair| pair[1].start - pair[0].end > crate::constants::DEFAULT_PAUSE_THRESHOLD_SECS)
        .count();
    let pause_density = pause_count as f64 / duration;

    DerivedFeatures {
        sentence_count,
        pause_density,
        emotional_keyword_count,
    }
}

fn dedup_by_range(candidates: &mut Vec<CandidateSegment>) {
    let mut seen = std::collections::HashSet::new();
    candidates.retain(|c| seen.insert((c.start.to_bits(), c.end.to_bits())));
}
