//! Batch request formatting: assigns each candidate an integer id and
//! embeds the whole batch into a single prompt, per §4.4 step 2.

use crate::model::CandidateSegment;

/// Format a single batch's user payload: the caller's prompt template
/// followed by the numbered segment texts. Each candidate's id is its
/// index within the pre-filtered list passed to the engine, so ids stay
/// stable across retries of the same batch.
#[must_use]
pub fn format_batch_prompt(template: &str, batch: &[(u64, &CandidateSegment)]) -> String {
    let mut prompt = template.trim_end().to_string();
    prompt.push_str("\n\nSegments:\n");

    for (id, candidate) in batch {
        prompt.push_str(&format!(
            "- id={id} start={:.2} end={:.2}\n  text: {}\n",
            candidate.start, candidate.end, candidate.text
        ));
    }

    prompt
}
