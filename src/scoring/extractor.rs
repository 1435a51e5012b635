//! Tolerant JSON extraction from a remote model's raw text response
//! (§4.4 step 5), and duck-typed mapping of a parsed result object onto a
//! [`ScoreReport`] (§9 design note).

use serde_json::Value;

use crate::model::{Annotations, ComponentScores, ScoreReport, Verdict};

/// Locate and parse the first JSON object in `text`, tolerating markdown
/// code fences, leading/trailing prose, and nested objects.
///
/// Strategy: find the first `{`, then count braces (respecting quoted
/// strings) until they balance; parse that slice. If no balanced slice is
/// found, fall back to the lenient span from the first `{` to the last
/// `}` in the text.
#[must_use]
pub fn extract_first_json_object(text: &str) -> Option<Value> {
    let start = text.find('{')?;

    if let Some(end) = find_matching_brace(&text[start..]) {
        let candidate = &text[start..=start + end];
        if let Ok(value) = serde_json::from_str(candidate) {
            return Some(value);
        }
    }

    let last = text.rfind('}')?;
    if last < start {
        return None;
    }
    serde_json::from_str(&text[start..=last]).ok()
}

/// Return the byte offset, relative to `text` (which must start with
/// `{`), of the `}` balancing the first `{`. Quoted string contents are
/// skipped so braces inside strings do not perturb the count.
fn find_matching_brace(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, &byte) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// Resolve a single component-score field with the duck-typed fallback
/// chain from §9: direct key (`"hook_score"`) → nested under `"scores"`
/// → underscore-stripped alias (`"hook"`) → default `0.0`.
fn resolve_component(object: &serde_json::Map<String, Value>, field: &str) -> f64 {
    let scored_key = format!("{field}_score");

    if let Some(value) = object.get(&scored_key).and_then(Value::as_f64) {
        return value;
    }
    if let Some(scores) = object.get("scores").and_then(Value::as_object) {
        if let Some(value) = scores.get(&scored_key).and_then(Value::as_f64) {
            return value;
        }
        if let Some(value) = scores.get(field).and_then(Value::as_f64) {
            return value;
        }
    }
    object.get(field).and_then(Value::as_f64).unwrap_or(0.0)
}

fn resolve_string_list(object: &serde_json::Map<String, Value>, field: &str) -> Vec<String> {
    object
        .get(field)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn resolve_string(object: &serde_json::Map<String, Value>, field: &str) -> Option<String> {
    object.get(field).and_then(Value::as_str).map(str::to_string)
}

/// Documented ScoreReport fields, excluded from the preserved "extra" bag.
const KNOWN_FIELDS: &[&str] = &[
    "id",
    "hook_score",
    "retention_score",
    "emotion_score",
    "relatability_score",
    "completion_score",
    "platform_fit_score",
    "hook",
    "retention",
    "emotion",
    "relatability",
    "completion",
    "platform_fit",
    "scores",
    "final_score",
    "verdict",
    "strengths",
    "key_weaknesses",
    "first_three_seconds_quote",
    "primary_emotion",
    "optimal_platform",
];

/// Build a [`ScoreReport`] from one parsed result object.
#[must_use]
pub fn score_report_from_object(object: &serde_json::Map<String, Value>) -> ScoreReport {
    let components = ComponentScores {
        hook: resolve_component(object, "hook"),
        retention: resolve_component(object, "retention"),
        emotion: resolve_component(object, "emotion"),
        relatability: resolve_component(object, "relatability"),
        completion: resolve_component(object, "completion"),
        platform_fit: resolve_component(object, "platform_fit"),
    };

    let final_score = object
        .get("final_score")
        .and_then(Value::as_f64)
        .unwrap_or_else(|| components.weighted_final_score());

    let verdict = object
        .get("verdict")
        .and_then(Value::as_str)
        .and_then(|s| match s.to_lowercase().as_str() {
            "viral" => Some(Verdict::Viral),
            "maybe" => Some(Verdict::Maybe),
            "skip" => Some(Verdict::Skip),
            _ => None,
        })
        .unwrap_or_default();

    let annotations = Annotations {
        strengths: resolve_string_list(object, "strengths"),
        key_weaknesses: resolve_string_list(object, "key_weaknesses"),
        first_three_seconds_quote: resolve_string(object, "first_three_seconds_quote"),
        primary_emotion: resolve_string(object, "primary_emotion"),
        optimal_platform: resolve_string(object, "optimal_platform"),
    };

    let mut extra = serde_json::Map::new();
    for (key, value) in object {
        if !KNOWN_FIELDS.contains(&key.as_str()) {
            extra.insert(key.clone(), value.clone());
        }
    }

    ScoreReport {
        components,
        final_score,
        verdict,
        annotations,
        extra,
    }
}

/// Extract the `results` array from a parsed top-level JSON object. Each
/// entry is returned alongside its `id` field (as `i64`), when present and
/// numeric.
#[must_use]
pub fn extract_results(document: &Value) -> Vec<(Option<i64>, serde_json::Map<String, Value>)> {
    document
        .get("results")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_object)
                .map(|object| (object.get("id").and_then(Value::as_i64), object.clone()))
                .collect()
        })
        .unwrap_or_default()
}
