//! Structured extraction: one chat call, then the manual-review policy.
//!
//! This stage never fails. Everything that can go wrong on the extraction
//! side — empty input text, a backend error, a response with no JSON in it,
//! JSON that doesn't parse — degrades to the same fallback: an
//! [`EventCandidate`] with `needs_manual_review = true`, `confidence = 0`,
//! and the raw text preserved so the moderator can fill the form by hand.
//! Aborting the user's upload over a model quirk would throw away text a
//! human can still use.

use crate::backend::{ChatBackend, CompletionOptions};
use crate::candidate::{EventCandidate, EventCategory};
use crate::config::PipelineConfig;
use crate::prompts::{extraction_user_prompt, EXTRACTION_SYSTEM_PROMPT};
use serde_json::Value;
use tracing::{debug, warn};

/// Confidence assumed when the model omits the field or reports something
/// unusable.
const DEFAULT_CONFIDENCE: u8 = 50;

/// Below this, the extraction is flagged for manual review even when a
/// start date was found.
const REVIEW_THRESHOLD: u8 = 50;

/// Extract a structured event candidate from recognised flyer text.
///
/// Empty or whitespace-only input short-circuits to the fallback without
/// touching the backend — there is nothing to ask about.
pub async fn extract_event(
    backend: &dyn ChatBackend,
    text: &str,
    config: &PipelineConfig,
) -> EventCandidate {
    if text.trim().is_empty() {
        debug!("input text empty, skipping extraction call");
        return EventCandidate::manual_review(text);
    }

    let system_prompt = config
        .system_prompt
        .as_deref()
        .unwrap_or(EXTRACTION_SYSTEM_PROMPT);
    let options = CompletionOptions {
        temperature: config.temperature,
        max_tokens: config.extraction_max_tokens,
    };

    match backend
        .complete(system_prompt, &extraction_user_prompt(text), &options)
        .await
    {
        Ok(response) => candidate_from_response(&response, text),
        Err(e) => {
            warn!(backend = backend.name(), error = %e, "extraction call failed");
            EventCandidate::manual_review(text)
        }
    }
}

/// Turn a raw model response into a candidate.
///
/// Pure: scan for the JSON object, parse it, map fields tolerantly, apply
/// the review policy. Split out from the call path so the whole response
/// surface is testable without a backend.
pub fn candidate_from_response(response: &str, text: &str) -> EventCandidate {
    let Some(json_str) = crate::pipeline::scan::first_json_object(response) else {
        warn!("no JSON object in model response");
        return EventCandidate::manual_review(text);
    };

    let value: Value = match serde_json::from_str(json_str) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "model response JSON failed to parse");
            return EventCandidate::manual_review(text);
        }
    };

    let start_date = string_field(&value, "startDate");
    let confidence = effective_confidence(&value);
    let needs_manual_review = start_date.is_none() || confidence < REVIEW_THRESHOLD;

    EventCandidate {
        title: string_field(&value, "title"),
        description: string_field(&value, "description"),
        start_date,
        end_date: string_field(&value, "endDate"),
        category: string_field(&value, "category")
            .as_deref()
            .and_then(EventCategory::parse),
        price_info: string_field(&value, "priceInfo"),
        location_name: string_field(&value, "locationName"),
        address: string_field(&value, "address"),
        latitude: string_field(&value, "latitude"),
        longitude: string_field(&value, "longitude"),
        website: string_field(&value, "website"),
        organizer_name: string_field(&value, "organizerName"),
        needs_manual_review,
        extracted_text: text.to_string(),
        confidence: Some(confidence),
    }
}

/// Pull an optional string field. Null, missing, wrong-typed, and empty
/// values all map to absent — a field is either usable or it isn't.
fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Effective confidence: the model's number when it is a number in 0–100,
/// otherwise the default. Out-of-range values are malformed, not clamped —
/// a model reporting 9000 gets no more trust than one reporting nothing.
fn effective_confidence(value: &Value) -> u8 {
    match value.get("confidence").and_then(Value::as_f64) {
        Some(c) if (0.0..=100.0).contains(&c) => c.round() as u8,
        _ => DEFAULT_CONFIDENCE,
    }
}
