//! The structured output of the pipeline: [`EventCandidate`].
//!
//! A candidate is created exactly once per upload — by the extractor on
//! success, or by one of the soft-failure paths — and returned to the caller
//! unchanged. It is never persisted here; the submission form on the other
//! side of the upload endpoint decides what to do with it.
//!
//! Serialisation uses camelCase field names so the JSON shape matches what
//! the upload endpoint hands to its clients (`needsManualReview`,
//! `extractedText`, `startDate`, …).

use serde::{Deserialize, Serialize};

/// The fixed set of categories an event may be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Music,
    Sports,
    Family,
    Arts,
    Food,
}

impl EventCategory {
    /// Parse a category string from model output, case-insensitively.
    ///
    /// Anything outside the fixed set yields `None` — an out-of-set value is
    /// a model error, not data, and unknown fields stay absent rather than
    /// guessed.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "music" => Some(EventCategory::Music),
            "sports" => Some(EventCategory::Sports),
            "family" => Some(EventCategory::Family),
            "arts" => Some(EventCategory::Arts),
            "food" => Some(EventCategory::Food),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Music => "music",
            EventCategory::Sports => "sports",
            EventCategory::Family => "family",
            EventCategory::Arts => "arts",
            EventCategory::Food => "food",
        }
    }
}

/// Structured event data extracted from a flyer.
///
/// Every descriptive field is optional: absent means the model could not
/// determine it, and absent is never coerced to an empty string. The three
/// non-optional members are the audit/decision surface:
///
/// * `needs_manual_review` — `true` whenever `start_date` is absent, the
///   effective confidence is below 50, or an earlier failure state (empty
///   input text, unparseable model response) forced the fallback.
/// * `extracted_text` — the raw recognised text, always carried through so
///   a human moderator can complete the form when extraction came up short.
/// * `confidence` — 0–100 as reported by the model (default 50 when
///   omitted), 0 on every fallback path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCandidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// ISO-8601 date-time, e.g. "2025-07-20T19:00:00".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<EventCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// String form, only when explicitly printed on the flyer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer_name: Option<String>,

    pub needs_manual_review: bool,
    pub extracted_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<u8>,
}

impl EventCandidate {
    /// The fallback candidate: no structure, flagged for manual review,
    /// raw text preserved for the moderator.
    pub fn manual_review(extracted_text: impl Into<String>) -> Self {
        EventCandidate {
            title: None,
            description: None,
            start_date: None,
            end_date: None,
            category: None,
            price_info: None,
            location_name: None,
            address: None,
            latitude: None,
            longitude: None,
            website: None,
            organizer_name: None,
            needs_manual_review: true,
            extracted_text: extracted_text.into(),
            confidence: Some(0),
        }
    }
}
