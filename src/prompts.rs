//! Prompts sent to the external backends.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — the extraction schema the model is asked
//!    to follow and the field mapping in [`crate::pipeline::extract`] must
//!    agree; keeping the schema text in one place makes drift visible.
//!
//! 2. **Testability** — unit tests can inspect prompts directly without
//!    calling a real backend, so schema regressions are cheap to catch.
//!
//! Callers can override the extraction prompt via
//! [`crate::config::PipelineConfig::system_prompt`]; the constants here are
//! used only when no override is provided.

/// Instruction given to the vision backend alongside the flyer image.
///
/// One sentence, nothing about structure: recognition and extraction are
/// separate stages, and the extractor gets the text as-is.
pub const RECOGNITION_INSTRUCTION: &str =
    "Extract ALL text from this image/flyer. Return only the extracted text, nothing else.";

/// Default system prompt for the structured-extraction call.
///
/// Enumerates the exact output contract: field names, types, the closed
/// category set, null-for-unknown, and the conservatism rules the
/// manual-review policy relies on.
pub const EXTRACTION_SYSTEM_PROMPT: &str = r#"You are an expert at extracting structured event information from text.
Your task is to analyze the provided text (extracted from an event flyer) and extract event details.

Return ONLY a valid JSON object with the following fields (use null for fields you cannot determine):
- title: string (event name/title)
- description: string (event description or summary)
- startDate: string (ISO 8601 format like "2024-12-15T19:00:00", extract date and time if available)
- endDate: string or null (ISO 8601 format, if end time/date is mentioned)
- category: string (one of: "music", "sports", "family", "arts", "food" - pick the most appropriate)
- priceInfo: string or null (e.g., "Free", "€15", "$20 at door")
- locationName: string or null (venue name)
- address: string or null (full address if available)
- latitude: string or null (only if explicitly mentioned)
- longitude: string or null (only if explicitly mentioned)
- website: string or null (URL if mentioned)
- organizerName: string or null (event organizer/host name)
- confidence: number (0-100, your confidence level in the extraction)

Important rules:
1. If no clear date/time is found, still try to extract other fields
2. For dates, assume the current or upcoming year if not specified
3. Be conservative with confidence - lower if information is ambiguous
4. Always return valid JSON, nothing else"#;

/// Build the user turn for the structured-extraction call.
pub fn extraction_user_prompt(text: &str) -> String {
    format!("Extract event details from this flyer text:\n\n{text}")
}
