//! # flyer2event
//!
//! Extract structured event data from flyer images using Vision Language
//! Models.
//!
//! ## Why this crate?
//!
//! Event organizers submit flyers, not forms. Instead of forcing them to
//! retype a poster into a dozen fields, this crate reads the flyer the way a
//! human would — a vision model recognises the text, a language model
//! structures it against a fixed schema — and prefills the submission form.
//! When the models come up short, the result is flagged for manual review
//! with the raw text attached, so a moderator can always finish the job.
//!
//! ## Pipeline Overview
//!
//! ```text
//! flyer bytes
//!  │
//!  ├─ 1. Input      sniff the media type from magic bytes
//!  ├─ 2. Recognize  inline-encode + submit to the vision backend (hard-failing)
//!  ├─ 3. Extract    one chat call against the schema prompt (soft-failing)
//!  └─ 4. Output     EventCandidate + confidence / manual-review policy
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flyer2event::{FlyerPipeline, PipelineConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credentials auto-detected from GROQ_API_KEY / GOOGLE_VISION_API_KEY
//!     let pipeline = FlyerPipeline::new(PipelineConfig::default())?;
//!     let bytes = std::fs::read("flyer.jpg")?;
//!     let candidate = pipeline.process_flyer(bytes).await?;
//!     if candidate.needs_manual_review {
//!         eprintln!("sparse extraction, raw text: {}", candidate.extracted_text);
//!     }
//!     println!("{}", serde_json::to_string_pretty(&candidate)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Failure model
//!
//! Recognition failures are hard: no text means nothing to offer the
//! extractor or a moderator, so [`FlyerError`] propagates to the caller.
//! Extraction failures are soft: empty text, prose-only model responses, and
//! malformed JSON all degrade to an [`EventCandidate`] with
//! `needs_manual_review = true` and the raw text preserved. An unconfigured
//! backend fails fast with `ServiceUnavailable` before any network call.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backend;
pub mod candidate;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod process;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use backend::{
    AnnotateBackend, BackendError, ChatBackend, CompletionOptions, OpenAiCompatBackend,
    VisionBackend,
};
pub use candidate::{EventCandidate, EventCategory};
pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use error::FlyerError;
pub use pipeline::input::{MediaType, RawImageInput};
pub use process::FlyerPipeline;
