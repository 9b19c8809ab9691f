//! Error types for the flyer2event library.
//!
//! Only two things can abort a pipeline run, and both are thrown:
//!
//! * [`FlyerError::ServiceUnavailable`] — a required backend was never
//!   configured. Detected when the pipeline is constructed, surfaced on the
//!   first call, never retried.
//!
//! * [`FlyerError::RecognitionFailed`] — the recognition backend call itself
//!   errored. With no text there is nothing to hand to the extractor or to a
//!   human moderator, so the failure is hard.
//!
//! Extraction-side problems (empty text, unparseable model output) are *not*
//! errors: they degrade to an [`crate::candidate::EventCandidate`] flagged for
//! manual review, because a flyer the model cannot structure is still useful
//! to the moderator who sees the raw text.

use thiserror::Error;

/// All fatal errors returned by the flyer2event library.
#[derive(Debug, Error)]
pub enum FlyerError {
    /// A required external backend was never configured.
    #[error("{backend} backend is not configured.\n{hint}")]
    ServiceUnavailable { backend: String, hint: String },

    /// The recognition backend call errored (network, auth, malformed response).
    #[error("Text recognition failed: {reason}")]
    RecognitionFailed { reason: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl FlyerError {
    /// Shorthand for the unconfigured-vision-backend error.
    pub(crate) fn vision_unavailable() -> Self {
        FlyerError::ServiceUnavailable {
            backend: "vision".to_string(),
            hint: "Set GROQ_API_KEY (or GOOGLE_VISION_API_KEY), or provide \
                   PipelineConfig::vision_backend."
                .to_string(),
        }
    }

    /// Shorthand for the unconfigured-chat-backend error.
    pub(crate) fn chat_unavailable() -> Self {
        FlyerError::ServiceUnavailable {
            backend: "language-model".to_string(),
            hint: "Set GROQ_API_KEY, or provide PipelineConfig::chat_backend.".to_string(),
        }
    }
}
