//! External backend capabilities.
//!
//! The pipeline depends on two narrow, injected capabilities rather than on
//! any concrete provider:
//!
//! * [`VisionBackend`] — "give bytes + a media-type hint + an instruction,
//!   get back a string".
//! * [`ChatBackend`] — "give a system turn + a user turn + a token budget,
//!   get back a completion".
//!
//! Two interchangeable shapes exist in the wild for the vision side: a
//! chat-completion API handed an image attachment
//! ([`openai::OpenAiCompatBackend`]) and a dedicated image-annotation API
//! returning a text-annotation list ([`annotate::AnnotateBackend`]). The
//! pipeline cannot tell them apart, which is the point — backends are
//! selected at construction time and swap freely.

use async_trait::async_trait;
use thiserror::Error;

pub mod annotate;
pub mod openai;

pub use annotate::AnnotateBackend;
pub use openai::OpenAiCompatBackend;

/// Error from a concrete backend call.
///
/// The pipeline maps these at the stage boundary: recognition-side errors
/// become [`crate::error::FlyerError::RecognitionFailed`], extraction-side
/// errors degrade softly to a manual-review candidate.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The HTTP request itself failed (connect, timeout, TLS).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// The API answered 2xx but the body was not the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Sampling knobs forwarded on each call.
#[derive(Debug, Clone, Copy)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

/// A backend that can read text out of an image.
#[async_trait]
pub trait VisionBackend: Send + Sync {
    /// Backend name for diagnostics and log lines.
    fn name(&self) -> &'static str;

    /// Recognise all text in `image`, submitted inline with `mime` as the
    /// encoding hint.
    ///
    /// A backend that finds no text returns `Ok("")` — "nothing to read" is
    /// a result, not a failure.
    async fn recognize_text(
        &self,
        image: &[u8],
        mime: &str,
        instruction: &str,
        options: &CompletionOptions,
    ) -> Result<String, BackendError>;
}

/// A backend that can complete a two-turn chat prompt.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Backend name for diagnostics and log lines.
    fn name(&self) -> &'static str;

    /// Run one completion over an ordered system + user turn pair.
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, BackendError>;
}
