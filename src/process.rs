//! The pipeline entry point: recognise, then extract.
//!
//! A [`FlyerPipeline`] is constructed once from a [`PipelineConfig`] and
//! shared across upload requests; each `process_flyer` call is an
//! independent, non-interacting run with no shared mutable state. The two
//! stages are strictly sequential — extraction needs the recognised text —
//! and neither is retried: the upload endpoint's response is interactive,
//! so a failed run should surface immediately rather than stall the user.

use crate::backend::annotate::DEFAULT_ANNOTATE_ENDPOINT;
use crate::backend::{AnnotateBackend, ChatBackend, OpenAiCompatBackend, VisionBackend};
use crate::candidate::EventCandidate;
use crate::config::PipelineConfig;
use crate::error::FlyerError;
use crate::pipeline::input::RawImageInput;
use crate::pipeline::{extract, recognize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// The flyer-extraction pipeline.
///
/// Backends are resolved at construction so a missing configuration is
/// known up front: an unresolved backend is stored as `None` and every call
/// that needs it fails fast with
/// [`FlyerError::ServiceUnavailable`] instead of attempting a doomed
/// network call. Both backends absent is a valid degraded state.
pub struct FlyerPipeline {
    vision: Option<Arc<dyn VisionBackend>>,
    chat: Option<Arc<dyn ChatBackend>>,
    config: PipelineConfig,
}

impl std::fmt::Debug for FlyerPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlyerPipeline")
            .field("vision", &self.vision.as_ref().map(|b| b.name()))
            .field("chat", &self.chat.as_ref().map(|b| b.name()))
            .finish()
    }
}

impl FlyerPipeline {
    /// Build the pipeline, resolving both backends.
    ///
    /// Fails only on genuinely invalid configuration (e.g. an HTTP client
    /// that cannot be constructed) — never on missing credentials.
    pub fn new(config: PipelineConfig) -> Result<Self, FlyerError> {
        // One OpenAI-compatible client serves both capabilities when it is
        // the resolved provider for each.
        let shared = resolve_openai_backend(&config)?.map(Arc::new);

        let vision: Option<Arc<dyn VisionBackend>> = match config.vision_backend.clone() {
            Some(backend) => Some(backend),
            None => match &shared {
                Some(backend) => Some(Arc::clone(backend) as Arc<dyn VisionBackend>),
                None => resolve_annotate_backend(&config)?,
            },
        };

        let chat: Option<Arc<dyn ChatBackend>> = config
            .chat_backend
            .clone()
            .or_else(|| shared.map(|backend| backend as Arc<dyn ChatBackend>));

        match (&vision, &chat) {
            (Some(v), Some(c)) => {
                info!(vision = v.name(), chat = c.name(), "flyer pipeline configured")
            }
            (Some(v), None) => warn!(
                vision = v.name(),
                "no language-model backend configured, extraction will fail fast"
            ),
            (None, Some(c)) => warn!(
                chat = c.name(),
                "no vision backend configured, recognition will fail fast"
            ),
            (None, None) => {
                warn!("no backends configured, flyer processing will not work")
            }
        }

        Ok(FlyerPipeline {
            vision,
            chat,
            config,
        })
    }

    /// Whether a vision backend was resolved at construction.
    pub fn is_vision_configured(&self) -> bool {
        self.vision.is_some()
    }

    /// Whether a language-model backend was resolved at construction.
    pub fn is_chat_configured(&self) -> bool {
        self.chat.is_some()
    }

    /// Recognise all text in the image.
    ///
    /// # Errors
    /// [`FlyerError::ServiceUnavailable`] when no vision backend is
    /// configured, [`FlyerError::RecognitionFailed`] when the backend call
    /// errors. An image with no readable text yields `Ok("")`.
    pub async fn recognize_text(&self, image: &RawImageInput) -> Result<String, FlyerError> {
        let backend = self
            .vision
            .as_deref()
            .ok_or_else(FlyerError::vision_unavailable)?;
        recognize::recognize_text(backend, image, &self.config).await
    }

    /// Extract a structured event candidate from recognised text.
    ///
    /// # Errors
    /// Only [`FlyerError::ServiceUnavailable`] when no language-model
    /// backend is configured. Every extraction-side problem degrades to a
    /// manual-review candidate instead of an error.
    pub async fn extract_event(&self, text: &str) -> Result<EventCandidate, FlyerError> {
        let backend = self
            .chat
            .as_deref()
            .ok_or_else(FlyerError::chat_unavailable)?;
        Ok(extract::extract_event(backend, text, &self.config).await)
    }

    /// Process one uploaded flyer end to end.
    ///
    /// The caller (an upload HTTP handler) is expected to have validated
    /// MIME type and payload size already; this entry point takes the raw
    /// bytes as-is.
    ///
    /// # Errors
    /// Recognition failures propagate unchanged — with no text there is
    /// nothing to offer the extractor or the moderator. Extraction problems
    /// do not error; they come back as a candidate flagged for manual
    /// review.
    pub async fn process_flyer(&self, buffer: Vec<u8>) -> Result<EventCandidate, FlyerError> {
        // ── Step 1: Wrap input, sniff media type ─────────────────────────
        let image = RawImageInput::new(buffer);
        info!(
            bytes = image.bytes().len(),
            media_type = image.media_type().as_mime(),
            "processing flyer"
        );

        // ── Step 2: Recognise text (hard-failing) ────────────────────────
        let text = self.recognize_text(&image).await?;

        // ── Step 3: Extract structure (soft-failing) ─────────────────────
        self.extract_event(&text).await
    }
}

// ── Backend resolution ───────────────────────────────────────────────────

/// Resolve the OpenAI-compatible backend, from most-specific to
/// least-specific. Pre-built backends in the config short-circuit before
/// this is consulted — that is also how tests inject mocks.
///
/// 1. **Explicit API key** (`config.api_key`) — client against
///    `config.api_base`.
/// 2. **`GROQ_API_KEY`** — key from the environment;
///    `FLYER2EVENT_API_BASE` overrides the base URL when set.
fn resolve_openai_backend(
    config: &PipelineConfig,
) -> Result<Option<OpenAiCompatBackend>, FlyerError> {
    let (key, api_base) = if let Some(key) = config
        .api_key
        .clone()
        .filter(|k| !k.is_empty())
    {
        (key, config.api_base.clone())
    } else if let Some(key) = std::env::var("GROQ_API_KEY").ok().filter(|k| !k.is_empty()) {
        let api_base = std::env::var("FLYER2EVENT_API_BASE")
            .ok()
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| config.api_base.clone());
        (key, api_base)
    } else {
        return Ok(None);
    };

    OpenAiCompatBackend::new(
        key,
        api_base,
        config.vision_model.clone(),
        config.chat_model.clone(),
        Duration::from_secs(config.api_timeout_secs),
    )
    .map(Some)
    .map_err(|e| FlyerError::InvalidConfig(e.to_string()))
}

/// Vision-only fallback: `GOOGLE_VISION_API_KEY` selects the
/// annotation-API shape, for deployments that pair a dedicated OCR service
/// with a separate chat model. There is no chat-side equivalent — only a
/// chat model can follow the extraction schema.
fn resolve_annotate_backend(
    config: &PipelineConfig,
) -> Result<Option<Arc<dyn VisionBackend>>, FlyerError> {
    let Some(key) = std::env::var("GOOGLE_VISION_API_KEY")
        .ok()
        .filter(|k| !k.is_empty())
    else {
        return Ok(None);
    };

    let backend = AnnotateBackend::new(
        key,
        DEFAULT_ANNOTATE_ENDPOINT,
        Duration::from_secs(config.api_timeout_secs),
    )
    .map_err(|e| FlyerError::InvalidConfig(e.to_string()))?;
    Ok(Some(Arc::new(backend)))
}
