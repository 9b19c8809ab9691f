//! Configuration for the flyer-extraction pipeline.
//!
//! All behaviour is controlled through [`PipelineConfig`], built via its
//! [`PipelineConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across requests and to diff two runs to
//! understand why their outputs differ.
//!
//! Backend clients are intentionally *not* global state: the original
//! service kept lazily-initialised clients in process-wide fields, while
//! here the config is handed to [`crate::process::FlyerPipeline::new`] which
//! resolves backends exactly once. Absent credentials are a valid, degraded
//! state — construction succeeds and every call fails fast with
//! `ServiceUnavailable`.

use crate::backend::openai::{DEFAULT_CHAT_MODEL, DEFAULT_VISION_MODEL};
use crate::backend::{ChatBackend, VisionBackend};
use crate::error::FlyerError;
use std::fmt;
use std::sync::Arc;

/// Configuration for a [`crate::process::FlyerPipeline`].
///
/// # Example
/// ```rust
/// use flyer2event::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .api_key("gsk_...")
///     .temperature(0.1)
///     .extraction_max_tokens(1000)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct PipelineConfig {
    /// API key for the OpenAI-compatible endpoint. If None, the environment
    /// (`GROQ_API_KEY`) is consulted when the pipeline is constructed.
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible endpoint. Default: the Groq API.
    pub api_base: String,

    /// Vision-capable model used for text recognition.
    pub vision_model: String,

    /// Text model used for structured extraction.
    pub chat_model: String,

    /// Sampling temperature for both calls. Default: 0.1.
    ///
    /// Near-zero keeps the model faithful to what is actually on the flyer;
    /// higher values invite invented dates and venues.
    pub temperature: f32,

    /// Token budget for the recognition call. Default: 2000.
    ///
    /// Flyers are text-light; 2000 tokens covers even dense poster text.
    pub recognition_max_tokens: u32,

    /// Token budget for the extraction call. Default: 1000.
    ///
    /// The schema output is bounded; setting this too low truncates the JSON
    /// mid-object and lands the upload in manual review for no reason.
    pub extraction_max_tokens: u32,

    /// Per-call HTTP timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Custom extraction system prompt. If None, uses the built-in default.
    pub system_prompt: Option<String>,

    /// Pre-constructed vision backend. Takes precedence over credentials.
    pub vision_backend: Option<Arc<dyn VisionBackend>>,

    /// Pre-constructed chat backend. Takes precedence over credentials.
    pub chat_backend: Option<Arc<dyn ChatBackend>>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            api_key: None,
            api_base: crate::backend::openai::DEFAULT_API_BASE.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            temperature: 0.1,
            recognition_max_tokens: 2000,
            extraction_max_tokens: 1000,
            api_timeout_secs: 60,
            system_prompt: None,
            vision_backend: None,
            chat_backend: None,
        }
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("vision_model", &self.vision_model)
            .field("chat_model", &self.chat_model)
            .field("temperature", &self.temperature)
            .field("recognition_max_tokens", &self.recognition_max_tokens)
            .field("extraction_max_tokens", &self.extraction_max_tokens)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field(
                "vision_backend",
                &self.vision_backend.as_ref().map(|b| b.name()),
            )
            .field("chat_backend", &self.chat_backend.as_ref().map(|b| b.name()))
            .finish()
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.config.api_base = base.into();
        self
    }

    pub fn vision_model(mut self, model: impl Into<String>) -> Self {
        self.config.vision_model = model.into();
        self
    }

    pub fn chat_model(mut self, model: impl Into<String>) -> Self {
        self.config.chat_model = model.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn recognition_max_tokens(mut self, n: u32) -> Self {
        self.config.recognition_max_tokens = n;
        self
    }

    pub fn extraction_max_tokens(mut self, n: u32) -> Self {
        self.config.extraction_max_tokens = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs.max(1);
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn vision_backend(mut self, backend: Arc<dyn VisionBackend>) -> Self {
        self.config.vision_backend = Some(backend);
        self
    }

    pub fn chat_backend(mut self, backend: Arc<dyn ChatBackend>) -> Self {
        self.config.chat_backend = Some(backend);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, FlyerError> {
        let c = &self.config;
        if c.recognition_max_tokens == 0 || c.extraction_max_tokens == 0 {
            return Err(FlyerError::InvalidConfig(
                "max_tokens budgets must be ≥ 1".into(),
            ));
        }
        if c.api_base.is_empty() {
            return Err(FlyerError::InvalidConfig("api_base must not be empty".into()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_constants() {
        let c = PipelineConfig::default();
        assert_eq!(c.temperature, 0.1);
        assert_eq!(c.recognition_max_tokens, 2000);
        assert_eq!(c.extraction_max_tokens, 1000);
        assert_eq!(c.api_timeout_secs, 60);
        assert!(c.api_base.contains("groq"));
    }

    #[test]
    fn temperature_is_clamped() {
        let c = PipelineConfig::builder().temperature(5.0).build().unwrap();
        assert_eq!(c.temperature, 2.0);
        let c = PipelineConfig::builder().temperature(-1.0).build().unwrap();
        assert_eq!(c.temperature, 0.0);
    }

    #[test]
    fn zero_token_budget_is_rejected() {
        let err = PipelineConfig::builder()
            .extraction_max_tokens(0)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("max_tokens"));
    }

    #[test]
    fn debug_redacts_api_key() {
        let c = PipelineConfig::builder().api_key("secret-key").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("secret-key"));
        assert!(dbg.contains("<redacted>"));
    }
}
