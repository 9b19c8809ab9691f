//! Image-annotation vision backend.
//!
//! The second backend shape: a dedicated annotation API (Google Cloud Vision
//! `images:annotate` with `TEXT_DETECTION`) instead of a chat model with an
//! image attachment. The first annotation in the response covers the full
//! recognised text; an empty annotation list means the image contained no
//! readable text and yields `Ok("")`.
//!
//! The `instruction` and sampling options from the trait are accepted and
//! ignored — annotation APIs take no prompt and no temperature.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::{BackendError, CompletionOptions, VisionBackend};

/// Default annotation endpoint.
pub const DEFAULT_ANNOTATE_ENDPOINT: &str = "https://vision.googleapis.com/v1/images:annotate";

/// Annotation-API client bound to one endpoint and key.
pub struct AnnotateBackend {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl std::fmt::Debug for AnnotateBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotateBackend")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

// ── Wire structs ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateResult>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateResult {
    #[serde(default)]
    text_annotations: Vec<TextAnnotation>,
    error: Option<ApiStatus>,
}

#[derive(Deserialize)]
struct TextAnnotation {
    #[serde(default)]
    description: String,
}

#[derive(Deserialize)]
struct ApiStatus {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

impl AnnotateBackend {
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(AnnotateBackend {
            http,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl VisionBackend for AnnotateBackend {
    fn name(&self) -> &'static str {
        "annotate"
    }

    async fn recognize_text(
        &self,
        image: &[u8],
        _mime: &str,
        _instruction: &str,
        _options: &CompletionOptions,
    ) -> Result<String, BackendError> {
        let body = json!({
            "requests": [{
                "image": { "content": STANDARD.encode(image) },
                "features": [{ "type": "TEXT_DETECTION", "maxResults": 1 }]
            }]
        });

        let response = self
            .http
            .post(format!("{}?key={}", self.endpoint, self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: AnnotateResponse = response
            .json()
            .await
            .map_err(|e| BackendError::MalformedResponse(e.to_string()))?;

        let result = parsed
            .responses
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::MalformedResponse("empty responses array".into()))?;

        if let Some(error) = result.error {
            return Err(BackendError::Api {
                status: error.code as u16,
                message: error.message,
            });
        }

        // The first annotation is the full-text block; the rest are
        // per-word boxes we have no use for.
        let text = result
            .text_annotations
            .into_iter()
            .next()
            .map(|a| a.description)
            .unwrap_or_default();
        debug!(chars = text.len(), "annotation response received");
        Ok(text)
    }
}
