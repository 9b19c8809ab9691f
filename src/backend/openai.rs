//! OpenAI-compatible chat-completions backend.
//!
//! Speaks the `/chat/completions` wire format, which Groq (the default
//! endpoint), OpenAI, and most self-hosted gateways share. The same client
//! serves both capabilities: vision by attaching the image as a base64 data
//! URI content part, chat by sending plain system + user turns.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{BackendError, ChatBackend, CompletionOptions, VisionBackend};

/// Default API base, matching the marketplace's production configuration.
pub const DEFAULT_API_BASE: &str = "https://api.groq.com/openai/v1";

/// Default vision-capable model at the default endpoint.
pub const DEFAULT_VISION_MODEL: &str = "meta-llama/llama-4-scout-17b-16e-instruct";

/// Default text model at the default endpoint.
pub const DEFAULT_CHAT_MODEL: &str = "llama-3.3-70b-versatile";

/// Chat-completions client bound to one endpoint and key.
pub struct OpenAiCompatBackend {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
    vision_model: String,
    chat_model: String,
}

impl std::fmt::Debug for OpenAiCompatBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatBackend")
            .field("api_base", &self.api_base)
            .field("vision_model", &self.vision_model)
            .field("chat_model", &self.chat_model)
            .finish()
    }
}

// ── Wire structs ─────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: MessageContent,
}

#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    ImageUrl { image_url: ImageUrl },
    Text { text: String },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiCompatBackend {
    pub fn new(
        api_key: impl Into<String>,
        api_base: impl Into<String>,
        vision_model: impl Into<String>,
        chat_model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(OpenAiCompatBackend {
            http,
            api_base: api_base.into(),
            api_key: api_key.into(),
            vision_model: vision_model.into(),
            chat_model: chat_model.into(),
        })
    }

    /// Issue one chat-completions request and return the first choice's
    /// content, or `""` when the API returned no choices.
    async fn completions(&self, request: &ChatRequest) -> Result<String, BackendError> {
        let response = self
            .http
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(request)
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

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| BackendError::MalformedResponse(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        debug!(chars = content.len(), "chat-completions response received");
        Ok(content)
    }
}

#[async_trait]
impl VisionBackend for OpenAiCompatBackend {
    fn name(&self) -> &'static str {
        "openai-compat"
    }

    async fn recognize_text(
        &self,
        image: &[u8],
        mime: &str,
        instruction: &str,
        options: &CompletionOptions,
    ) -> Result<String, BackendError> {
        let data_uri = format!("data:{mime};base64,{}", STANDARD.encode(image));

        // Image first, then the instruction, as a single user turn.
        let request = ChatRequest {
            model: self.vision_model.clone(),
            messages: vec![Message {
                role: "user",
                content: MessageContent::Parts(vec![
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: data_uri },
                    },
                    ContentPart::Text {
                        text: instruction.to_string(),
                    },
                ]),
            }],
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        self.completions(&request).await
    }
}

#[async_trait]
impl ChatBackend for OpenAiCompatBackend {
    fn name(&self) -> &'static str {
        "openai-compat"
    }

    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, BackendError> {
        let request = ChatRequest {
            model: self.chat_model.clone(),
            messages: vec![
                Message {
                    role: "system",
                    content: MessageContent::Text(system_prompt.to_string()),
                },
                Message {
                    role: "user",
                    content: MessageContent::Text(user_prompt.to_string()),
                },
            ],
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        self.completions(&request).await
    }
}
