//! Text recognition: submit the flyer image and get raw text back.
//!
//! Intentionally thin — the instruction lives in [`crate::prompts`] and the
//! wire format lives in the backend, so this stage is just the call plus the
//! error mapping. One outbound request, no retry: a failure here propagates
//! as [`FlyerError::RecognitionFailed`] because with no text there is
//! nothing downstream to work with.

use crate::backend::{CompletionOptions, VisionBackend};
use crate::config::PipelineConfig;
use crate::error::FlyerError;
use crate::pipeline::input::RawImageInput;
use crate::prompts::RECOGNITION_INSTRUCTION;
use tracing::{info, warn};

/// Recognise all text in the image via the vision backend.
///
/// An empty string is a valid outcome ("no text found"), distinct from a
/// backend failure — the extractor downstream turns it into a
/// manual-review candidate without another network call.
pub async fn recognize_text(
    backend: &dyn VisionBackend,
    image: &RawImageInput,
    config: &PipelineConfig,
) -> Result<String, FlyerError> {
    let options = CompletionOptions {
        temperature: config.temperature,
        max_tokens: config.recognition_max_tokens,
    };

    let text = backend
        .recognize_text(
            image.bytes(),
            image.media_type().as_mime(),
            RECOGNITION_INSTRUCTION,
            &options,
        )
        .await
        .map_err(|e| FlyerError::RecognitionFailed {
            reason: e.to_string(),
        })?;

    if text.is_empty() {
        warn!(backend = backend.name(), "no text recognised in image");
    } else {
        info!(
            backend = backend.name(),
            chars = text.len(),
            "recognised text from image"
        );
    }
    Ok(text)
}
