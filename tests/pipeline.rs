//! End-to-end pipeline tests with injected mock backends.
//!
//! Every scenario runs against in-process mocks plugged in through
//! `PipelineConfig::{vision_backend,chat_backend}` — the same seam a caller
//! uses to swap providers — so the full orchestration path is exercised
//! without network access. A live-API smoke test at the bottom is gated
//! behind `E2E_ENABLED` and does not run in CI unless explicitly requested.
//!
//! Run the live test with:
//!   E2E_ENABLED=1 GROQ_API_KEY=... cargo test --test pipeline -- --nocapture

use async_trait::async_trait;
use flyer2event::{
    BackendError, ChatBackend, CompletionOptions, EventCategory, FlyerError, FlyerPipeline,
    PipelineConfig, VisionBackend,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ── Mock backends ────────────────────────────────────────────────────────

/// Vision backend returning a fixed recognition result.
struct StaticVision {
    text: String,
    calls: AtomicUsize,
}

impl StaticVision {
    fn new(text: &str) -> Arc<Self> {
        Arc::new(StaticVision {
            text: text.to_string(),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl VisionBackend for StaticVision {
    fn name(&self) -> &'static str {
        "static-vision"
    }

    async fn recognize_text(
        &self,
        _image: &[u8],
        _mime: &str,
        _instruction: &str,
        _options: &CompletionOptions,
    ) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone())
    }
}

/// Vision backend whose every call errors.
struct FailingVision;

#[async_trait]
impl VisionBackend for FailingVision {
    fn name(&self) -> &'static str {
        "failing-vision"
    }

    async fn recognize_text(
        &self,
        _image: &[u8],
        _mime: &str,
        _instruction: &str,
        _options: &CompletionOptions,
    ) -> Result<String, BackendError> {
        Err(BackendError::Api {
            status: 500,
            message: "backend exploded".into(),
        })
    }
}

/// Chat backend returning a fixed completion.
struct StaticChat {
    response: String,
    calls: AtomicUsize,
}

impl StaticChat {
    fn new(response: &str) -> Arc<Self> {
        Arc::new(StaticChat {
            response: response.to_string(),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ChatBackend for StaticChat {
    fn name(&self) -> &'static str {
        "static-chat"
    }

    async fn complete(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
        _options: &CompletionOptions,
    ) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}

/// Chat backend that must never be reached.
struct PanickingChat;

#[async_trait]
impl ChatBackend for PanickingChat {
    fn name(&self) -> &'static str {
        "panicking-chat"
    }

    async fn complete(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
        _options: &CompletionOptions,
    ) -> Result<String, BackendError> {
        panic!("chat backend must not be called in this scenario");
    }
}

/// Chat backend whose every call errors.
struct FailingChat;

#[async_trait]
impl ChatBackend for FailingChat {
    fn name(&self) -> &'static str {
        "failing-chat"
    }

    async fn complete(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
        _options: &CompletionOptions,
    ) -> Result<String, BackendError> {
        Err(BackendError::Api {
            status: 503,
            message: "model overloaded".into(),
        })
    }
}

fn pipeline_with(
    vision: Arc<dyn VisionBackend>,
    chat: Arc<dyn ChatBackend>,
) -> FlyerPipeline {
    let config = PipelineConfig::builder()
        .vision_backend(vision)
        .chat_backend(chat)
        .build()
        .expect("valid config");
    FlyerPipeline::new(config).expect("pipeline must construct")
}

/// A tiny JPEG-signature buffer; the mocks never look at the pixels.
fn jpeg_bytes() -> Vec<u8> {
    vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]
}

const GOOD_RESPONSE: &str = r#"{
    "title": "Summer Jazz Festival",
    "startDate": "2025-07-20T19:00:00",
    "category": "music",
    "priceInfo": "Free",
    "locationName": "Central Park",
    "confidence": 85
}"#;

// ── Scenario A: happy path ───────────────────────────────────────────────

#[tokio::test]
async fn full_pipeline_happy_path() {
    let vision = StaticVision::new("Summer Jazz Festival, July 20 2025, Central Park, Free entry");
    let chat = StaticChat::new(GOOD_RESPONSE);
    let pipeline = pipeline_with(vision.clone(), chat.clone());

    let candidate = pipeline
        .process_flyer(jpeg_bytes())
        .await
        .expect("pipeline should succeed");

    assert!(!candidate.needs_manual_review);
    assert_eq!(candidate.title.as_deref(), Some("Summer Jazz Festival"));
    assert_eq!(candidate.start_date.as_deref(), Some("2025-07-20T19:00:00"));
    assert_eq!(candidate.category, Some(EventCategory::Music));
    assert_eq!(candidate.confidence, Some(85));
    assert_eq!(
        candidate.extracted_text,
        "Summer Jazz Festival, July 20 2025, Central Park, Free entry"
    );
    assert_eq!(vision.calls.load(Ordering::SeqCst), 1);
    assert_eq!(chat.calls.load(Ordering::SeqCst), 1);
}

// ── Scenario B: no text recognised ───────────────────────────────────────

#[tokio::test]
async fn empty_recognition_short_circuits_extraction() {
    let pipeline = pipeline_with(StaticVision::new(""), Arc::new(PanickingChat));

    let candidate = pipeline
        .process_flyer(jpeg_bytes())
        .await
        .expect("empty text is not an error");

    assert!(candidate.needs_manual_review);
    assert_eq!(candidate.confidence, Some(0));
    assert_eq!(candidate.extracted_text, "");
    assert_eq!(candidate.title, None);
}

#[tokio::test]
async fn whitespace_only_text_skips_the_backend() {
    let pipeline = pipeline_with(StaticVision::new("   \n\t  "), Arc::new(PanickingChat));

    let candidate = pipeline.process_flyer(jpeg_bytes()).await.unwrap();

    assert!(candidate.needs_manual_review);
    assert_eq!(candidate.confidence, Some(0));
    // The audit trail is the input verbatim, not a trimmed copy.
    assert_eq!(candidate.extracted_text, "   \n\t  ");
}

// ── Scenario C: backend not configured ───────────────────────────────────

#[tokio::test]
async fn unconfigured_vision_fails_fast_before_any_call() {
    // Construction reads the environment; clear it so the pipeline really is
    // degraded regardless of where the tests run.
    std::env::remove_var("GROQ_API_KEY");
    std::env::remove_var("GOOGLE_VISION_API_KEY");

    let config = PipelineConfig::builder()
        .chat_backend(Arc::new(PanickingChat) as Arc<dyn ChatBackend>)
        .build()
        .unwrap();
    let pipeline = FlyerPipeline::new(config).expect("degraded construction must succeed");

    assert!(!pipeline.is_vision_configured());
    let err = pipeline.process_flyer(jpeg_bytes()).await.unwrap_err();
    assert!(matches!(err, FlyerError::ServiceUnavailable { .. }), "got: {err}");
}

#[tokio::test]
async fn both_backends_absent_is_a_valid_degraded_state() {
    std::env::remove_var("GROQ_API_KEY");
    std::env::remove_var("GOOGLE_VISION_API_KEY");

    let pipeline =
        FlyerPipeline::new(PipelineConfig::default()).expect("must construct without credentials");

    assert!(!pipeline.is_vision_configured());
    assert!(!pipeline.is_chat_configured());
    assert!(pipeline.process_flyer(jpeg_bytes()).await.is_err());
    assert!(pipeline.extract_event("some text").await.is_err());
}

// ── Recognition failures are hard ────────────────────────────────────────

#[tokio::test]
async fn recognition_failure_propagates_without_reaching_extraction() {
    let pipeline = pipeline_with(Arc::new(FailingVision), Arc::new(PanickingChat));

    let err = pipeline.process_flyer(jpeg_bytes()).await.unwrap_err();
    match err {
        FlyerError::RecognitionFailed { reason } => {
            assert!(reason.contains("500"), "got: {reason}");
        }
        other => panic!("expected RecognitionFailed, got: {other}"),
    }
}

// ── Extraction failures are soft ─────────────────────────────────────────

#[tokio::test]
async fn chat_backend_error_degrades_to_manual_review() {
    let pipeline = pipeline_with(StaticVision::new("JAZZ NIGHT July 20"), Arc::new(FailingChat));

    let candidate = pipeline
        .process_flyer(jpeg_bytes())
        .await
        .expect("extraction failure must not abort the upload");

    assert!(candidate.needs_manual_review);
    assert_eq!(candidate.confidence, Some(0));
    assert_eq!(candidate.extracted_text, "JAZZ NIGHT July 20");
}

#[tokio::test]
async fn prose_only_response_degrades_to_manual_review() {
    let chat = StaticChat::new("Sorry, I could not find anything that looks like an event.");
    let pipeline = pipeline_with(StaticVision::new("some flyer text"), chat);

    let candidate = pipeline.process_flyer(jpeg_bytes()).await.unwrap();

    assert!(candidate.needs_manual_review);
    assert_eq!(candidate.confidence, Some(0));
    assert_eq!(candidate.extracted_text, "some flyer text");
    assert_eq!(candidate.title, None);
}

#[tokio::test]
async fn missing_start_date_flags_review_even_at_high_confidence() {
    let chat = StaticChat::new(r#"{"title":"Mystery Gig","confidence":95}"#);
    let pipeline = pipeline_with(StaticVision::new("MYSTERY GIG — date TBA"), chat);

    let candidate = pipeline.process_flyer(jpeg_bytes()).await.unwrap();

    assert!(candidate.needs_manual_review);
    assert_eq!(candidate.title.as_deref(), Some("Mystery Gig"));
    assert_eq!(candidate.confidence, Some(95));
}

#[tokio::test]
async fn first_json_object_wins_when_model_emits_two() {
    let chat = StaticChat::new(
        r#"Candidate one: {"title":"First","startDate":"2025-07-20T19:00:00","confidence":80}
           but maybe also {"title":"Second","startDate":"2025-08-01T20:00:00","confidence":90}"#,
    );
    let pipeline = pipeline_with(StaticVision::new("two events on one flyer"), chat);

    let candidate = pipeline.process_flyer(jpeg_bytes()).await.unwrap();

    assert_eq!(candidate.title.as_deref(), Some("First"));
    assert_eq!(candidate.confidence, Some(80));
}

// ── Idempotence ──────────────────────────────────────────────────────────

#[tokio::test]
async fn extraction_is_idempotent_for_a_deterministic_backend() {
    let chat = StaticChat::new(GOOD_RESPONSE);
    let pipeline = pipeline_with(StaticVision::new("unused"), chat);

    let first = pipeline.extract_event("Summer Jazz Festival").await.unwrap();
    let second = pipeline.extract_event("Summer Jazz Festival").await.unwrap();
    assert_eq!(first, second);
}

// ── Wire shape ───────────────────────────────────────────────────────────

#[tokio::test]
async fn candidate_serialises_with_camel_case_wire_keys() {
    let chat = StaticChat::new(GOOD_RESPONSE);
    let pipeline = pipeline_with(StaticVision::new("text"), chat);

    let candidate = pipeline.process_flyer(jpeg_bytes()).await.unwrap();
    let json = serde_json::to_value(&candidate).unwrap();

    assert_eq!(json["needsManualReview"], false);
    assert_eq!(json["startDate"], "2025-07-20T19:00:00");
    assert_eq!(json["locationName"], "Central Park");
    assert_eq!(json["extractedText"], "text");
    assert!(json.get("endDate").is_none(), "absent fields must be omitted");
}

// ── Live smoke test (gated) ──────────────────────────────────────────────

/// Requires E2E_ENABLED=1, GROQ_API_KEY, and a flyer image at
/// `test_cases/flyer.jpg`.
#[tokio::test]
async fn live_groq_smoke_test() {
    if std::env::var("E2E_ENABLED").is_err() {
        println!("SKIP — set E2E_ENABLED=1 to run live tests");
        return;
    }
    if std::env::var("GROQ_API_KEY").is_err() {
        println!("SKIP — GROQ_API_KEY not set");
        return;
    }
    let path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases/flyer.jpg");
    if !path.exists() {
        println!("SKIP — test file not found: {}", path.display());
        return;
    }

    let bytes = std::fs::read(&path).expect("read flyer bytes");
    let pipeline = FlyerPipeline::new(PipelineConfig::default()).expect("pipeline must construct");
    assert!(pipeline.is_vision_configured());

    let candidate = pipeline
        .process_flyer(bytes)
        .await
        .expect("live pipeline should succeed");

    assert!(
        !candidate.extracted_text.trim().is_empty(),
        "a real flyer should yield some recognised text"
    );
    println!(
        "live candidate (review={}):\n{}",
        candidate.needs_manual_review,
        serde_json::to_string_pretty(&candidate).unwrap()
    );
}
