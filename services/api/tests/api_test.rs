use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use api_lib::config::Config;
use api_lib::web::{build_router, AppState};
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use bytes::Bytes;
use serde_json::{json, Value};
use study_relay_core::domain::{ChatRole, ChatTurn, DocumentText};
use study_relay_core::ports::{
    DocumentFetcher, ModelClient, PortError, PortResult, TextExtractor,
};
use tower::ServiceExt;

const SCANNED_MESSAGE: &str = "No text extracted from file. The PDF might be scanned or empty.";

//=========================================================================================
// Fake ports
//=========================================================================================

#[derive(Default)]
struct FakeFetcher {
    calls: AtomicUsize,
    fail_with: Option<String>,
}

#[async_trait::async_trait]
impl DocumentFetcher for FakeFetcher {
    async fn fetch(&self, _url: &str) -> PortResult<Bytes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(message) => Err(PortError::Fetch(message.clone())),
            None => Ok(Bytes::from_static(b"%PDF-1.4")),
        }
    }
}

#[derive(Default)]
struct FakeExtractor {
    calls: AtomicUsize,
    text: String,
    fail_with: Option<String>,
}

impl FakeExtractor {
    fn returning(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Self::default()
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }
}

#[async_trait::async_trait]
impl TextExtractor for FakeExtractor {
    async fn extract_text(&self, _data: Bytes) -> PortResult<DocumentText> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(message) => Err(PortError::Extraction(message.clone())),
            None => Ok(DocumentText::new(self.text.clone())),
        }
    }
}

#[derive(Default)]
struct FakeModel {
    reply: String,
    fail_with: Option<String>,
    prompts: Mutex<Vec<String>>,
    conversations: Mutex<Vec<Vec<ChatTurn>>>,
}

impl FakeModel {
    fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            ..Self::default()
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    fn reply(&self) -> PortResult<String> {
        match &self.fail_with {
            Some(message) => Err(PortError::Provider(message.clone())),
            None => Ok(self.reply.clone()),
        }
    }

    fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len() + self.conversations.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl ModelClient for FakeModel {
    async fn generate(&self, prompt: &str) -> PortResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply()
    }

    async fn converse(&self, turns: &[ChatTurn]) -> PortResult<String> {
        self.conversations.lock().unwrap().push(turns.to_vec());
        self.reply()
    }
}

//=========================================================================================
// Harness
//=========================================================================================

struct Harness {
    fetcher: Arc<FakeFetcher>,
    extractor: Arc<FakeExtractor>,
    model: Arc<FakeModel>,
    router: Router,
}

fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse::<SocketAddr>().unwrap(),
        log_level: tracing::Level::INFO,
        service_name: "Test Relay".to_string(),
        gemini_api_key: "test-key".to_string(),
        gemini_api_base: "http://localhost:0".to_string(),
        gemini_model: "test-model".to_string(),
        fetch_timeout: None,
        cors_origin: "http://localhost:3000".to_string(),
        max_body_bytes: 1024 * 1024,
    }
}

fn harness_with(fetcher: FakeFetcher, extractor: FakeExtractor, model: FakeModel) -> Harness {
    let fetcher = Arc::new(fetcher);
    let extractor = Arc::new(extractor);
    let model = Arc::new(model);
    let state = Arc::new(AppState {
        config: Arc::new(test_config()),
        fetcher: fetcher.clone(),
        extractor: extractor.clone(),
        model: model.clone(),
    });
    Harness {
        fetcher,
        extractor,
        model,
        router: build_router(state),
    }
}

fn harness(text: &str, model: FakeModel) -> Harness {
    harness_with(FakeFetcher::default(), FakeExtractor::returning(text), model)
}

async fn post_json(router: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap();
    (status, value)
}

fn pdf_request(generate_type: Option<&str>) -> Value {
    let mut body = json!({ "file_url": "https://files.example/notes.pdf", "file_type": "PDF" });
    if let Some(generate_type) = generate_type {
        body["generate_type"] = json!(generate_type);
    }
    body
}

//=========================================================================================
// Health
//=========================================================================================

#[tokio::test]
async fn health_reports_service_name() {
    let h = harness("text", FakeModel::default());
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();

    let (status, body) = send(&h.router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok", "service": "Test Relay" }));
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let h = harness("text", FakeModel::default());
    let request = Request::builder()
        .uri("/")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .unwrap();

    let response = h.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.headers()["x-request-id"], "abc-123");
}

//=========================================================================================
// /process
//=========================================================================================

#[tokio::test]
async fn process_returns_parsed_material_from_fenced_reply() {
    let reply = "```json\n{\"summary\":\"Cells are small.\",\"key_points\":[\"cells\"]}\n```";
    let h = harness("Cells are the basic unit of life.", FakeModel::replying(reply));

    let (status, body) = post_json(&h.router, "/process", pdf_request(Some("summary"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["type"], "summary");
    assert_eq!(body["extracted_length"], 33);
    assert_eq!(
        body["ai_data"],
        json!({ "summary": "Cells are small.", "key_points": ["cells"] })
    );
    assert!(body.get("message").is_none());
}

#[tokio::test]
async fn process_defaults_to_all_mode() {
    let h = harness("Some text", FakeModel::replying("{}"));

    let (status, body) = post_json(&h.router, "/process", pdf_request(None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "all");
    let prompt = &h.model.prompts.lock().unwrap()[0];
    assert!(prompt.contains("\"flashcards\":"));
    assert!(prompt.contains("\"quiz\":"));
}

#[tokio::test]
async fn process_with_unknown_mode_echoes_it_and_uses_all_instructions() {
    let h = harness("Some text", FakeModel::replying("{\"summary\":\"s\"}"));

    let (status, body) = post_json(&h.router, "/process", pdf_request(Some("mindmap"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["type"], "mindmap");
    let prompt = &h.model.prompts.lock().unwrap()[0];
    for key in ["summary", "key_points", "quiz", "flashcards"] {
        assert!(prompt.contains(&format!("\"{key}\":")), "prompt missing {key}");
    }
}

#[tokio::test]
async fn process_degrades_unparseable_reply() {
    let reply = format!("Here you go! {}", "x".repeat(700));
    let h = harness("Some text", FakeModel::replying(&reply));

    let (status, body) = post_json(&h.router, "/process", pdf_request(Some("quiz"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    let ai_data = &body["ai_data"];
    assert_eq!(ai_data["error"], "JSON_PARSE_ERROR");
    assert_eq!(ai_data["quiz"], json!([]));
    assert_eq!(ai_data["flashcards"], json!([]));
    assert_eq!(ai_data["summary"].as_str().unwrap().chars().count(), 500);
    assert!(ai_data["summary"].as_str().unwrap().starts_with("Here you go!"));
}

#[tokio::test]
async fn process_rejects_unsupported_type_without_touching_ports() {
    let h = harness("text", FakeModel::replying("{}"));
    let body = json!({ "file_url": "https://files.example/notes.docx", "file_type": "DOCX" });

    let (status, body) = post_json(&h.router, "/process", body).await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["status"], "error");
    assert_eq!(body["kind"], "unsupported_file_type");
    assert_eq!(body["message"], "File type not supported for text extraction yet.");
    assert_eq!(h.fetcher.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.extractor.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.model.call_count(), 0);
}

#[tokio::test]
async fn process_reports_reference_types_as_pdf_only() {
    let h = harness("text", FakeModel::replying("{}"));
    let body = json!({ "file_url": "https://example.com", "file_type": "Ref_URL" });

    let (_, body) = post_json(&h.router, "/process", body).await;

    assert_eq!(body["message"], "Only PDF supported currently");
    assert_eq!(h.model.call_count(), 0);
}

#[tokio::test]
async fn process_with_empty_extraction_skips_the_model() {
    let h = harness("   \n  ", FakeModel::replying("{}"));

    let (status, body) = post_json(&h.router, "/process", pdf_request(None)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], "error");
    assert_eq!(body["kind"], "empty_content");
    assert_eq!(body["message"], SCANNED_MESSAGE);
    assert!(body.get("ai_data").is_none());
    assert_eq!(h.extractor.calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.model.call_count(), 0);
}

#[tokio::test]
async fn process_surfaces_provider_failure() {
    let h = harness("Some text", FakeModel::failing("quota exceeded"));

    let (status, body) = post_json(&h.router, "/process", pdf_request(None)).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["status"], "error");
    assert_eq!(body["kind"], "provider_failed");
    assert_eq!(body["message"], "AI Engine failed: quota exceeded");
    assert_eq!(h.model.call_count(), 1);
}

#[tokio::test]
async fn process_surfaces_fetch_failure() {
    let fetcher = FakeFetcher {
        fail_with: Some("Failed to download file: 404 Not Found".to_string()),
        ..FakeFetcher::default()
    };
    let h = harness_with(fetcher, FakeExtractor::returning("text"), FakeModel::default());

    let (status, body) = post_json(&h.router, "/process", pdf_request(None)).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["kind"], "fetch_failed");
    assert_eq!(body["message"], "Failed to download file: 404 Not Found");
    assert_eq!(h.extractor.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn process_surfaces_extraction_failure() {
    let extractor = FakeExtractor::failing("Failed to extract text from PDF: invalid file header");
    let h = harness_with(FakeFetcher::default(), extractor, FakeModel::replying("{}"));

    let (status, body) = post_json(&h.router, "/process", pdf_request(None)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], "error");
    assert_eq!(body["kind"], "extraction_failed");
    assert_eq!(body["message"], "Failed to extract text from PDF: invalid file header");
    assert_eq!(h.fetcher.calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.extractor.calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.model.call_count(), 0);
}

#[tokio::test]
async fn process_degrades_an_empty_model_reply() {
    let h = harness("Some text", FakeModel::replying(""));

    let (status, body) = post_json(&h.router, "/process", pdf_request(None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["ai_data"]["error"], "JSON_PARSE_ERROR");
    assert_eq!(body["ai_data"]["summary"], "");
}

#[tokio::test]
async fn process_keeps_a_quiz_item_without_an_answer() {
    let reply = r#"{"summary":"Long useful summary","quiz":[{"question":"q","options":["a","b","c","d"]}]}"#;
    let h = harness("Some text", FakeModel::replying(reply));

    let (status, body) = post_json(&h.router, "/process", pdf_request(Some("all"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ai_data"], serde_json::from_str::<Value>(reply).unwrap());
}

#[tokio::test]
async fn process_rejects_malformed_body_with_json_envelope() {
    let h = harness("text", FakeModel::default());

    let (status, body) = post_json(&h.router, "/process", json!({ "file_type": "PDF" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(body["kind"], "invalid_request");
    assert_eq!(h.fetcher.calls.load(Ordering::SeqCst), 0);
}

//=========================================================================================
// /chat
//=========================================================================================

#[tokio::test]
async fn chat_replays_history_after_persona_pair() {
    let h = harness("Mitochondria produce ATP.", FakeModel::replying("  They make energy.  "));
    let body = json!({
        "file_url": "https://files.example/bio.pdf",
        "file_type": "PDF",
        "message": "C",
        "history": [
            { "role": "user", "content": "A" },
            { "role": "assistant", "content": "B" }
        ]
    });

    let (status, body) = post_json(&h.router, "/chat", body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "success", "response": "They make energy." }));

    let conversations = h.model.conversations.lock().unwrap();
    let turns = &conversations[0];
    assert_eq!(turns.len(), 5);
    assert_eq!(turns[0].role, ChatRole::User);
    assert!(turns[0].content.contains("Mitochondria produce ATP."));
    assert_eq!(turns[1].role, ChatRole::Model);
    assert_eq!(
        &turns[2..],
        &[ChatTurn::user("A"), ChatTurn::model("B"), ChatTurn::user("C")]
    );
}

#[tokio::test]
async fn chat_without_history_sends_persona_and_message() {
    let h = harness("Notes", FakeModel::replying("Sure."));
    let body = json!({ "file_url": "u", "file_type": "PDF", "message": "Explain" });

    let (status, _) = post_json(&h.router, "/chat", body).await;

    assert_eq!(status, StatusCode::OK);
    let conversations = h.model.conversations.lock().unwrap();
    assert_eq!(conversations[0].len(), 3);
    assert_eq!(conversations[0][2], ChatTurn::user("Explain"));
}

#[tokio::test]
async fn chat_rejects_history_item_without_content() {
    let h = harness("Notes", FakeModel::replying("Sure."));
    let body = json!({
        "file_url": "u",
        "file_type": "PDF",
        "message": "Explain",
        "history": [{ "role": "user" }]
    });

    let (status, body) = post_json(&h.router, "/chat", body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(body["kind"], "invalid_request");
    assert_eq!(h.fetcher.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.model.call_count(), 0);
}

#[tokio::test]
async fn chat_rejects_blank_message() {
    let h = harness("Notes", FakeModel::replying("Sure."));
    let body = json!({ "file_url": "u", "file_type": "PDF", "message": "   " });

    let (status, body) = post_json(&h.router, "/chat", body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_request");
    assert_eq!(h.model.call_count(), 0);
}

#[tokio::test]
async fn chat_surfaces_provider_failure() {
    let h = harness("Notes", FakeModel::failing("401 Unauthorized"));
    let body = json!({ "file_url": "u", "file_type": "PDF", "message": "Hi" });

    let (status, body) = post_json(&h.router, "/chat", body).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["message"], "AI Engine failed: 401 Unauthorized");
}

#[tokio::test]
async fn chat_with_unsupported_type_skips_extraction() {
    let h = harness("Notes", FakeModel::replying("Sure."));
    let body = json!({ "file_url": "u", "file_type": "IMAGE", "message": "Hi" });

    let (status, body) = post_json(&h.router, "/chat", body).await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["kind"], "unsupported_file_type");
    assert_eq!(h.extractor.calls.load(Ordering::SeqCst), 0);
}
