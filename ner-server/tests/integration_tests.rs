use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use axum::body::Bytes;
use axum_test::TestServer;
use http::StatusCode;
use ner::ml::MLError;
use ner::pipeline::{Entity, EntityRecognizer, Position};
use ner_server::config::ServerConfig;
use ner_server::{AppState, create_router};
use serde_json::{Value, json};

/// Tags every whitespace separated word as `PRS` with a fixed score
///
/// A non-zero delay keeps each batch busy long enough to overlap with others.
struct WordTagger {
    calls: AtomicUsize,
    delay: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl WordTagger {
    fn new() -> Self {
        Self::slow(Duration::ZERO)
    }

    fn slow(delay: Duration) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    fn tag(text: &str) -> Vec<Entity> {
        let mut entities = Vec::new();
        let mut offset = 0;
        for (index, word) in text.split(' ').enumerate() {
            let len = word.chars().count();
            if len > 0 {
                entities.push(Entity {
                    text: word.to_string(),
                    label: "PRS".to_string(),
                    score: 0.875,
                    position: Position {
                        index: index + 1,
                        start: offset,
                        end: offset + len,
                    },
                });
            }
            offset += len + 1;
        }
        entities
    }
}

impl EntityRecognizer for WordTagger {
    fn recognize_batch(&self, texts: &[String]) -> ner::Result<Vec<Vec<Entity>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        let results = texts.iter().map(|text| Self::tag(text)).collect();
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(results)
    }

    fn model_id(&self) -> &str {
        "test/word-tagger"
    }
}

struct FailingRecognizer;

impl EntityRecognizer for FailingRecognizer {
    fn recognize_batch(&self, _texts: &[String]) -> ner::Result<Vec<Vec<Entity>>> {
        Err(MLError::inference("logits contain NaN").into())
    }

    fn model_id(&self) -> &str {
        "test/failing"
    }
}

/// Drops the last result
struct ShortRecognizer;

impl EntityRecognizer for ShortRecognizer {
    fn recognize_batch(&self, texts: &[String]) -> ner::Result<Vec<Vec<Entity>>> {
        Ok(vec![Vec::new(); texts.len().saturating_sub(1)])
    }

    fn model_id(&self) -> &str {
        "test/short"
    }
}

fn create_test_server_with(
    recognizer: Arc<dyn EntityRecognizer>,
    config: ServerConfig,
) -> TestServer {
    let state = Arc::new(AppState::new(recognizer, config));
    TestServer::new(create_router(state)).expect("Failed to create test server")
}

fn create_test_server(recognizer: Arc<dyn EntityRecognizer>) -> TestServer {
    create_test_server_with(recognizer, ServerConfig::default())
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server(Arc::new(WordTagger::new()));

    let response = server.get("/health").await;

    response.assert_status_ok();
    assert_eq!(response.header("cache-control"), "no-cache");
    let body: Value = response.json();
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_recognize_preserves_order_and_length() {
    let server = create_test_server(Arc::new(WordTagger::new()));

    let response = server
        .post("/ner")
        .json(&json!(["Erik Stockholm", "", "Malmö"]))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let results = body.as_array().expect("top level array");
    assert_eq!(results.len(), 3);

    assert_eq!(
        results[0],
        json!([
            {"text": "Erik", "label": "PRS", "score": 0.875, "position": {"index": 1, "start": 0, "end": 4}},
            {"text": "Stockholm", "label": "PRS", "score": 0.875, "position": {"index": 2, "start": 5, "end": 14}}
        ])
    );
    assert_eq!(results[1], json!([]));
    // Offsets count characters, not bytes
    assert_eq!(results[2][0]["position"], json!({"index": 1, "start": 0, "end": 5}));
}

#[tokio::test]
async fn test_scores_are_probabilities() {
    let server = create_test_server(Arc::new(WordTagger::new()));

    let response = server.post("/ner").json(&json!(["a b c"])).await;

    response.assert_status_ok();
    let body: Value = response.json();
    for entity in body[0].as_array().unwrap() {
        let score = entity["score"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&score));
    }
}

#[tokio::test]
async fn test_empty_batch_skips_inference() {
    let tagger = Arc::new(WordTagger::new());
    let server = create_test_server(tagger.clone());

    let response = server.post("/ner").json(&json!([])).await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!([]));
    assert_eq!(tagger.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let tagger = Arc::new(WordTagger::new());
    let server = create_test_server(tagger.clone());

    let response = server
        .post("/ner")
        .bytes(Bytes::from_static(b"[\"unterminated"))
        .content_type("application/json")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "bad_request");
    assert_eq!(tagger.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_wrong_shape_is_rejected() {
    let tagger = Arc::new(WordTagger::new());
    let server = create_test_server(tagger.clone());

    for payload in [
        json!({"texts": ["Erik"]}),
        json!([1, 2, 3]),
        json!(["Erik", null]),
        json!("Erik"),
    ] {
        let response = server.post("/ner").json(&payload).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.json::<Value>()["error"], "validation_error");
    }
    assert_eq!(tagger.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_content_type_is_rejected() {
    let tagger = Arc::new(WordTagger::new());
    let server = create_test_server(tagger.clone());

    let response = server.post("/ner").text("[\"Erik\"]").await;

    response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(
        response.json::<Value>()["error"],
        "unsupported_media_type"
    );
    assert_eq!(tagger.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let tagger = Arc::new(WordTagger::new());
    let config = ServerConfig {
        max_request_size: 64,
        ..Default::default()
    };
    let server = create_test_server_with(tagger.clone(), config);

    let response = server.post("/ner").json(&json!(["x".repeat(256)])).await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(tagger.calls.load(Ordering::SeqCst), 0);

    // Small bodies still go through
    server.post("/ner").json(&json!(["ok"])).await.assert_status_ok();
}

#[tokio::test]
async fn test_inference_failure_is_internal_error() {
    let server = create_test_server(Arc::new(FailingRecognizer));

    let response = server.post("/ner").json(&json!(["Erik"])).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "recognition_error");
    assert!(body["message"].as_str().unwrap().contains("NaN"));
}

#[tokio::test]
async fn test_result_count_mismatch_is_internal_error() {
    let server = create_test_server(Arc::new(ShortRecognizer));

    let response = server.post("/ner").json(&json!(["a", "b"])).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json::<Value>()["error"], "internal_error");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_get_their_own_results() {
    let tagger = Arc::new(WordTagger::slow(Duration::from_millis(150)));
    let server = create_test_server(tagger.clone());

    let (a, b, c) = tokio::join!(
        async { server.post("/ner").json(&json!(["Erik"])).await },
        async { server.post("/ner").json(&json!(["Stockholm bor", ""])).await },
        async { server.post("/ner").json(&json!(["i"])).await },
    );

    a.assert_status_ok();
    b.assert_status_ok();
    c.assert_status_ok();
    assert_eq!(
        a.json::<Value>(),
        json!([[
            {"text": "Erik", "label": "PRS", "score": 0.875, "position": {"index": 1, "start": 0, "end": 4}}
        ]])
    );
    assert_eq!(
        b.json::<Value>(),
        json!([
            [
                {"text": "Stockholm", "label": "PRS", "score": 0.875, "position": {"index": 1, "start": 0, "end": 9}},
                {"text": "bor", "label": "PRS", "score": 0.875, "position": {"index": 2, "start": 10, "end": 13}}
            ],
            []
        ])
    );
    assert_eq!(
        c.json::<Value>(),
        json!([[
            {"text": "i", "label": "PRS", "score": 0.875, "position": {"index": 1, "start": 0, "end": 1}}
        ]])
    );
    assert_eq!(tagger.calls.load(Ordering::SeqCst), 3);
    assert!(tagger.peak.load(Ordering::SeqCst) >= 2);
}

#[tokio::test]
async fn test_unknown_routes_and_methods() {
    let server = create_test_server(Arc::new(WordTagger::new()));

    server
        .get("/missing")
        .expect_failure()
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get("/ner")
        .expect_failure()
        .await
        .assert_status(StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_openapi_spec_available() {
    let server = create_test_server(Arc::new(WordTagger::new()));

    let response = server.get("/api-docs/openapi.json").await;

    response.assert_status_ok();
    let openapi: Value = response.json();
    assert_eq!(openapi["info"]["title"], "NER Service API");
    assert!(openapi["paths"]["/health"]["get"].is_object());
    assert!(openapi["paths"]["/ner"]["post"].is_object());
}

#[tokio::test]
async fn test_swagger_docs_available() {
    let server = create_test_server(Arc::new(WordTagger::new()));

    server.get("/docs/").await.assert_status_ok();
}
