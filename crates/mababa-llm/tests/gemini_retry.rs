//! Gemini client against a local fake endpoint

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use mababa_llm::{
    CompletionRequest, Error, GeminiConfig, GeminiProvider, LlmProvider, Message, RetryPolicy,
    SecureString, Sleeper,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

#[async_trait::async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

#[derive(Clone)]
struct FakeGemini {
    calls: Arc<AtomicU32>,
    failures: u32,
    failure_status: StatusCode,
    seen: Arc<Mutex<Vec<(String, Option<String>)>>>,
}

async fn generate(
    State(fake): State<FakeGemini>,
    Path(call): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    Json(_body): Json<serde_json::Value>,
) -> impl IntoResponse {
    fake.seen
        .lock()
        .unwrap()
        .push((call, query.get("key").cloned()));
    let n = fake.calls.fetch_add(1, Ordering::SeqCst) + 1;
    if n <= fake.failures {
        return (
            fake.failure_status,
            Json(serde_json::json!({
                "error": {"code": fake.failure_status.as_u16(), "message": "The model is overloaded.", "status": "UNAVAILABLE"}
            })),
        );
    }
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Hello from the fake"}]},
                "finishReason": "STOP"
            }]
        })),
    )
}

async fn spawn_fake(failures: u32, failure_status: StatusCode) -> (String, FakeGemini) {
    let fake = FakeGemini {
        calls: Arc::new(AtomicU32::new(0)),
        failures,
        failure_status,
        seen: Arc::new(Mutex::new(Vec::new())),
    };
    let app = Router::new()
        .route("/v1beta/models/:call", post(generate))
        .with_state(fake.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/v1beta", addr), fake)
}

fn request() -> CompletionRequest {
    CompletionRequest::new("gemini-2.5-flash-lite")
        .with_message(Message::system("You are MaBaba"))
        .with_message(Message::user("Find me a stroller"))
}

#[tokio::test]
async fn test_503_four_times_then_success_sleeps_four_times() {
    let (base_url, fake) = spawn_fake(4, StatusCode::SERVICE_UNAVAILABLE).await;
    let sleeper = Arc::new(RecordingSleeper::default());
    let provider = GeminiProvider::new(GeminiConfig::new("test-key-123456").with_base_url(base_url))
        .unwrap()
        .with_sleeper(sleeper.clone());

    let response = provider
        .complete(request().with_retry(RetryPolicy::default()))
        .await
        .unwrap();

    assert_eq!(response.content, "Hello from the fake");
    assert_eq!(fake.calls.load(Ordering::SeqCst), 5);
    assert_eq!(
        *sleeper.delays.lock().unwrap(),
        vec![
            Duration::from_secs(1),
            Duration::from_secs(7),
            Duration::from_secs(49),
            Duration::from_secs(343),
        ]
    );

    let seen = fake.seen.lock().unwrap();
    assert_eq!(seen[0].0, "gemini-2.5-flash-lite:generateContent");
    assert_eq!(seen[0].1.as_deref(), Some("test-key-123456"));
}

#[tokio::test]
async fn test_retry_budget_exhausted() {
    let (base_url, fake) = spawn_fake(u32::MAX, StatusCode::TOO_MANY_REQUESTS).await;
    let sleeper = Arc::new(RecordingSleeper::default());
    let provider = GeminiProvider::new(GeminiConfig::new("test-key-123456").with_base_url(base_url))
        .unwrap()
        .with_sleeper(sleeper.clone());

    let policy = RetryPolicy::new(3, 7.0, 1.0, [429]).unwrap();
    let err = provider
        .complete(request().with_retry(policy))
        .await
        .unwrap_err();

    assert!(err.is_exhausted());
    assert_eq!(err.status(), Some(429));
    assert_eq!(fake.calls.load(Ordering::SeqCst), 3);
    assert_eq!(sleeper.delays.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_bad_request_is_not_retried() {
    let (base_url, fake) = spawn_fake(1, StatusCode::BAD_REQUEST).await;
    let sleeper = Arc::new(RecordingSleeper::default());
    let provider = GeminiProvider::new(GeminiConfig::new("test-key-123456").with_base_url(base_url))
        .unwrap()
        .with_sleeper(sleeper.clone());

    let err = provider.complete(request()).await.unwrap_err();

    assert!(matches!(err, Error::Http { status: 400, .. }));
    assert_eq!(fake.calls.load(Ordering::SeqCst), 1);
    assert!(sleeper.delays.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_key_never_reaches_endpoint() {
    let (base_url, fake) = spawn_fake(0, StatusCode::OK).await;
    let provider = GeminiProvider::new(
        GeminiConfig::default()
            .with_api_key(None::<SecureString>)
            .with_base_url(base_url),
    )
    .unwrap();

    let err = provider.complete(request()).await.unwrap_err();

    assert!(matches!(err, Error::NotConfigured(_)));
    assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
}
