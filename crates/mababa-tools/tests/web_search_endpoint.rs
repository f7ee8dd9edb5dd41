//! web_search against a local fake HTML endpoint

use axum::routing::post;
use axum::Router;
use mababa_tools::{register_builtins, SearchConfig, ToolRegistry};
use tokio_test::assert_ok;

const PAGE: &str = r#"<html><body>
<div class="result">
  <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.walmart.com%2Fip%2F123">Braun ThermoScan 7</a>
  <a class="result__snippet">Ear thermometer for babies.</a>
</div>
</body></html>"#;

async fn spawn(body: &'static str) -> String {
    let app = Router::new().route("/html/", post(move |form: String| async move {
        assert!(form.starts_with("q=baby%20thermometer"));
        body
    }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/html/", addr)
}

fn registry(endpoint: String) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    register_builtins(
        &mut registry,
        &SearchConfig {
            endpoint,
            ..SearchConfig::default()
        },
    );
    registry
}

#[tokio::test]
async fn test_search_returns_parsed_results() {
    let endpoint = spawn(PAGE).await;
    let registry = registry(endpoint);

    let result = assert_ok!(
        registry
            .execute(
                "web_search",
                &["web_search"],
                serde_json::json!({"query": "baby thermometer"}),
            )
            .await
    );

    assert!(result.success);
    assert_eq!(result.output["total"], 1);
    assert_eq!(result.output["results"][0]["title"], "Braun ThermoScan 7");
    assert_eq!(
        result.output["results"][0]["url"],
        "https://www.walmart.com/ip/123"
    );
}

#[tokio::test]
async fn test_captcha_page_is_a_failed_result() {
    let endpoint = spawn(r#"<div class="anomaly-modal">are you a robot</div>"#).await;
    let registry = registry(endpoint);

    let result = assert_ok!(
        registry
            .execute(
                "web_search",
                &["web_search"],
                serde_json::json!({"query": "baby thermometer"}),
            )
            .await
    );

    assert!(!result.success);
    assert!(result.error.unwrap().contains("CAPTCHA"));
}
