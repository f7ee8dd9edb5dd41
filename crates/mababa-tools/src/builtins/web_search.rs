//! Web search tool over the DuckDuckGo HTML endpoint (no API key required)

use crate::error::{Error, Result};
use crate::registry::{Tool, ToolCategory, ToolDefinition, ToolResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Maximum number of search results to return
const MAX_RESULTS_CAP: usize = 10;

/// Default DuckDuckGo HTML endpoint
pub const DEFAULT_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

/// User-Agent header to avoid bot blocking
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a[^>]+class="result__a"[^>]+href="([^"]*)"[^>]*>(.*?)</a>"#)
        .expect("title regex")
});
static SNIPPET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a[^>]+class="result__snippet"[^>]*>(.*?)</a>"#)
        .expect("snippet regex")
});
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag regex"));

/// Search tool settings (`[search]` config section)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Register the tool at all
    pub enabled: bool,
    /// HTML endpoint receiving the search form
    pub endpoint: String,
    /// DuckDuckGo region code
    pub region: String,
    /// Results returned when the model does not ask for a count
    pub max_results: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            region: "us-en".to_string(),
            max_results: 5,
            timeout_secs: 15,
        }
    }
}

/// A single search result entry
#[derive(Debug, Clone, PartialEq, Serialize)]
struct SearchResult {
    title: String,
    url: String,
    snippet: String,
}

/// DuckDuckGo HTML-based web search tool
///
/// The model passes only a `query` string; the tool builds the request
/// itself.
pub struct WebSearchTool {
    definition: ToolDefinition,
    config: SearchConfig,
    client: reqwest::Client,
}

impl WebSearchTool {
    /// Create a new web search tool
    #[must_use]
    pub fn new(config: SearchConfig) -> Self {
        let definition = ToolDefinition::new(
            "web_search",
            "Search the web. Returns titles, URLs, and snippets. Use this to find \
             current products, prices, retailers, classes, books, and support resources.",
        )
        .with_category(ToolCategory::Search)
        .with_enabled(config.enabled)
        .with_parameters(serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query string"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum number of results to return (1-10)"
                }
            },
            "required": ["query"]
        }));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();

        Self {
            definition,
            config,
            client,
        }
    }

    /// POST the search form and parse the result page
    ///
    /// POST avoids the CAPTCHA DuckDuckGo shows for GET requests with
    /// non-ASCII queries.
    async fn fetch(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let form = format!(
            "q={}&kl={}",
            urlencoding::encode(query),
            urlencoding::encode(&self.config.region),
        );
        debug!(query = %query, region = %self.config.region, "Fetching search results");

        let response = self
            .client
            .post(&self.config.endpoint)
            .header("content-type", "application/x-www-form-urlencoded")
            .header("referer", "https://html.duckduckgo.com/")
            .body(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout(self.config.timeout_secs * 1000)
                } else {
                    Error::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Network(format!("search endpoint returned {status}")));
        }
        let html = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        debug!(html_len = html.len(), "Search response received");

        if html.contains("anomaly-modal") {
            warn!("Search endpoint returned a CAPTCHA page");
            return Err(Error::Network(
                "search temporarily blocked (CAPTCHA)".to_string(),
            ));
        }

        Ok(parse_search_results(&html, max_results))
    }
}

impl Default for WebSearchTool {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

#[async_trait::async_trait]
impl Tool for WebSearchTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult> {
        let start = Instant::now();

        let query = input
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::InvalidInput("Missing 'query' parameter".to_string()))?;

        if query.trim().is_empty() {
            return Err(Error::InvalidInput("Query must not be empty".to_string()));
        }

        let max_results = input
            .get("max_results")
            .and_then(|v| v.as_u64())
            .map_or(self.config.max_results, |n| n as usize)
            .clamp(1, MAX_RESULTS_CAP);

        let results = self.fetch(query, max_results).await?;

        Ok(ToolResult::success(
            serde_json::json!({
                "query": query,
                "results": results,
                "total": results.len(),
            }),
            start.elapsed().as_millis() as u64,
        ))
    }
}

fn parse_search_results(html: &str, max_results: usize) -> Vec<SearchResult> {
    let snippets: Vec<String> = SNIPPET_RE
        .captures_iter(html)
        .map(|cap| strip_html_tags(cap.get(1).map_or("", |m| m.as_str())))
        .collect();

    TITLE_RE
        .captures_iter(html)
        .enumerate()
        .map(|(i, cap)| SearchResult {
            url: extract_real_url(cap.get(1).map_or("", |m| m.as_str())),
            title: strip_html_tags(cap.get(2).map_or("", |m| m.as_str())),
            snippet: snippets.get(i).cloned().unwrap_or_default(),
        })
        .filter(|r| !r.url.is_empty() && !r.title.is_empty())
        .take(max_results)
        .collect()
}

/// DuckDuckGo wraps links as `//duckduckgo.com/l/?uddg=REAL_URL&...`
fn extract_real_url(raw: &str) -> String {
    let raw = raw.replace("&amp;", "&");
    let absolute = if raw.starts_with("//") {
        format!("https:{raw}")
    } else {
        raw.clone()
    };
    url::Url::parse(&absolute)
        .ok()
        .and_then(|u| {
            u.query_pairs()
                .find(|(k, _)| k == "uddg")
                .map(|(_, v)| v.into_owned())
        })
        .unwrap_or(raw)
}

fn strip_html_tags(s: &str) -> String {
    TAG_RE
        .replace_all(s, "")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        <div class="result">
            <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.target.com%2Fp%2Fstroller&amp;rut=abc">UPPAbaby <b>Vista</b> V2</a>
            <a class="result__snippet">A &quot;convertible&quot; stroller &amp; bassinet.</a>
        </div>
        <div class="result">
            <a class="result__a" href="https://www.amazon.com/dp/B0">Graco Modes</a>
            <a class="result__snippet">Travel system.</a>
        </div>
    "#;

    #[test]
    fn test_strip_html_tags() {
        assert_eq!(strip_html_tags("<b>hello</b> world"), "hello world");
        assert_eq!(strip_html_tags("a &amp; b"), "a & b");
        assert_eq!(strip_html_tags("no tags"), "no tags");
    }

    #[test]
    fn test_extract_real_url() {
        let raw = "//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=abc";
        assert_eq!(extract_real_url(raw), "https://example.com");
        assert_eq!(extract_real_url("https://example.com"), "https://example.com");
    }

    #[test]
    fn test_parse_sample_html() {
        let results = parse_search_results(SAMPLE, 5);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "UPPAbaby Vista V2");
        assert_eq!(results[0].url, "https://www.target.com/p/stroller");
        assert_eq!(results[0].snippet, "A \"convertible\" stroller & bassinet.");
        assert_eq!(results[1].url, "https://www.amazon.com/dp/B0");
    }

    #[test]
    fn test_parse_respects_max_results() {
        assert_eq!(parse_search_results(SAMPLE, 1).len(), 1);
        assert!(parse_search_results("", 5).is_empty());
    }

    #[test]
    fn test_definition() {
        let tool = WebSearchTool::default();
        let def = tool.definition();
        assert_eq!(def.name, "web_search");
        assert_eq!(def.category, ToolCategory::Search);
        assert!(def.enabled);
    }

    #[tokio::test]
    async fn test_missing_query() {
        let tool = WebSearchTool::default();
        let result = tool.execute(serde_json::json!({})).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_empty_query() {
        let tool = WebSearchTool::default();
        let result = tool.execute(serde_json::json!({"query": "  "})).await;
        assert!(result.is_err());
    }
}
