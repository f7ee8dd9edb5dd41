//! Google Gemini provider
//!
//! Talks to the `generateContent` endpoint with an API key. Retries on
//! transient status codes are driven by the [`RetryPolicy`](crate::RetryPolicy)
//! carried in each request.

mod config;
mod convert;
mod provider;
mod schema;
mod types;

pub use config::{GeminiConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use provider::GeminiProvider;
