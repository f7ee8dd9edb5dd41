//! Credential resolution
//!
//! The API key is looked up once at startup through a [`SecretSource`].
//! A missing key is logged and tolerated; model calls then fail one by one
//! with a credential error instead of taking the whole process down.

use mababa_llm::util::mask_api_key;
use mababa_llm::SecureString;
use tracing::{error, info};

/// Environment variables consulted for the Gemini key, in order
pub const API_KEY_VARS: [&str; 2] = ["GOOGLE_API_KEY", "GEMINI_API_KEY"];

/// Where secrets come from
#[cfg_attr(test, mockall::automock)]
pub trait SecretSource: Send + Sync {
    /// Look up a secret by name
    fn get_secret(&self, name: &str) -> Option<String>;
}

/// Secrets from process environment variables
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecretSource;

impl SecretSource for EnvSecretSource {
    fn get_secret(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Resolve the API key from the first variable in `names` that holds a
/// non-empty value
pub fn resolve_api_key(source: &dyn SecretSource, names: &[&str]) -> Option<SecureString> {
    for name in names {
        if let Some(value) = source.get_secret(name) {
            let value = value.trim();
            if !value.is_empty() {
                info!(source = %name, key = %mask_api_key(value), "Gemini API key resolved");
                return Some(SecureString::new(value));
            }
        }
    }

    error!(
        tried = ?names,
        "No Gemini API key found; model calls will fail with a credential error"
    );
    None
}
