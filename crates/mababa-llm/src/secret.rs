//! Secure string with memory wiping on drop

use zeroize::{Zeroize, ZeroizeOnDrop};

/// A string that is zeroed from memory when dropped
///
/// Debug output is redacted, so a `SecureString` can sit inside config
/// structs that are logged with `?`.
///
/// # Example
///
/// ```
/// use mababa_llm::SecureString;
///
/// let secret = SecureString::new("api-key-12345");
/// assert_eq!(secret.expose(), "api-key-12345");
/// assert!(!format!("{:?}", secret).contains("api-key"));
/// ```
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecureString {
    inner: String,
}

impl SecureString {
    /// Wrap a secret value
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self { inner: s.into() }
    }

    /// Borrow the secret value; keep the borrow short-lived
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.inner
    }

    /// Length of the secret in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the secret is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl std::fmt::Debug for SecureString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecureString([REDACTED, {} bytes])", self.inner.len())
    }
}

impl From<String> for SecureString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_is_redacted() {
        let secret = SecureString::new("AIzaSyD-very-secret");
        let debug = format!("{:?}", secret);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("AIza"));
        assert_eq!(secret.len(), 19);
    }

    #[test]
    fn test_empty() {
        assert!(SecureString::new("").is_empty());
        assert!(!SecureString::from("x".to_string()).is_empty());
    }
}
