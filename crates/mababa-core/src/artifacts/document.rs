//! Markdown documents from the education and behavioral agents

use super::strip_code_fence;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A markdown answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkdownDocument {
    /// Markdown body
    pub body: String,
    /// Headings found in the body, in order
    pub headings: Vec<String>,
}

impl MarkdownDocument {
    /// Parse agent output; the body must be non-empty
    ///
    /// A body wrapped entirely in a ```markdown fence is unwrapped.
    pub fn parse(output_key: &str, text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let body = if trimmed.starts_with("```") {
            strip_code_fence(trimmed)
        } else {
            trimmed
        };
        if body.is_empty() {
            return Err(Error::schema(output_key, "empty document"));
        }

        let headings = body
            .lines()
            .filter_map(|line| {
                let line = line.trim_start();
                line.starts_with('#')
                    .then(|| line.trim_start_matches('#').trim().to_string())
            })
            .filter(|h| !h.is_empty())
            .collect();

        Ok(Self {
            body: body.to_string(),
            headings,
        })
    }

    /// Expected sections that no heading mentions
    pub fn missing_sections<'a>(&self, expected: &'a [String]) -> Vec<&'a str> {
        expected
            .iter()
            .filter(|section| {
                let wanted = section.to_lowercase();
                !self
                    .headings
                    .iter()
                    .any(|h| h.to_lowercase().contains(&wanted))
            })
            .map(String::as_str)
            .collect()
    }

    /// Log expected sections the document leaves out
    pub fn warn_missing(&self, output_key: &str, expected: &[String]) {
        let missing = self.missing_sections(expected);
        if !missing.is_empty() {
            warn!(output_key, ?missing, "Document is missing sections");
        }
    }
}
