//! Typed agent artifacts
//!
//! Product agents answer with a JSON array of [`ProductRecord`]s, document
//! agents with free markdown. Both are parsed into an [`Artifact`] before the
//! orchestrator places them in a [`ConsultancyReport`].

mod document;
mod product;
mod report;
mod table;

pub use document::MarkdownDocument;
pub use product::{PolicyViolation, ProductCollection, ProductPolicy, ProductRecord};
pub use report::{ConsultancyReport, ReportSection, SectionOutcome};
pub use table::{parse_product_tables, render_product_tables, TABLE_HEADER};

use serde::{Deserialize, Serialize};

/// Parsed output of one specialist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum Artifact {
    /// Product records grouped by category
    Products(ProductCollection),
    /// Markdown document
    Document(MarkdownDocument),
}

impl Artifact {
    /// Markdown rendering used in the report
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Products(collection) => render_product_tables(collection),
            Self::Document(doc) => doc.body.clone(),
        }
    }
}

/// Strip a surrounding markdown code fence (```json ... ```), if any
///
/// Text before the opening fence and after the closing fence is dropped;
/// unfenced text is returned trimmed.
#[must_use]
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };
    let after_open = &trimmed[start + 3..];
    // Skip the info string ("json") up to the end of the fence line
    let body = match after_open.find('\n') {
        Some(newline) => &after_open[newline + 1..],
        None => after_open,
    };
    match body.rfind("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n[1, 2]\n```"), "[1, 2]");
        assert_eq!(strip_code_fence("```\n[]\n```\n"), "[]");
        assert_eq!(strip_code_fence("  [\"identity\"]  "), "[\"identity\"]");
        assert_eq!(
            strip_code_fence("Here you go:\n```json\n{\"a\": 1}\n```\nEnjoy!"),
            "{\"a\": 1}"
        );
        assert_eq!(strip_code_fence("```json\n[3]"), "[3]");
    }

    #[test]
    fn test_document_artifact_renders_as_is() {
        let doc = MarkdownDocument::parse("k", "## Classes\nLamaze").unwrap();
        assert_eq!(Artifact::Document(doc).render(), "## Classes\nLamaze");
    }

    #[test]
    fn test_artifact_serializes_tagged() {
        let doc = MarkdownDocument::parse("k", "## Apps").unwrap();
        let json = serde_json::to_value(Artifact::Document(doc)).unwrap();
        assert_eq!(json["type"], "document");
        assert_eq!(json["content"]["body"], "## Apps");
    }
}
