//! Raw scraped listing page, as delivered by the content-fetch service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A fetched listing page before any extraction.
///
/// Produced by a [`PageFetcher`](crate::fetchers::PageFetcher), consumed
/// once by the pipeline and discarded. Nothing here is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingDocument {
    /// URL the document was fetched from
    pub source_url: String,

    /// Markdown rendering of the page
    pub markdown: String,

    /// Raw page HTML (full page, not main content: the image harvester
    /// needs gallery markup and social-preview tags that main-content
    /// rendering strips)
    pub html: String,

    /// Site-provided meta description, often cleaner than body text
    pub description: Option<String>,

    /// Social-preview image URLs from page metadata
    #[serde(default)]
    pub og_images: Vec<String>,

    /// When the content was fetched
    pub fetched_at: DateTime<Utc>,
}

impl ListingDocument {
    /// Create a document with minimal fields.
    pub fn new(source_url: impl Into<String>, markdown: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            markdown: markdown.into(),
            html: String::new(),
            description: None,
            og_images: Vec::new(),
            fetched_at: Utc::now(),
        }
    }

    /// Set the raw HTML.
    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = html.into();
        self
    }

    /// Set the meta description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a social-preview image URL.
    pub fn with_og_image(mut self, url: impl Into<String>) -> Self {
        self.og_images.push(url.into());
        self
    }

    /// Markdown text concatenated with the meta description.
    ///
    /// The description is deliberately included in the search corpus; it
    /// frequently repeats price and surface in a cleaner form than the
    /// body text.
    pub fn search_corpus(&self) -> String {
        match &self.description {
            Some(desc) if !desc.trim().is_empty() => {
                format!("{}\n{}", self.markdown, desc)
            }
            _ => self.markdown.clone(),
        }
    }

    /// Check whether any usable text survived fetching.
    pub fn has_content(&self) -> bool {
        !self.markdown.trim().is_empty() || !self.html.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_corpus_includes_description() {
        let doc = ListingDocument::new("https://example.ch/annonce/1", "Bel appartement")
            .with_description("4.5 pièces, 110 m², CHF 1'250'000");

        let corpus = doc.search_corpus();
        assert!(corpus.contains("Bel appartement"));
        assert!(corpus.contains("110 m²"));
    }

    #[test]
    fn test_search_corpus_skips_blank_description() {
        let doc =
            ListingDocument::new("https://example.ch/annonce/1", "Texte").with_description("  ");
        assert_eq!(doc.search_corpus(), "Texte");
    }

    #[test]
    fn test_has_content() {
        let empty = ListingDocument::new("https://example.ch", "   ");
        assert!(!empty.has_content());

        let with_html = ListingDocument::new("https://example.ch", "").with_html("<p>ok</p>");
        assert!(with_html.has_content());
    }
}
