//! Firecrawl-based page fetcher.
//!
//! Uses the Firecrawl scrape API for JavaScript rendering and anti-bot
//! handling, which most listing portals require.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{FetchError, FetchResult};
use crate::fetchers::PageFetcher;
use crate::types::ListingDocument;

const FIRECRAWL_API_URL: &str = "https://api.firecrawl.dev/v1";

// Give the portal time to render its gallery before capture.
const RENDER_WAIT_MS: u32 = 3_000;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Firecrawl scrape client.
pub struct FirecrawlFetcher {
    client: Client,
    api_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeRequest {
    url: String,
    formats: Vec<String>,
    // Full page, not main content: main-content mode strips the gallery
    // markup and social-preview tags the image harvester feeds on.
    only_main_content: bool,
    wait_for: u32,
}

#[derive(Deserialize)]
struct ScrapeResponse {
    success: bool,
    data: Option<ScrapeData>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct ScrapeData {
    markdown: Option<String>,
    html: Option<String>,
    metadata: Option<ScrapeMetadata>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeMetadata {
    description: Option<String>,
    og_description: Option<String>,
    og_image: Option<String>,
}

impl FirecrawlFetcher {
    /// Create a fetcher with the given API key.
    pub fn new(api_key: impl Into<String>) -> FetchResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| FetchError::Http(Box::new(e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
        })
    }

    fn document_from(url: &str, data: ScrapeData) -> FetchResult<ListingDocument> {
        let markdown = data.markdown.unwrap_or_default();
        let html = data.html.unwrap_or_default();
        if markdown.trim().is_empty() && html.trim().is_empty() {
            return Err(FetchError::EmptyDocument {
                url: url.to_string(),
            });
        }

        let mut description = None;
        let mut og_images = Vec::new();
        if let Some(meta) = data.metadata {
            description = meta.description.or(meta.og_description);
            if let Some(og) = meta.og_image {
                if !og.trim().is_empty() {
                    og_images.push(og);
                }
            }
        }

        Ok(ListingDocument {
            source_url: url.to_string(),
            markdown,
            html,
            description,
            og_images,
            fetched_at: Utc::now(),
        })
    }
}

#[async_trait]
impl PageFetcher for FirecrawlFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<ListingDocument> {
        tracing::debug!(url = %url, "scraping listing page");

        let request = ScrapeRequest {
            url: url.to_string(),
            formats: vec!["markdown".to_string(), "html".to_string()],
            only_main_content: false,
            wait_for: RENDER_WAIT_MS,
        };

        let response = self
            .client
            .post(format!("{}/scrape", FIRECRAWL_API_URL))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout {
                        url: url.to_string(),
                    }
                } else {
                    FetchError::Http(Box::new(e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(FetchError::Upstream {
                message: format!("{} - {}", status, text),
            });
        }

        let scrape: ScrapeResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Http(Box::new(e)))?;

        if !scrape.success {
            return Err(FetchError::Upstream {
                message: scrape
                    .error
                    .unwrap_or_else(|| "scrape reported failure".to_string()),
            });
        }

        let data = scrape.data.ok_or_else(|| FetchError::Upstream {
            message: "scrape returned no data".to_string(),
        })?;

        Self::document_from(url, data)
    }

    fn name(&self) -> &str {
        "firecrawl"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_from_full_data() {
        let data = ScrapeData {
            markdown: Some("# Annonce\n\nCHF 1'250'000".to_string()),
            html: Some("<html></html>".to_string()),
            metadata: Some(ScrapeMetadata {
                description: Some("4.5 pièces à Genève".to_string()),
                og_description: None,
                og_image: Some("https://cdn.portal.ch/photos/hero.jpg".to_string()),
            }),
        };

        let doc = FirecrawlFetcher::document_from("https://portal.ch/a/1", data).unwrap();
        assert_eq!(doc.source_url, "https://portal.ch/a/1");
        assert_eq!(doc.description.as_deref(), Some("4.5 pièces à Genève"));
        assert_eq!(doc.og_images, vec!["https://cdn.portal.ch/photos/hero.jpg"]);
    }

    #[test]
    fn test_document_from_empty_content_is_error() {
        let data = ScrapeData {
            markdown: Some("   ".to_string()),
            html: None,
            metadata: None,
        };
        assert!(matches!(
            FirecrawlFetcher::document_from("https://portal.ch/a/1", data),
            Err(FetchError::EmptyDocument { .. })
        ));
    }

    #[test]
    fn test_og_description_fallback() {
        let data = ScrapeData {
            markdown: Some("text".to_string()),
            html: None,
            metadata: Some(ScrapeMetadata {
                description: None,
                og_description: Some("preview text".to_string()),
                og_image: None,
            }),
        };
        let doc = FirecrawlFetcher::document_from("https://portal.ch/a/1", data).unwrap();
        assert_eq!(doc.description.as_deref(), Some("preview text"));
    }
}
