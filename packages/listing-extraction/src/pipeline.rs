//! Pipeline orchestration.
//!
//! The externally-invoked entry point. Linear flow:
//! validate → fetch → deterministic extraction → (conditional) AI
//! fallback → merge → outcome. The only hard error is a malformed input
//! URL; every collaborator failure degrades into
//! [`PipelineOutcome::Fallback`] so the caller can switch to manual
//! entry.

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::ai::{AiFallback, CompletionModel, OpenAiCompletion};
use crate::error::{ExtractError, Result};
use crate::fetchers::{FirecrawlFetcher, PageFetcher};
use crate::merge::merge;
use crate::patterns;
use crate::security::Credentials;
use crate::sources::SourceId;
use crate::types::NormalizedComparable;

/// Overall wait for the fetch collaborator, on top of its own client
/// timeout. The target page is given time to render, but the request
/// never hangs past this.
const FETCH_BUDGET: Duration = Duration::from_secs(75);

/// Terminal result of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// A merged comparable record.
    Success {
        data: NormalizedComparable,
        ai_used: bool,
    },
    /// Recoverable degradation: the caller should offer manual entry.
    Fallback {
        error: String,
        source: Option<String>,
    },
}

/// The listing extraction pipeline.
///
/// Stateless across runs; both collaborators are optional and their
/// absence degrades the result instead of failing construction.
pub struct ListingPipeline {
    fetcher: Option<Arc<dyn PageFetcher>>,
    ai: Option<AiFallback>,
    ai_configured: bool,
}

impl ListingPipeline {
    /// Build from explicit collaborators (tests, custom fetchers).
    pub fn new(
        fetcher: Option<Arc<dyn PageFetcher>>,
        completion: Option<Arc<dyn CompletionModel>>,
    ) -> Self {
        let ai_configured = completion.is_some();
        Self {
            fetcher,
            ai: completion.map(AiFallback::new),
            ai_configured,
        }
    }

    /// Build the production pipeline from a credentials snapshot.
    /// Missing keys disable the corresponding collaborator.
    pub fn from_credentials(creds: &Credentials) -> Self {
        let fetcher: Option<Arc<dyn PageFetcher>> = creds
            .firecrawl_api_key
            .as_ref()
            .and_then(|key| match FirecrawlFetcher::new(key.expose()) {
                Ok(f) => Some(Arc::new(f) as Arc<dyn PageFetcher>),
                Err(e) => {
                    tracing::warn!(error = %e, "fetch client construction failed");
                    None
                }
            });

        let completion: Option<Arc<dyn CompletionModel>> =
            creds
                .completion_api_key
                .as_ref()
                .and_then(|key| match OpenAiCompletion::new(key.expose()) {
                    Ok(client) => {
                        let mut client = client;
                        if let Some(model) = &creds.completion_model {
                            client = client.with_model(model);
                        }
                        if let Some(base_url) = &creds.completion_base_url {
                            client = client.with_base_url(base_url);
                        }
                        Some(Arc::new(client) as Arc<dyn CompletionModel>)
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "completion client construction failed");
                        None
                    }
                });

        Self::new(fetcher, completion)
    }

    /// Whether a fetch collaborator is configured.
    pub fn has_fetcher(&self) -> bool {
        self.fetcher.is_some()
    }

    /// Whether the AI fallback is configured.
    pub fn has_completion(&self) -> bool {
        self.ai_configured
    }

    /// Run the pipeline for one URL.
    ///
    /// Errors only on malformed input; every other failure mode comes
    /// back as [`PipelineOutcome::Fallback`].
    pub async fn run(&self, url: &str) -> Result<PipelineOutcome> {
        let url = validate_url(url)?;
        let source = SourceId::classify(&url);
        tracing::debug!(url = %url, source = %source, "pipeline run started");

        let Some(fetcher) = &self.fetcher else {
            return Ok(PipelineOutcome::Fallback {
                error: "scraping service not configured".to_string(),
                source: Some(source.as_str().to_string()),
            });
        };

        let doc = match tokio::time::timeout(FETCH_BUDGET, fetcher.fetch(&url)).await {
            Ok(Ok(doc)) => doc,
            Ok(Err(e)) => {
                tracing::warn!(url = %url, fetcher = fetcher.name(), error = %e, "fetch failed");
                return Ok(PipelineOutcome::Fallback {
                    error: format!("could not fetch the listing page: {}", e),
                    source: Some(source.as_str().to_string()),
                });
            }
            Err(_) => {
                tracing::warn!(url = %url, fetcher = fetcher.name(), "fetch timed out");
                return Ok(PipelineOutcome::Fallback {
                    error: "fetching the listing page timed out".to_string(),
                    source: Some(source.as_str().to_string()),
                });
            }
        };

        if !doc.has_content() {
            return Ok(PipelineOutcome::Fallback {
                error: "fetched document was empty".to_string(),
                source: Some(source.as_str().to_string()),
            });
        }

        let det = patterns::extract(&doc, source);

        let mut ai_used = false;
        let ai_result = if det.needs_ai() {
            match &self.ai {
                Some(fallback) => {
                    let result = fallback.extract(&doc, source).await;
                    ai_used = result.is_some();
                    result
                }
                None => {
                    tracing::debug!(source = %source,
                        "fields missing but no completion model configured");
                    None
                }
            }
        } else {
            None
        };

        let data = merge(&det, ai_result.as_ref(), doc.description.as_deref());
        tracing::debug!(
            source = %source,
            ai_used,
            price = !data.price.is_empty(),
            surface = !data.surface.is_empty(),
            address = !data.address.is_empty(),
            images = data.images.len(),
            "pipeline run complete"
        );

        Ok(PipelineOutcome::Success { data, ai_used })
    }
}

/// Validate the inbound URL. The only locally-fatal check in the
/// pipeline.
fn validate_url(url: &str) -> Result<String> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(ExtractError::InvalidUrl {
            reason: "URL is required".to_string(),
        });
    }

    let parsed = Url::parse(trimmed).map_err(|_| ExtractError::InvalidUrl {
        reason: format!("not a valid URL: {}", trimmed),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ExtractError::InvalidUrl {
            reason: format!("unsupported URL scheme: {}", parsed.scheme()),
        });
    }

    Ok(trimmed.to_string())
}
