//! Testing utilities: mock collaborators.
//!
//! Useful for testing the pipeline (and applications built on it)
//! without network calls.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::ai::CompletionModel;
use crate::error::{CompletionError, CompletionResult, FetchError, FetchResult};
use crate::fetchers::PageFetcher;
use crate::types::ListingDocument;

/// A mock page fetcher returning a canned document or a canned failure.
#[derive(Default)]
pub struct MockFetcher {
    document: RwLock<Option<ListingDocument>>,
    fail_with: RwLock<Option<String>>,
    calls: Arc<AtomicUsize>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve this document for every fetch.
    pub fn with_document(self, doc: ListingDocument) -> Self {
        *self.document.write().unwrap() = Some(doc);
        self
    }

    /// Fail every fetch with this upstream message.
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        *self.fail_with.write().unwrap() = Some(message.into());
        self
    }

    /// Number of fetches performed.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<ListingDocument> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = self.fail_with.read().unwrap().clone() {
            return Err(FetchError::Upstream { message });
        }
        match self.document.read().unwrap().clone() {
            Some(doc) => Ok(doc),
            None => Err(FetchError::EmptyDocument {
                url: url.to_string(),
            }),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A mock completion model returning a canned reply or a canned failure.
#[derive(Default)]
pub struct MockCompletion {
    reply: RwLock<Option<String>>,
    fail: RwLock<bool>,
    calls: Arc<AtomicUsize>,
}

impl MockCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return this reply for every completion.
    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        *self.reply.write().unwrap() = Some(reply.into());
        self
    }

    /// Fail every completion.
    pub fn failing(self) -> Self {
        *self.fail.write().unwrap() = true;
        self
    }

    /// Number of completions requested.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionModel for MockCompletion {
    async fn complete(&self, _system: &str, _user: &str) -> CompletionResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if *self.fail.read().unwrap() {
            return Err(CompletionError::Api {
                status: 503,
                message: "mock failure".to_string(),
            });
        }
        self.reply
            .read()
            .unwrap()
            .clone()
            .ok_or(CompletionError::EmptyReply)
    }

    fn model(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_fetcher_counts_calls() {
        let fetcher =
            MockFetcher::new().with_document(ListingDocument::new("https://a.example", "text"));
        fetcher.fetch("https://a.example").await.unwrap();
        fetcher.fetch("https://a.example").await.unwrap();
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_mock_fetcher_failure() {
        let fetcher = MockFetcher::new().with_failure("blocked");
        assert!(matches!(
            fetcher.fetch("https://a.example").await,
            Err(FetchError::Upstream { .. })
        ));
    }

    #[tokio::test]
    async fn test_mock_completion_reply() {
        let model = MockCompletion::new().with_reply("{}");
        assert_eq!(model.complete("s", "u").await.unwrap(), "{}");
        assert_eq!(model.calls(), 1);
    }
}
