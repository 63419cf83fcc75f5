//! Content-fetch boundary.
//!
//! The pipeline treats page fetching as an opaque collaborator: a URL
//! goes in, a [`ListingDocument`] comes out. The production
//! implementation is [`FirecrawlFetcher`]; tests use the mock in
//! [`crate::testing`].

pub mod firecrawl;

pub use firecrawl::FirecrawlFetcher;

use async_trait::async_trait;

use crate::error::FetchResult;
use crate::types::ListingDocument;

/// Fetch-and-render a listing page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> FetchResult<ListingDocument>;

    /// Implementation name, for logs.
    fn name(&self) -> &str;
}
