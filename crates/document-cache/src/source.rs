//! Seam between the cache and the network

use async_trait::async_trait;
use document_fetcher::{DocumentFetcher, FetchedDocument, Result};

/// Where the cache fetches uncached documents from
///
/// The cache only ever calls this on a miss; implementations report
/// transport failures and non-success responses as errors and the cache
/// degrades to the original URL.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedDocument>;
}

#[async_trait]
impl DocumentSource for DocumentFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedDocument> {
        DocumentFetcher::fetch(self, url).await
    }
}
