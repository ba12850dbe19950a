//! HTTP client for fetching document payloads

use crate::error::{FetchError, Result};
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

const FETCH_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A fetched document payload with the content type the server reported
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// HTTP client for fetching document payloads from their source URLs
pub struct DocumentFetcher {
    client: Client,
}

impl DocumentFetcher {
    /// Create a new fetcher
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    /// Fetch a document payload from a URL
    pub async fn fetch(&self, url: &str) -> Result<FetchedDocument> {
        debug!(url = %url, "Fetching document");

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, url = %url, "Failed to fetch document");
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = content_type_of(response.headers());

        let data = response.bytes().await?.to_vec();

        debug!(
            size = data.len(),
            content_type = %content_type,
            "Fetched document"
        );

        Ok(FetchedDocument { data, content_type })
    }
}

impl Default for DocumentFetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Content type reported by the server, or `application/octet-stream`
/// when the header is missing or not valid UTF-8
fn content_type_of(headers: &HeaderMap) -> String {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_content_type_from_header() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/pdf"));

        assert_eq!(content_type_of(&headers), "application/pdf");
    }

    #[test]
    fn test_content_type_defaults_when_header_absent() {
        let headers = HeaderMap::new();

        assert_eq!(content_type_of(&headers), "application/octet-stream");
    }

    #[test]
    fn test_content_type_defaults_when_header_not_utf8() {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_bytes(b"\xc3\x28").unwrap(),
        );

        assert_eq!(content_type_of(&headers), "application/octet-stream");
    }

    #[test]
    fn test_fetched_document_clone() {
        let doc = FetchedDocument {
            data: b"payload".to_vec(),
            content_type: "application/pdf".to_string(),
        };

        let copy = doc.clone();
        assert_eq!(copy.data, doc.data);
        assert_eq!(copy.content_type, doc.content_type);
    }

    #[tokio::test]
    async fn test_fetch_invalid_url() {
        let fetcher = DocumentFetcher::new();

        let result = fetcher.fetch("http://localhost:1/unreachable").await;
        assert!(result.is_err());
    }
}
