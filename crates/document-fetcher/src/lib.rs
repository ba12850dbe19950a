//! Document payload retrieval
//!
//! Fetches binary document payloads over HTTP for the preview cache.
//! Non-success responses and transport failures are reported as errors;
//! the cache layer decides how to degrade.

pub mod error;
pub mod fetcher;

pub use error::{FetchError, Result};
pub use fetcher::{DocumentFetcher, FetchedDocument};
