//! Bibliographic provider plugins with a trait-based architecture.
//!
//! This module defines the [`Source`] trait that every provider implements.
//! Three providers ship with the crate, each filling a fixed role in the
//! [`SourceRegistry`]:
//!
//! - [`AladinSource`] - primary: title search and direct ISBN lookup
//! - [`GoogleBooksSource`] - secondary: broad full-text search; ISBNs go
//!   through the same endpoint as an `isbn:` filtered query
//! - [`OpenLibrarySource`] - enrichment only: ISBN lookup used to backfill
//!   page counts and covers, never a source of new records
//!
//! # Runtime Configuration
//!
//! - `ALADIN_TTB_KEY` - Aladin TTB key
//! - `GOOGLE_BOOKS_KEY` - Google Books API key (optional)
//!
//! Missing keys are not validated here; calls go out and fail naturally.

mod aladin;
mod google_books;
mod open_library;
mod registry;

pub mod mock;

pub use aladin::AladinSource;
pub use google_books::GoogleBooksSource;
pub use mock::MockSource;
pub use open_library::OpenLibrarySource;
pub use registry::{SourceCapabilities, SourceRegistry, SourceRole};

use crate::models::{BookCandidate, SearchQuery};
use async_trait::async_trait;

/// The Source trait defines the interface for all bibliographic providers.
///
/// # Implementing a New Source
///
/// 1. Create a struct that implements `Source`
/// 2. Implement `id`, `name` and `capabilities`
/// 3. Implement `search` and/or `lookup_by_isbn` to match the declared capabilities
/// 4. Hand it to [`SourceRegistry::new`] in the role it should play
#[async_trait]
pub trait Source: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source (e.g. "aladin")
    fn id(&self) -> &str;

    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Describe the capabilities of this source
    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities::SEARCH
    }

    /// Whether this source supports free-text search
    fn supports_search(&self) -> bool {
        self.capabilities().contains(SourceCapabilities::SEARCH)
    }

    /// Whether this source supports direct ISBN lookup
    fn supports_isbn_lookup(&self) -> bool {
        self.capabilities().contains(SourceCapabilities::ISBN_LOOKUP)
    }

    /// Search for books matching the query, in provider relevance order
    async fn search(&self, _query: &SearchQuery) -> Result<Vec<BookCandidate>, SourceError> {
        Err(SourceError::Unsupported(format!("{} search", self.id())))
    }

    /// Look up the single best match for an ISBN
    async fn lookup_by_isbn(&self, _isbn: &str) -> Result<Option<BookCandidate>, SourceError> {
        Err(SourceError::Unsupported(format!("{} isbn lookup", self.id())))
    }
}

/// Errors that can occur when interacting with a source
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// The source does not implement the requested operation
    #[error("Operation not supported: {0}")]
    Unsupported(String),

    /// Transport-level failure
    #[error("Network error: {0}")]
    Network(String),

    /// Response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Non-2xx response
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// The call did not finish within its time budget
    #[error("Request timed out")]
    Timeout,

    /// The provider reported an error inside a successful response
    #[error("API error: {0}")]
    Api(String),

    /// Request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Longest response body kept in an error message
const MAX_ERROR_BODY: usize = 512;

impl SourceError {
    /// Classify a non-success HTTP status
    pub fn from_status(status: u16, body: &str, resource: &str) -> Self {
        match status {
            429 => SourceError::RateLimited,
            404 => SourceError::NotFound(resource.to_string()),
            _ => SourceError::HttpStatus {
                status,
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            },
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout
        } else if err.is_decode() {
            SourceError::Decode(err.to_string())
        } else {
            SourceError::Network(err.without_url().to_string())
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Decode(format!("JSON: {}", err))
    }
}

impl From<url::ParseError> for SourceError {
    fn from(err: url::ParseError) -> Self {
        SourceError::InvalidRequest(format!("URL: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_capabilities() {
        let caps = SourceCapabilities::SEARCH | SourceCapabilities::ISBN_LOOKUP;

        assert!(caps.contains(SourceCapabilities::SEARCH));
        assert!(caps.contains(SourceCapabilities::ISBN_LOOKUP));
        assert!(!caps.contains(SourceCapabilities::ENRICHMENT));
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(
            SourceError::from_status(429, "", "/volumes"),
            SourceError::RateLimited
        );
        assert_eq!(
            SourceError::from_status(404, "", "/isbn/1.json"),
            SourceError::NotFound("/isbn/1.json".to_string())
        );
        assert_eq!(
            SourceError::from_status(500, "oops", "/volumes"),
            SourceError::HttpStatus {
                status: 500,
                body: "oops".to_string()
            }
        );
    }

    #[test]
    fn test_status_body_is_truncated() {
        let body = "x".repeat(2000);
        match SourceError::from_status(503, &body, "/") {
            SourceError::HttpStatus { body, .. } => assert_eq!(body.len(), MAX_ERROR_BODY),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_json_error_is_decode() {
        let err: SourceError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, SourceError::Decode(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SourceError>();
    }
}
