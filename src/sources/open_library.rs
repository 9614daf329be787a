//! Open Library book source implementation.

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::models::BookCandidate;
use crate::sources::{Source, SourceCapabilities, SourceError};
use crate::utils::HttpClient;

const OPEN_LIBRARY_API_BASE: &str = "https://openlibrary.org";
const OPEN_LIBRARY_COVERS_BASE: &str = "https://covers.openlibrary.org";

/// Open Library source
///
/// Enrichment only: looks up editions by ISBN to backfill page counts and
/// covers. It has no text search and never reports authors.
#[derive(Debug, Clone)]
pub struct OpenLibrarySource {
    client: HttpClient,
    base_url: String,
    covers_base_url: String,
}

impl OpenLibrarySource {
    /// Create a new Open Library source
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            base_url: OPEN_LIBRARY_API_BASE.to_string(),
            covers_base_url: OPEN_LIBRARY_COVERS_BASE.to_string(),
        }
    }

    /// Point the source at a different API base (proxies, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn cover_url(&self, isbn: &str) -> String {
        format!(
            "{}/b/isbn/{}-L.jpg",
            self.covers_base_url.trim_end_matches('/'),
            isbn
        )
    }

    fn parse_edition(&self, isbn: &str, edition: Edition) -> BookCandidate {
        BookCandidate::new(format!("ol-{}", isbn), edition.title.unwrap_or_default())
            .page_count(edition.number_of_pages.and_then(|p| u32::try_from(p).ok()))
            .cover_url(Some(self.cover_url(isbn)))
    }
}

#[async_trait]
impl Source for OpenLibrarySource {
    fn id(&self) -> &str {
        "open_library"
    }

    fn name(&self) -> &str {
        "Open Library"
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities::ISBN_LOOKUP | SourceCapabilities::ENRICHMENT
    }

    async fn lookup_by_isbn(&self, isbn: &str) -> Result<Option<BookCandidate>, SourceError> {
        let url = Url::parse(&format!(
            "{}/isbn/{}.json",
            self.base_url.trim_end_matches('/'),
            isbn
        ))?;

        match self.client.get_json::<Edition>(url).await {
            Ok(edition) => Ok(Some(self.parse_edition(isbn, edition))),
            Err(SourceError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

// ===== Open Library API Types =====

#[derive(Debug, Deserialize)]
struct Edition {
    title: Option<String>,
    number_of_pages: Option<i64>,
}
