//! Google Books book source implementation.

use async_trait::async_trait;
use serde::Deserialize;

use crate::models::{BookCandidate, QueryScope, SearchQuery};
use crate::query::has_field_marker;
use crate::sources::{Source, SourceCapabilities, SourceError};
use crate::utils::{build_url, HttpClient};

const GOOGLE_BOOKS_API_BASE: &str = "https://www.googleapis.com/books/v1";
const DEFAULT_MAX_RESULTS: usize = 20;
const DEFAULT_ISBN_MAX_RESULTS: usize = 5;

/// Google Books source
///
/// Secondary provider. There is no separate ISBN endpoint: ISBN queries go
/// to the same `volumes` search with an `isbn:` filter and a small cap.
#[derive(Debug, Clone)]
pub struct GoogleBooksSource {
    client: HttpClient,
    api_key: String,
    base_url: String,
    max_results: usize,
    isbn_max_results: usize,
    country: String,
    local_language: String,
}

impl GoogleBooksSource {
    /// Create a new Google Books source
    pub fn new(client: HttpClient, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: GOOGLE_BOOKS_API_BASE.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
            isbn_max_results: DEFAULT_ISBN_MAX_RESULTS,
            country: "KR".to_string(),
            local_language: "ko".to_string(),
        }
    }

    /// Point the source at a different API base (proxies, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Maximum results for free-text searches
    pub fn max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }

    /// Maximum results for ISBN searches
    pub fn isbn_max_results(mut self, max: usize) -> Self {
        self.isbn_max_results = max;
        self
    }

    /// Country sent with every request and language used for `langRestrict`
    pub fn locale(mut self, country: &str, local_language: &str) -> Self {
        self.country = country.to_string();
        self.local_language = local_language.to_string();
        self
    }

    /// The `q` parameter for a query
    fn build_q(query: &SearchQuery) -> String {
        match &query.scope {
            QueryScope::Isbn => format!("isbn:{}", query.text),
            QueryScope::Title if has_field_marker(&query.text) => query.text.clone(),
            QueryScope::Title => field_term("intitle", &query.text),
            QueryScope::TitleAuthor { title, author } if title.is_empty() => {
                field_term("inauthor", author)
            }
            QueryScope::TitleAuthor { title, author } => format!(
                "{} {}",
                field_term("intitle", title),
                field_term("inauthor", author)
            ),
            QueryScope::Keyword => query.text.clone(),
        }
    }

    fn build_params(&self, query: &SearchQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", Self::build_q(query)),
            ("printType", "books".to_string()),
            ("country", self.country.clone()),
            ("projection", "full".to_string()),
        ];

        if !self.api_key.is_empty() {
            params.push(("key", self.api_key.clone()));
        }

        if query.is_isbn() {
            params.push(("maxResults", self.isbn_max_results.to_string()));
        } else {
            params.push(("maxResults", self.max_results.to_string()));
            params.push(("orderBy", "relevance".to_string()));
            if query.local_script {
                params.push(("langRestrict", self.local_language.clone()));
            }
        }

        params
    }

    /// Map a volume to a candidate
    fn parse_volume(volume: Volume, position: usize) -> BookCandidate {
        let info = volume.volume_info;
        let id = volume
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| format!("google-{}", position));

        let cover = info
            .image_links
            .and_then(|links| links.thumbnail.or(links.small_thumbnail))
            .map(|url| match url.strip_prefix("http://") {
                Some(rest) => format!("https://{}", rest),
                None => url,
            });

        BookCandidate::new(id, info.title.unwrap_or_default())
            .authors(info.authors.unwrap_or_default())
            .page_count(info.page_count.and_then(|p| u32::try_from(p).ok()))
            .language_code(info.language)
            .cover_url(cover)
    }
}

/// A field-scoped term; multi-word values are quoted so the field covers all of them
fn field_term(field: &str, value: &str) -> String {
    let value = value.trim().replace('"', "");
    if value.contains(char::is_whitespace) {
        format!("{}:\"{}\"", field, value)
    } else {
        format!("{}:{}", field, value)
    }
}

#[async_trait]
impl Source for GoogleBooksSource {
    fn id(&self) -> &str {
        "google_books"
    }

    fn name(&self) -> &str {
        "Google Books"
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities::SEARCH
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<BookCandidate>, SourceError> {
        let url = build_url(&self.base_url, "volumes", self.build_params(query))?;
        let response: VolumesResponse = self.client.get_json(url).await?;

        Ok(response
            .items
            .into_iter()
            .enumerate()
            .map(|(position, volume)| Self::parse_volume(volume, position))
            .collect())
    }
}

// ===== Google Books API Types =====

#[derive(Debug, Deserialize)]
struct VolumesResponse {
    #[serde(default)]
    items: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Volume {
    id: Option<String>,
    #[serde(default)]
    volume_info: VolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeInfo {
    title: Option<String>,
    authors: Option<Vec<String>>,
    page_count: Option<i64>,
    language: Option<String>,
    image_links: Option<ImageLinks>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageLinks {
    thumbnail: Option<String>,
    small_thumbnail: Option<String>,
}
