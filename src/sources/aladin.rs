//! Aladin (TTB Open API) book source implementation.

use async_trait::async_trait;
use serde::Deserialize;

use crate::models::{BookCandidate, QueryScope, SearchQuery};
use crate::query::strip_field_markers;
use crate::sources::{Source, SourceCapabilities, SourceError};
use crate::utils::{build_url, HttpClient};

const ALADIN_API_BASE: &str = "https://www.aladin.co.kr/ttb/api";
const ALADIN_API_VERSION: &str = "20131101";
const DEFAULT_MAX_RESULTS: usize = 20;

/// Aladin book source
///
/// Primary provider. Title search goes to `ItemSearch.aspx`, ISBN lookup to
/// the separate `ItemLookUp.aspx` endpoint.
#[derive(Debug, Clone)]
pub struct AladinSource {
    client: HttpClient,
    api_key: String,
    base_url: String,
    max_results: usize,
}

impl AladinSource {
    /// Create a new Aladin source
    pub fn new(client: HttpClient, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: ALADIN_API_BASE.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Point the source at a different API base (proxies, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Maximum results per search
    pub fn max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }

    /// Aladin `QueryType` and query text for a search
    fn query_params(query: &SearchQuery) -> (&'static str, String) {
        match &query.scope {
            QueryScope::Title => ("Title", strip_field_markers(&query.text)),
            QueryScope::TitleAuthor { .. } | QueryScope::Keyword | QueryScope::Isbn => {
                ("Keyword", strip_field_markers(&query.text))
            }
        }
    }

    async fn fetch(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Vec<BookCandidate>, SourceError> {
        let url = build_url(&self.base_url, endpoint, params)?;
        let response: AladinResponse = self.client.get_json(url).await?;

        if let Some(code) = response.error_code {
            return Err(SourceError::Api(format!(
                "Aladin error {}: {}",
                code,
                response.error_message.unwrap_or_default()
            )));
        }

        Ok(response
            .item
            .into_iter()
            .enumerate()
            .map(|(position, item)| Self::parse_item(item, position))
            .collect())
    }

    /// Map an Aladin item to a candidate
    fn parse_item(item: AladinItem, position: usize) -> BookCandidate {
        let id = non_empty(item.isbn13)
            .or_else(|| item.item_id.map(|id| id.to_string()))
            .unwrap_or_else(|| format!("aladin-{}", position));

        // The top-level page count wins over the nested one.
        let pages = item
            .item_page
            .or_else(|| item.sub_info.and_then(|s| s.item_page))
            .and_then(|p| u32::try_from(p).ok());

        BookCandidate::new(id, item.title.unwrap_or_default())
            .authors(non_empty(item.author))
            .page_count(pages)
            .cover_url(item.cover)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[async_trait]
impl Source for AladinSource {
    fn id(&self) -> &str {
        "aladin"
    }

    fn name(&self) -> &str {
        "Aladin"
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities::SEARCH | SourceCapabilities::ISBN_LOOKUP
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<BookCandidate>, SourceError> {
        let (query_type, text) = Self::query_params(query);
        let params = [
            ("ttbkey", self.api_key.clone()),
            ("Query", text),
            ("QueryType", query_type.to_string()),
            ("SearchTarget", "Book".to_string()),
            ("MaxResults", self.max_results.to_string()),
            ("output", "js".to_string()),
            ("Version", ALADIN_API_VERSION.to_string()),
        ];

        self.fetch("ItemSearch.aspx", &params).await
    }

    async fn lookup_by_isbn(&self, isbn: &str) -> Result<Option<BookCandidate>, SourceError> {
        let id_type = if isbn.len() == 13 { "ISBN13" } else { "ISBN" };
        let params = [
            ("ttbkey", self.api_key.clone()),
            ("itemIdType", id_type.to_string()),
            ("ItemId", isbn.to_string()),
            ("output", "js".to_string()),
            ("Version", ALADIN_API_VERSION.to_string()),
        ];

        let books = self.fetch("ItemLookUp.aspx", &params).await?;
        Ok(books.into_iter().next())
    }
}

// ===== Aladin API Types =====

#[derive(Debug, Deserialize)]
struct AladinResponse {
    #[serde(default)]
    item: Vec<AladinItem>,
    #[serde(rename = "errorCode")]
    error_code: Option<i64>,
    #[serde(rename = "errorMessage")]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AladinItem {
    title: Option<String>,
    author: Option<String>,
    isbn13: Option<String>,
    item_id: Option<u64>,
    item_page: Option<i64>,
    sub_info: Option<AladinSubInfo>,
    cover: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AladinSubInfo {
    item_page: Option<i64>,
}
