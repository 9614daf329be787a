//! HTTP client utilities.

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::sources::SourceError;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User agent sent with every request
pub fn get_user_agent() -> &'static str {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"))
}

/// Shared HTTP client with sensible defaults
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, SourceError> {
        Self::with_timeout(get_user_agent(), DEFAULT_TIMEOUT_SECS)
    }

    /// Create a new HTTP client with a custom user agent and request timeout
    pub fn with_timeout(user_agent: &str, timeout_secs: u64) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| SourceError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// GET a URL and decode the JSON body.
    ///
    /// Non-2xx statuses are classified with [`SourceError::from_status`].
    /// The query string is never logged since it may carry API keys.
    pub async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, SourceError> {
        let resource = url.path().to_string();
        tracing::debug!(host = url.host_str().unwrap_or(""), path = %resource, "GET");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(SourceError::from_status(status.as_u16(), &body, &resource));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Join a base URL and an endpoint path, then attach query parameters.
pub fn build_url<I, K, V>(base: &str, endpoint: &str, params: I) -> Result<Url, SourceError>
where
    I: IntoIterator,
    I::Item: std::borrow::Borrow<(K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let joined = format!(
        "{}/{}",
        base.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    );
    Ok(Url::parse_with_params(&joined, params)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_joins_and_encodes() {
        let url = build_url(
            "https://example.com/api/",
            "/search",
            [("q", "intitle:듄"), ("max", "5")],
        )
        .unwrap();
        assert_eq!(url.path(), "/api/search");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("q".to_string(), "intitle:듄".to_string()),
                ("max".to_string(), "5".to_string())
            ]
        );
    }

    #[test]
    fn test_build_url_rejects_garbage_base() {
        let result = build_url("not a url", "x", [("a", "b")]);
        assert!(matches!(result, Err(SourceError::InvalidRequest(_))));
    }

    #[test]
    fn test_user_agent() {
        assert!(get_user_agent().starts_with("book-scout/"));
    }

    #[tokio::test]
    async fn test_get_json_classifies_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/fail")
            .with_status(500)
            .with_body("internal")
            .create_async()
            .await;

        let client = HttpClient::new().unwrap();
        let url = Url::parse(&format!("{}/fail", server.url())).unwrap();
        let result: Result<serde_json::Value, _> = client.get_json(url).await;
        assert_eq!(
            result.unwrap_err(),
            SourceError::HttpStatus {
                status: 500,
                body: "internal".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_get_json_decode_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/bad")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let client = HttpClient::new().unwrap();
        let url = Url::parse(&format!("{}/bad", server.url())).unwrap();
        let result: Result<serde_json::Value, _> = client.get_json(url).await;
        assert!(matches!(result, Err(SourceError::Decode(_))));
    }
}
