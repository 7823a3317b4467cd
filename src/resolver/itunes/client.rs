//! iTunes Search API client
//!
//! Consumer search API. No key required; Apple allows roughly 20 requests
//! per minute and answers 403 once that is exceeded.
//!
//! API: https://performance-partners.apple.com/search-api

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use super::{adapter, dto};
use crate::resolver::domain::{MediaKind, ProviderError, ProviderResult, TextQuery};
use crate::resolver::http;
use crate::resolver::traits::{Capabilities, ProviderClient};

pub const DEFAULT_BASE_URL: &str = "https://itunes.apple.com";

/// iTunes Search API client
pub struct ITunesClient {
    id: String,
    http_client: reqwest::Client,
    base_url: String,
    /// Storefront country code
    country: String,
}

impl ITunesClient {
    pub fn new(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            id: "itunes".to_string(),
            http_client,
            base_url: base_url.into(),
            country: "US".to_string(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    async fn search(&self, term: &str, kind: MediaKind) -> Result<dto::SearchResponse, ProviderError> {
        let (media, entity) = match kind {
            MediaKind::Music => ("music", "album"),
            MediaKind::Movie => ("movie", "movie"),
        };
        let url = format!(
            "{}/search?term={}&media={}&entity={}&country={}&limit=5",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(term),
            media,
            entity,
            urlencoding::encode(&self.country)
        );
        debug!(url = %url, "Searching iTunes");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(http::classify_error)?;

        let status = response.status();

        if status == StatusCode::FORBIDDEN {
            return Err(ProviderError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(http::classify_status(status, &body));
        }

        http::read_json(response).await
    }
}

/// Search term: the title plus the artist/director hint when present
fn search_term(query: &TextQuery) -> String {
    let title = query.album.as_deref().unwrap_or(&query.title).trim();
    match query.expected_artist() {
        Some(artist) => format!("{} {}", artist, title),
        None => title.to_string(),
    }
}

#[async_trait]
impl ProviderClient for ITunesClient {
    fn id(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::TEXT
    }

    fn media_kinds(&self) -> &[MediaKind] {
        &[MediaKind::Music, MediaKind::Movie]
    }

    async fn lookup_by_text(&self, query: &TextQuery) -> Result<ProviderResult, ProviderError> {
        // Without a kind hint, records and tapes are the common case
        let kind = query.kind.unwrap_or(MediaKind::Music);
        let response = self.search(&search_term(query), kind).await?;
        let expected_title = query.album.as_deref().unwrap_or(&query.title);
        adapter::to_result(&self.id, response, kind, expected_title, query.expected_artist())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(server: &MockServer) -> ITunesClient {
        ITunesClient::new(http::build_client().unwrap(), server.base_url())
    }

    #[test]
    fn test_search_term() {
        let query = TextQuery::new("Discovery").with_artist("Daft Punk");
        assert_eq!(search_term(&query), "Daft Punk Discovery");
        assert_eq!(search_term(&TextQuery::new(" Discovery ")), "Discovery");
    }

    #[tokio::test]
    async fn test_movie_kind_searches_movies() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/search")
                    .query_param("term", "The Matrix")
                    .query_param("media", "movie")
                    .query_param("entity", "movie");
                then.status(200).json_body(json!({
                    "resultCount": 1,
                    "results": [{
                        "wrapperType": "track",
                        "kind": "feature-movie",
                        "trackId": 271469518,
                        "artistName": "Lana Wachowski & Lilly Wachowski",
                        "trackName": "The Matrix",
                        "releaseDate": "1999-03-31T08:00:00Z"
                    }]
                }));
            })
            .await;

        let query = TextQuery::new("The Matrix").with_kind(MediaKind::Movie);
        let result = client(&server).lookup_by_text(&query).await.unwrap();

        mock.assert_async().await;
        assert_eq!(result.title.as_deref(), Some("The Matrix"));
        assert_eq!(result.year, Some(1999));
        assert_eq!(result.kind, Some(MediaKind::Movie));
    }

    #[tokio::test]
    async fn test_403_is_rate_limited() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search");
                then.status(403);
            })
            .await;

        let result = client(&server).lookup_by_text(&TextQuery::new("Discovery")).await;
        assert_eq!(result, Err(ProviderError::RateLimited));
    }

    #[tokio::test]
    async fn test_zero_results_is_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search");
                then.status(200).json_body(json!({"resultCount": 0, "results": []}));
            })
            .await;

        let result = client(&server).lookup_by_text(&TextQuery::new("zzzz")).await;
        assert_eq!(result, Err(ProviderError::NotFound));
    }
}
