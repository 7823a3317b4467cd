//! MusicBrainz HTTP client
//!
//! Handles communication with the MusicBrainz web service.
//! See: https://musicbrainz.org/doc/MusicBrainz_API
//!
//! IMPORTANT: MusicBrainz requires a User-Agent header and rate limits to 1 req/sec.
//! When the limit is exceeded it answers 503 rather than 429.

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use super::{adapter, dto};
use crate::resolver::domain::{
    IdentifierQuery, MediaKind, ProviderError, ProviderResult, TextQuery,
};
use crate::resolver::http;
use crate::resolver::traits::{Capabilities, ProviderClient};

pub const DEFAULT_BASE_URL: &str = "https://musicbrainz.org/ws/2";
pub const DEFAULT_COVER_BASE_URL: &str = "https://coverartarchive.org";

/// MusicBrainz API client
pub struct MusicBrainzClient {
    id: String,
    http_client: reqwest::Client,
    base_url: String,
    cover_base_url: String,
}

impl MusicBrainzClient {
    /// Create a client against `base_url` using a shared HTTP client
    pub fn new(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            id: "musicbrainz".to_string(),
            http_client,
            base_url: base_url.into(),
            cover_base_url: DEFAULT_COVER_BASE_URL.to_string(),
        }
    }

    /// Override the provider id (and so the result `source`)
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_cover_base_url(mut self, cover_base_url: impl Into<String>) -> Self {
        self.cover_base_url = cover_base_url.into();
        self
    }

    /// Send a Lucene release search and parse the response
    async fn search_releases(
        &self,
        lucene: &str,
    ) -> Result<dto::ReleaseSearchResponse, ProviderError> {
        let url = format!(
            "{}/release?query={}&fmt=json&limit=5",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(lucene)
        );
        debug!(url = %url, "Searching MusicBrainz releases");

        let response = self
            .http_client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(http::classify_error)?;

        let status = response.status();

        // MusicBrainz signals throttling with 503 Service Unavailable
        if status == StatusCode::SERVICE_UNAVAILABLE {
            return Err(ProviderError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(http::classify_status(status, &body));
        }

        http::read_json(response).await
    }
}

/// Quote a term for a Lucene phrase query
fn lucene_phrase(term: &str) -> String {
    format!("\"{}\"", term.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Build the Lucene query for a text lookup
fn text_query(query: &TextQuery) -> String {
    let release = query.album.as_deref().unwrap_or(&query.title);
    let mut lucene = format!("release:{}", lucene_phrase(release.trim()));
    if let Some(artist) = query.expected_artist() {
        lucene.push_str(" AND artist:");
        lucene.push_str(&lucene_phrase(artist));
    }
    if let Some(year) = query.year {
        lucene.push_str(&format!(" AND date:{}", year));
    }
    lucene
}

#[async_trait]
impl ProviderClient for MusicBrainzClient {
    fn id(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::IDENTIFIER | Capabilities::TEXT
    }

    fn media_kinds(&self) -> &[MediaKind] {
        &[MediaKind::Music]
    }

    async fn lookup_by_identifier(
        &self,
        query: &IdentifierQuery,
    ) -> Result<ProviderResult, ProviderError> {
        let response = self
            .search_releases(&format!("barcode:{}", query.code))
            .await?;
        adapter::from_barcode_search(&self.id, &self.cover_base_url, response)
    }

    async fn lookup_by_text(&self, query: &TextQuery) -> Result<ProviderResult, ProviderError> {
        let response = self.search_releases(&text_query(query)).await?;
        adapter::from_text_search(
            &self.id,
            &self.cover_base_url,
            response,
            query.expected_artist(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(server: &MockServer) -> MusicBrainzClient {
        MusicBrainzClient::new(http::build_client().unwrap(), server.base_url())
    }

    #[test]
    fn test_text_query_building() {
        let query = TextQuery::new("Discovery").with_artist("Daft Punk").with_year(2001);
        assert_eq!(
            text_query(&query),
            r#"release:"Discovery" AND artist:"Daft Punk" AND date:2001"#
        );
    }

    #[test]
    fn test_text_query_prefers_album_and_escapes_quotes() {
        let query = TextQuery::new("One More Time").with_album(r#"Alive "1997""#);
        assert_eq!(text_query(&query), r#"release:"Alive \"1997\"""#);
    }

    #[tokio::test]
    async fn test_barcode_lookup_hits_search_endpoint() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/release")
                    .query_param("query", "barcode:075021029811")
                    .query_param("fmt", "json");
                then.status(200).json_body(json!({
                    "count": 1,
                    "releases": [{
                        "id": "rel-1",
                        "score": 100,
                        "title": "Discovery",
                        "status": "Official",
                        "date": "2001-03-13",
                        "artist-credit": [{"name": "Daft Punk", "artist": {"id": "a", "name": "Daft Punk"}}]
                    }]
                }));
            })
            .await;

        let query = IdentifierQuery::new("075021029811").unwrap();
        let result = client(&server).lookup_by_identifier(&query).await.unwrap();

        mock.assert_async().await;
        assert_eq!(result.source, "musicbrainz");
        assert_eq!(result.artist.as_deref(), Some("Daft Punk"));
        assert_eq!(result.year, Some(2001));
    }

    #[tokio::test]
    async fn test_empty_search_is_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/release");
                then.status(200).json_body(json!({"count": 0, "releases": []}));
            })
            .await;

        let query = IdentifierQuery::new("000000000000").unwrap();
        let result = client(&server).lookup_by_identifier(&query).await;
        assert_eq!(result, Err(ProviderError::NotFound));
    }

    #[tokio::test]
    async fn test_503_is_rate_limited() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/release");
                then.status(503).body("slow down");
            })
            .await;

        let result = client(&server).lookup_by_text(&TextQuery::new("Discovery")).await;
        assert_eq!(result, Err(ProviderError::RateLimited));
    }

    #[tokio::test]
    async fn test_garbage_body_is_invalid_response() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/release");
                then.status(200).body("<html>maintenance</html>");
            })
            .await;

        let result = client(&server).lookup_by_text(&TextQuery::new("Discovery")).await;
        assert!(matches!(result, Err(ProviderError::InvalidResponse(_))));
    }
}
