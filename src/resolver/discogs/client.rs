//! Discogs HTTP client
//!
//! Marketplace catalog with strong vinyl/cassette coverage. Authenticated
//! requests use a personal access token passed as the `token` query parameter
//! and are limited to 60 req/min; anonymous requests get 25 req/min.
//!
//! API: https://www.discogs.com/developers

use async_trait::async_trait;
use tracing::debug;

use super::{adapter, dto};
use crate::resolver::domain::{
    IdentifierQuery, MediaKind, ProviderError, ProviderResult, TextQuery,
};
use crate::resolver::http;
use crate::resolver::traits::{Capabilities, ProviderClient};

pub const DEFAULT_BASE_URL: &str = "https://api.discogs.com";

/// Discogs database search client
pub struct DiscogsClient {
    id: String,
    http_client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl DiscogsClient {
    pub fn new(
        http_client: reqwest::Client,
        base_url: impl Into<String>,
        token: Option<String>,
    ) -> Self {
        Self {
            id: "discogs".to_string(),
            http_client,
            base_url: base_url.into(),
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Run a release search with the given filters
    async fn search(&self, params: &[(&str, String)]) -> Result<dto::SearchResponse, ProviderError> {
        let mut url = format!(
            "{}/database/search?type=release&per_page=5",
            self.base_url.trim_end_matches('/')
        );
        for (key, value) in params {
            url.push('&');
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        debug!(url = %url, "Searching Discogs database");

        // Keep the token out of the logged URL
        if let Some(ref token) = self.token {
            url.push_str("&token=");
            url.push_str(&urlencoding::encode(token));
        }

        http::get_json(self.http_client.get(&url)).await
    }
}

#[async_trait]
impl ProviderClient for DiscogsClient {
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
        let response = self.search(&[("barcode", query.code.clone())]).await?;
        adapter::from_barcode_search(&self.id, response)
    }

    async fn lookup_by_text(&self, query: &TextQuery) -> Result<ProviderResult, ProviderError> {
        let release_title = query.album.as_deref().unwrap_or(&query.title).trim();
        let mut params = vec![("release_title", release_title.to_string())];
        if let Some(artist) = query.expected_artist() {
            params.push(("artist", artist.to_string()));
        }
        if let Some(year) = query.year {
            params.push(("year", year.to_string()));
        }

        let response = self.search(&params).await?;
        adapter::from_text_search(&self.id, response, release_title, query.expected_artist())
    }
}
