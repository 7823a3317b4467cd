//! OMDb HTTP client
//!
//! Movie database lookups by title. Requires an API key; the free tier
//! allows 1,000 requests per day.
//!
//! API: https://www.omdbapi.com

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use super::{adapter, dto};
use crate::resolver::domain::{MediaKind, ProviderError, ProviderResult, TextQuery};
use crate::resolver::http;
use crate::resolver::traits::{Capabilities, ProviderClient};

pub const DEFAULT_BASE_URL: &str = "https://www.omdbapi.com";

/// OMDb API client
pub struct OmdbClient {
    id: String,
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OmdbClient {
    pub fn new(
        http_client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            id: "omdb".to_string(),
            http_client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    async fn fetch_title(&self, query: &TextQuery) -> Result<dto::TitleResponse, ProviderError> {
        let mut url = format!(
            "{}/?t={}&type=movie",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(query.title.trim())
        );
        if let Some(year) = query.year {
            url.push_str(&format!("&y={}", year));
        }
        debug!(url = %url, "Looking up OMDb title");
        url.push_str("&apikey=");
        url.push_str(&urlencoding::encode(&self.api_key));

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(http::classify_error)?;

        let status = response.status();

        // Key and quota errors arrive as 401 with the usual JSON error body
        if status.is_success() || status == StatusCode::UNAUTHORIZED {
            return http::read_json(response).await;
        }

        let body = response.text().await.unwrap_or_default();
        Err(http::classify_status(status, &body))
    }
}

#[async_trait]
impl ProviderClient for OmdbClient {
    fn id(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::TEXT
    }

    fn media_kinds(&self) -> &[MediaKind] {
        &[MediaKind::Movie]
    }

    async fn lookup_by_text(&self, query: &TextQuery) -> Result<ProviderResult, ProviderError> {
        let response = self.fetch_title(query).await?;
        adapter::to_result(&self.id, response, query.expected_artist())
    }
}
