//! UPCitemdb HTTP client
//!
//! Consumer product database used as the last-resort barcode source.
//! Without a key the trial endpoint allows 100 lookups/day and bursts of 6
//! per minute; with a key the paid endpoint is used.
//!
//! API: https://www.upcitemdb.com/api/explorer

use async_trait::async_trait;
use tracing::debug;

use super::{adapter, dto};
use crate::resolver::domain::{
    CodeKind, IdentifierQuery, MediaKind, ProviderError, ProviderResult,
};
use crate::resolver::http;
use crate::resolver::traits::{Capabilities, ProviderClient};

pub const DEFAULT_BASE_URL: &str = "https://api.upcitemdb.com";

/// UPCitemdb lookup client
pub struct UpcItemDbClient {
    id: String,
    http_client: reqwest::Client,
    base_url: String,
    user_key: Option<String>,
}

impl UpcItemDbClient {
    pub fn new(
        http_client: reqwest::Client,
        base_url: impl Into<String>,
        user_key: Option<String>,
    ) -> Self {
        Self {
            id: "upcitemdb".to_string(),
            http_client,
            base_url: base_url.into(),
            user_key: user_key.filter(|k| !k.trim().is_empty()),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    fn lookup_url(&self, code: &str) -> String {
        let plan = if self.user_key.is_some() { "v1" } else { "trial" };
        format!(
            "{}/prod/{}/lookup?upc={}",
            self.base_url.trim_end_matches('/'),
            plan,
            urlencoding::encode(code)
        )
    }

    async fn lookup(&self, code: &str) -> Result<dto::LookupResponse, ProviderError> {
        let url = self.lookup_url(code);
        debug!(url = %url, "Looking up UPCitemdb product");

        let mut request = self.http_client.get(&url);
        if let Some(ref key) = self.user_key {
            request = request.header("user_key", key).header("key_type", "3scale");
        }

        let response = request.send().await.map_err(http::classify_error)?;
        let status = response.status();
        let body = response.text().await.map_err(http::classify_error)?;

        // Errors (400 INVALID_UPC, 429 TOO_FAST) carry the normal envelope
        match serde_json::from_str::<dto::LookupResponse>(&body) {
            Ok(parsed) if status.is_success() || parsed.code != "OK" => Ok(parsed),
            Ok(_) => Err(http::classify_status(status, &body)),
            Err(_) if !status.is_success() => Err(http::classify_status(status, &body)),
            Err(e) => Err(ProviderError::InvalidResponse(e.to_string())),
        }
    }
}

#[async_trait]
impl ProviderClient for UpcItemDbClient {
    fn id(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::IDENTIFIER
    }

    fn media_kinds(&self) -> &[MediaKind] {
        &[MediaKind::Music, MediaKind::Movie]
    }

    fn accepts_code(&self, kind: CodeKind) -> bool {
        // Trade-item codes only; case codes aren't in the consumer catalog
        matches!(kind, CodeKind::UpcA | CodeKind::Ean13 | CodeKind::Ean8)
    }

    async fn lookup_by_identifier(
        &self,
        query: &IdentifierQuery,
    ) -> Result<ProviderResult, ProviderError> {
        let response = self.lookup(&query.code).await?;
        adapter::to_result(&self.id, response)
    }
}
