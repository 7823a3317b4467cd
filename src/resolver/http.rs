//! Shared HTTP plumbing for provider clients.
//!
//! Every client sends exactly one request per lookup and funnels the outcome
//! through these helpers so status codes and transport failures classify the
//! same way for every catalog.

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use super::domain::ProviderError;

/// User agent sent to every catalog. MusicBrainz rejects anonymous clients.
pub const USER_AGENT: &str = concat!(
    "MediaResolver/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/media-resolver)"
);

/// Build the HTTP client shared by all providers
///
/// The client is configured to:
/// - Accept gzip-compressed responses (reduces bandwidth)
/// - Send a User-Agent header identifying the application
pub fn build_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .gzip(true)
        .user_agent(USER_AGENT)
        .build()
}

/// Map a reqwest failure onto the provider error taxonomy
pub fn classify_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout
    } else if err.is_decode() {
        ProviderError::InvalidResponse(err.to_string())
    } else {
        ProviderError::Transport(err.to_string())
    }
}

/// Map a non-success status onto the provider error taxonomy
pub fn classify_status(status: StatusCode, body: &str) -> ProviderError {
    match status {
        StatusCode::NOT_FOUND => ProviderError::NotFound,
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited,
        s if s.is_server_error() => ProviderError::Transport(format!(
            "HTTP {}: {}",
            s.as_u16(),
            s.canonical_reason().unwrap_or("Unknown")
        )),
        s => ProviderError::InvalidResponse(format!(
            "HTTP {}: {}",
            s.as_u16(),
            body.chars().take(200).collect::<String>()
        )),
    }
}

/// Send a request and return the response if its status is a success.
pub async fn send(request: RequestBuilder) -> Result<Response, ProviderError> {
    let response = request.send().await.map_err(classify_error)?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    // Try to get the response body for more details
    let body = response.text().await.unwrap_or_default();
    Err(classify_status(status, &body))
}

/// Read a successful response body as JSON
pub async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
    let body = response.text().await.map_err(classify_error)?;
    serde_json::from_str(&body).map_err(|e| ProviderError::InvalidResponse(e.to_string()))
}

/// Send a request and decode a JSON body
pub async fn get_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ProviderError> {
    let response = send(request).await?;
    read_json(response).await
}
