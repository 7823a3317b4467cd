//! Discogs API Data Transfer Objects
//!
//! Shapes returned by `GET /database/search`.
//! DO NOT use these types outside the discogs module - convert to domain types.
//!
//! API Reference: https://www.discogs.com/developers#page:database,header:database-search

use serde::{Deserialize, Deserializer, Serialize};

/// Database search response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResponse {
    pub pagination: Option<Pagination>,
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub pages: u32,
    pub items: u32,
}

/// One release/master/artist hit
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResult {
    pub id: u64,
    /// "release", "master", "artist" or "label"
    #[serde(rename = "type")]
    pub result_type: Option<String>,
    /// "Artist - Title" for releases
    pub title: String,
    /// Discogs sends the year as a string, occasionally as a number
    #[serde(default, deserialize_with = "string_or_number")]
    pub year: Option<String>,
    pub country: Option<String>,
    #[serde(default)]
    pub format: Vec<String>,
    #[serde(default)]
    pub label: Vec<String>,
    #[serde(default)]
    pub genre: Vec<String>,
    #[serde(default)]
    pub style: Vec<String>,
    pub catno: Option<String>,
    #[serde(default)]
    pub barcode: Vec<String>,
    pub cover_image: Option<String>,
    pub thumb: Option<String>,
    pub uri: Option<String>,
}

/// Error body (`{"message": "..."}`)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    pub message: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

// ============================================================================
// CONTRACT TESTS
// ============================================================================
