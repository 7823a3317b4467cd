//! iTunes Search API Data Transfer Objects
//!
//! API Reference: https://performance-partners.apple.com/search-api

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub result_count: u32,
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

/// Album ("collection") or movie ("track") hit
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// "collection" for albums, "track" for movies
    pub wrapper_type: Option<String>,
    /// "feature-movie" for movies
    pub kind: Option<String>,
    pub collection_id: Option<u64>,
    pub track_id: Option<u64>,
    /// Artist for albums, director credit for movies
    pub artist_name: Option<String>,
    pub collection_name: Option<String>,
    pub track_name: Option<String>,
    pub artwork_url100: Option<String>,
    /// ISO-8601 timestamp
    pub release_date: Option<String>,
    pub primary_genre_name: Option<String>,
    pub copyright: Option<String>,
}

// ============================================================================
// CONTRACT TESTS
// ============================================================================
