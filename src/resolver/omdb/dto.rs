//! OMDb API Data Transfer Objects
//!
//! OMDb uses PascalCase keys, string-typed numbers and the literal `"N/A"`
//! for missing values. Failures come back as `{"Response": "False", "Error": "..."}`,
//! sometimes with HTTP 200 and sometimes with 401.
//!
//! API Reference: https://www.omdbapi.com/

use serde::{Deserialize, Serialize};

/// Title lookup response (`?t=`), success or failure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TitleResponse {
    /// "True" or "False"
    pub response: String,
    pub error: Option<String>,
    pub title: Option<String>,
    pub year: Option<String>,
    pub released: Option<String>,
    pub genre: Option<String>,
    pub director: Option<String>,
    pub actors: Option<String>,
    pub poster: Option<String>,
    pub production: Option<String>,
    #[serde(rename = "imdbID")]
    pub imdb_id: Option<String>,
    /// "movie", "series" or "episode"
    #[serde(rename = "Type")]
    pub media_type: Option<String>,
}

impl TitleResponse {
    pub fn is_success(&self) -> bool {
        self.response.eq_ignore_ascii_case("true")
    }
}

// ============================================================================
// CONTRACT TESTS
// ============================================================================
