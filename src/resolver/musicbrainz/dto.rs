//! MusicBrainz API Data Transfer Objects
//!
//! These types match what the MusicBrainz release search returns.
//! DO NOT use these types outside the musicbrainz module - convert to domain types.
//!
//! API Reference: https://musicbrainz.org/doc/MusicBrainz_API/Search#Release

use serde::{Deserialize, Serialize};

/// Release search response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReleaseSearchResponse {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub releases: Vec<Release>,
}

/// Release (album/single/EP) as returned by search
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Release {
    /// MusicBrainz release ID
    pub id: String,
    /// Search relevance (0-100)
    pub score: Option<u32>,
    pub title: String,
    /// Release status (Official, Bootleg, etc.)
    pub status: Option<String>,
    /// Release date (YYYY, YYYY-MM, or YYYY-MM-DD)
    pub date: Option<String>,
    pub country: Option<String>,
    pub barcode: Option<String>,
    #[serde(default)]
    pub artist_credit: Vec<ArtistCredit>,
    pub release_group: Option<ReleaseGroup>,
    #[serde(default)]
    pub label_info: Vec<LabelInfo>,
    #[serde(default)]
    pub media: Vec<Medium>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// Artist credit (can be multiple for collaborations)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtistCredit {
    pub artist: Artist,
    /// How this artist is credited (may differ from official name)
    pub name: Option<String>,
    /// Join phrase (e.g., " & ", " feat. ")
    pub joinphrase: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub sort_name: Option<String>,
}

/// Release group (e.g., "Discovery" across all editions)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReleaseGroup {
    pub id: String,
    pub title: Option<String>,
    /// Primary type (Album, Single, EP, etc.)
    pub primary_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct LabelInfo {
    pub catalog_number: Option<String>,
    pub label: Option<Label>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Label {
    pub id: Option<String>,
    pub name: String,
}

/// Medium (disc, side pair, tape) within a release
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Medium {
    /// Format (CD, 12" Vinyl, Cassette, Digital Media, ...)
    pub format: Option<String>,
    pub track_count: Option<u32>,
}

/// Folksonomy tag with vote count
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Tag {
    pub name: String,
    #[serde(default)]
    pub count: i32,
}

// ============================================================================
// CONTRACT TESTS
// These verify our DTOs match what the real API returns.
// If these fail, the API has changed and we need to update our DTOs.
// ============================================================================
