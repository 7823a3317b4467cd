//! Adapter layer: Convert Discogs DTOs to domain models

use super::dto;
use crate::resolver::domain::{Confidence, MediaKind, ProviderError, ProviderResult};
use crate::resolver::matching;

/// Discogs serves this placeholder when a release has no image
const SPACER_IMAGE: &str = "spacer.gif";

/// Convert the first release hit of a barcode search
pub fn from_barcode_search(
    source: &str,
    response: dto::SearchResponse,
) -> Result<ProviderResult, ProviderError> {
    let hit = first_release(response).ok_or(ProviderError::NotFound)?;
    Ok(to_result(source, hit, Confidence::Exact))
}

/// Convert the first release hit of a text search, checking hints
pub fn from_text_search(
    source: &str,
    response: dto::SearchResponse,
    expected_title: &str,
    expected_artist: Option<&str>,
) -> Result<ProviderResult, ProviderError> {
    let hit = first_release(response).ok_or(ProviderError::NotFound)?;
    let mut result = to_result(source, hit, Confidence::Exact);

    let title_agrees = result
        .album
        .as_deref()
        .is_some_and(|album| matching::loosely_matches(expected_title, album));
    let base = if title_agrees {
        Confidence::Exact
    } else {
        Confidence::Fuzzy
    };
    result.confidence =
        matching::secondary_confidence(base, expected_artist, result.artist.as_deref());
    Ok(result)
}

fn first_release(response: dto::SearchResponse) -> Option<dto::SearchResult> {
    response
        .results
        .into_iter()
        .find(|r| r.result_type.as_deref().is_none_or(|t| t == "release"))
}

fn to_result(source: &str, hit: dto::SearchResult, confidence: Confidence) -> ProviderResult {
    let mut result = ProviderResult::new(source, confidence);

    let (artist, album) = split_title(&hit.title);
    result.artist = artist;
    result.title = Some(album.clone());
    result.album = Some(album);
    result.year = hit.year.as_deref().and_then(matching::parse_year);
    result.genres = hit.genre.into_iter().chain(hit.style).collect();
    result.label = hit.label.into_iter().next();
    result.format = hit.format.into_iter().next();
    result.catalog_number = hit.catno.filter(|c| c != "none");
    result.cover_url = hit
        .cover_image
        .or(hit.thumb)
        .filter(|url| !url.is_empty() && !url.ends_with(SPACER_IMAGE));
    result.external_id = Some(hit.id.to_string());
    result.kind = Some(MediaKind::Music);
    result
}

/// Split "Artist - Title" into its parts. Titles without the separator are
/// returned whole with no artist.
fn split_title(title: &str) -> (Option<String>, String) {
    match title.split_once(" - ") {
        Some((artist, album)) => (Some(strip_artist_suffix(artist)), album.trim().to_string()),
        None => (None, title.trim().to_string()),
    }
}

/// Discogs disambiguates artists with a numeric suffix: "Prince (2)"
fn strip_artist_suffix(artist: &str) -> String {
    let artist = artist.trim();
    if let Some(open) = artist.rfind(" (")
        && let Some(number) = artist[open + 2..].strip_suffix(')')
        && !number.is_empty()
        && number.bytes().all(|b| b.is_ascii_digit())
    {
        return artist[..open].to_string();
    }
    artist.to_string()
}
