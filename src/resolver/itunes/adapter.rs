//! Adapter layer: Convert iTunes Search DTOs to domain models

use super::dto;
use crate::resolver::domain::{Confidence, MediaKind, ProviderError, ProviderResult};
use crate::resolver::matching;

/// Artwork size requested in place of the 100px thumbnail
const ARTWORK_SIZE: &str = "600x600bb";

/// Convert the top hit of a search
pub fn to_result(
    source: &str,
    response: dto::SearchResponse,
    kind: MediaKind,
    expected_title: &str,
    expected_artist: Option<&str>,
) -> Result<ProviderResult, ProviderError> {
    let hit = response
        .results
        .into_iter()
        .next()
        .ok_or(ProviderError::NotFound)?;

    let mut result = ProviderResult::new(source, Confidence::Exact);
    let name = match kind {
        MediaKind::Music => hit.collection_name,
        MediaKind::Movie => hit.track_name,
    };

    match kind {
        MediaKind::Music => {
            result.artist = hit.artist_name;
            result.album = name.clone();
        }
        MediaKind::Movie => result.director = hit.artist_name,
    }
    result.title = name;
    result.year = hit.release_date.as_deref().and_then(matching::parse_year);
    result.genres = hit.primary_genre_name.into_iter().collect();
    result.cover_url = hit.artwork_url100.map(|url| upscale_artwork(&url));
    result.external_id = hit.collection_id.or(hit.track_id).map(|id| id.to_string());
    result.kind = Some(kind);

    // Consumer search ranks by popularity, so check the hit against the query
    let title_agrees = result
        .title
        .as_deref()
        .is_some_and(|t| matching::loosely_matches(expected_title, t));
    let base = if title_agrees {
        Confidence::Exact
    } else {
        Confidence::Fuzzy
    };
    let credited = match kind {
        MediaKind::Music => result.artist.as_deref(),
        MediaKind::Movie => result.director.as_deref(),
    };
    result.confidence = matching::secondary_confidence(base, expected_artist, credited);

    Ok(result)
}

/// Artwork URLs end in e.g. `100x100bb.jpg`; swap the size for a larger one.
fn upscale_artwork(url: &str) -> String {
    match url.rsplit_once('/') {
        Some((prefix, file)) if file.starts_with("100x100") => {
            let ext = file.rsplit_once('.').map(|(_, e)| e).unwrap_or("jpg");
            format!("{}/{}.{}", prefix, ARTWORK_SIZE, ext)
        }
        _ => url.to_string(),
    }
}
