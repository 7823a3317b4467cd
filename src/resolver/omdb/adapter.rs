//! Adapter layer: Convert OMDb DTOs to domain models

use super::dto;
use crate::resolver::domain::{Confidence, MediaKind, ProviderError, ProviderResult};
use crate::resolver::matching;

/// OMDb's marker for an absent field
const NOT_AVAILABLE: &str = "N/A";

/// Convert a title lookup response, classifying OMDb's in-band errors
pub fn to_result(
    source: &str,
    response: dto::TitleResponse,
    expected_director: Option<&str>,
) -> Result<ProviderResult, ProviderError> {
    if !response.is_success() {
        return Err(classify_error(response.error.as_deref().unwrap_or_default()));
    }

    let director = present(response.director);
    let confidence =
        matching::secondary_confidence(Confidence::Exact, expected_director, director.as_deref());

    let mut result = ProviderResult::new(source, confidence);
    result.title = present(response.title);
    result.year = present(response.year)
        .as_deref()
        .and_then(matching::parse_year)
        .or_else(|| present(response.released).as_deref().and_then(matching::parse_year));
    result.genres = present(response.genre)
        .map(|g| matching::split_list(&g))
        .unwrap_or_default();
    // Kept verbatim: co-director credits are a single comma-separated string
    result.director = director;
    result.cover_url = present(response.poster);
    result.label = present(response.production);
    result.external_id = present(response.imdb_id);
    result.kind = Some(MediaKind::Movie);

    if result.title.is_none() {
        return Err(ProviderError::InvalidResponse(
            "successful response without a title".to_string(),
        ));
    }
    Ok(result)
}

/// Map OMDb's `Error` strings onto the provider taxonomy
pub fn classify_error(message: &str) -> ProviderError {
    let lower = message.to_lowercase();
    if lower.contains("not found") {
        ProviderError::NotFound
    } else if lower.contains("limit") {
        ProviderError::RateLimited
    } else {
        ProviderError::InvalidResponse(message.to_string())
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| v.trim() != NOT_AVAILABLE)
}
