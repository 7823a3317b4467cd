//! Adapter layer: Convert MusicBrainz DTOs to domain models
//!
//! This is the ONLY place where MusicBrainz DTO types are converted to domain types.

use super::dto;
use crate::resolver::domain::{Confidence, MediaKind, ProviderError, ProviderResult};
use crate::resolver::matching;

/// Search hits scoring at least this are treated as exact text matches
const EXACT_SCORE: u32 = 90;

/// Convert the top barcode hit into a result
pub fn from_barcode_search(
    source: &str,
    cover_base: &str,
    response: dto::ReleaseSearchResponse,
) -> Result<ProviderResult, ProviderError> {
    let release = pick_release(response.releases).ok_or(ProviderError::NotFound)?;
    Ok(to_result(source, cover_base, release, Confidence::Exact))
}

/// Convert the top text hit into a result, checking the expected artist
pub fn from_text_search(
    source: &str,
    cover_base: &str,
    response: dto::ReleaseSearchResponse,
    expected_artist: Option<&str>,
) -> Result<ProviderResult, ProviderError> {
    // Search results come back sorted by relevance
    let release = response
        .releases
        .into_iter()
        .next()
        .ok_or(ProviderError::NotFound)?;

    let base = if release.score.unwrap_or(0) >= EXACT_SCORE {
        Confidence::Exact
    } else {
        Confidence::Fuzzy
    };
    let artist = build_artist_string(&release.artist_credit);
    let confidence = matching::secondary_confidence(base, expected_artist, artist.as_deref());

    Ok(to_result(source, cover_base, release, confidence))
}

/// Several pressings can share a barcode; prefer official releases.
fn pick_release(releases: Vec<dto::Release>) -> Option<dto::Release> {
    let official = releases
        .iter()
        .position(|r| r.status.as_deref() == Some("Official"));
    let idx = official.unwrap_or(0);
    releases.into_iter().nth(idx)
}

fn to_result(
    source: &str,
    cover_base: &str,
    release: dto::Release,
    confidence: Confidence,
) -> ProviderResult {
    let mut result = ProviderResult::new(source, confidence);

    result.artist = build_artist_string(&release.artist_credit);
    result.year = release.date.as_deref().and_then(matching::parse_year);
    result.genres = extract_genres(&release.tags);
    result.format = release.media.iter().find_map(|m| m.format.clone());

    if let Some(info) = release.label_info.first() {
        result.label = info.label.as_ref().map(|l| l.name.clone());
        result.catalog_number = info.catalog_number.clone();
    }

    result.cover_url = Some(format!(
        "{}/release/{}/front-500",
        cover_base.trim_end_matches('/'),
        release.id
    ));
    result.title = Some(release.title.clone());
    result.album = Some(release.title);
    result.external_id = Some(release.id);
    result.kind = Some(MediaKind::Music);
    result
}

/// Build a combined artist string from artist credits
fn build_artist_string(credits: &[dto::ArtistCredit]) -> Option<String> {
    if credits.is_empty() {
        return None;
    }

    let mut result = String::new();
    for credit in credits {
        // Use credited name if available, otherwise official name
        let name = credit.name.as_ref().unwrap_or(&credit.artist.name);
        result.push_str(name);

        // Add join phrase if present (e.g., " & ", " feat. ")
        if let Some(ref join) = credit.joinphrase {
            result.push_str(join);
        }
    }

    Some(result)
}

/// Top 5 tags by vote count, title-cased for display
fn extract_genres(tags: &[dto::Tag]) -> Vec<String> {
    let mut sorted_tags: Vec<_> = tags.iter().filter(|t| t.count > 0).collect();
    sorted_tags.sort_by(|a, b| b.count.cmp(&a.count));

    sorted_tags
        .into_iter()
        .take(5)
        .map(|t| {
            t.name
                .split_whitespace()
                .map(|word| {
                    let mut chars = word.chars();
                    match chars.next() {
                        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                        None => String::new(),
                    }
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}
