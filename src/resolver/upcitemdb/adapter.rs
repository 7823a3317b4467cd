//! Adapter layer: Convert UPCitemdb DTOs to domain models
//!
//! Product titles are unstructured retail strings, so results are always
//! `Fallback` confidence.

use super::dto;
use crate::resolver::domain::{Confidence, MediaKind, ProviderError, ProviderResult};

/// Format tags retailers append to titles, matched case-insensitively
const FORMAT_TAGS: &[(&str, &str)] = &[
    ("vinyl", "Vinyl"),
    ("lp", "Vinyl"),
    ("cassette", "Cassette"),
    ("cd", "CD"),
    ("blu-ray", "Blu-ray"),
    ("dvd", "DVD"),
    ("vhs", "VHS"),
];

pub fn to_result(source: &str, response: dto::LookupResponse) -> Result<ProviderResult, ProviderError> {
    if response.code != "OK" {
        return Err(classify_code(&response.code, response.message.as_deref()));
    }

    let item = response
        .items
        .into_iter()
        .find(|i| i.title.as_deref().is_some_and(|t| !t.trim().is_empty()))
        .ok_or(ProviderError::NotFound)?;

    let mut result = ProviderResult::new(source, Confidence::Fallback);
    let kind = item.category.as_deref().and_then(kind_from_category);
    let raw_title = item.title.unwrap_or_default();
    let (title, format) = strip_format_tag(&raw_title);

    if kind == Some(MediaKind::Music)
        && let Some((artist, album)) = title.split_once(" - ")
    {
        result.artist = Some(artist.trim().to_string());
        result.album = Some(album.trim().to_string());
    }
    result.title = Some(title);
    result.format = format;
    result.label = item.brand.filter(|b| !b.trim().is_empty());
    result.cover_url = item.images.into_iter().find(|u| !u.trim().is_empty());
    result.external_id = item.ean.or(item.upc);
    result.kind = kind;
    Ok(result)
}

/// Map UPCitemdb error codes onto the provider taxonomy
pub fn classify_code(code: &str, message: Option<&str>) -> ProviderError {
    match code {
        "TOO_FAST" | "EXCEED_LIMIT" => ProviderError::RateLimited,
        "NOT_FOUND" | "INVALID_UPC" | "INVALID_QUERY" => ProviderError::NotFound,
        _ => ProviderError::InvalidResponse(format!(
            "{}: {}",
            code,
            message.unwrap_or("no message")
        )),
    }
}

fn kind_from_category(category: &str) -> Option<MediaKind> {
    let lower = category.to_lowercase();
    if lower.contains("music") || lower.contains("sound recording") {
        Some(MediaKind::Music)
    } else if lower.contains("movie") || lower.contains("video") || lower.contains("dvd") {
        Some(MediaKind::Movie)
    } else {
        None
    }
}

/// Remove a trailing "[CD]" / "(Vinyl)" tag and report the format it named.
fn strip_format_tag(title: &str) -> (String, Option<String>) {
    let trimmed = title.trim();
    let Some(close) = trimmed.chars().last().filter(|c| *c == ']' || *c == ')') else {
        return (trimmed.to_string(), None);
    };
    let open = if close == ']' { '[' } else { '(' };
    let Some(start) = trimmed.rfind(open) else {
        return (trimmed.to_string(), None);
    };

    let tag = trimmed[start + 1..trimmed.len() - 1].trim().to_lowercase();
    let format = FORMAT_TAGS
        .iter()
        .find(|(needle, _)| tag.split_whitespace().any(|word| word == *needle))
        .map(|(_, name)| name.to_string());

    match format {
        Some(format) => (trimmed[..start].trim_end().to_string(), Some(format)),
        None => (trimmed.to_string(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(items: Vec<dto::Item>) -> dto::LookupResponse {
        dto::LookupResponse {
            code: "OK".to_string(),
            message: None,
            total: items.len() as u32,
            items,
        }
    }

    #[test]
    fn test_music_item_split() {
        let item = dto::Item {
            ean: Some("0075021029811".to_string()),
            title: Some("Daft Punk - Discovery [CD]".to_string()),
            brand: Some("Virgin".to_string()),
            category: Some("Media > Music & Sound Recordings > Music CDs".to_string()),
            images: vec!["".to_string(), "http://img/discovery.jpg".to_string()],
            ..Default::default()
        };

        let result = to_result("upcitemdb", ok(vec![item])).unwrap();

        assert_eq!(result.title.as_deref(), Some("Daft Punk - Discovery"));
        assert_eq!(result.artist.as_deref(), Some("Daft Punk"));
        assert_eq!(result.album.as_deref(), Some("Discovery"));
        assert_eq!(result.format.as_deref(), Some("CD"));
        assert_eq!(result.label.as_deref(), Some("Virgin"));
        assert_eq!(result.cover_url.as_deref(), Some("http://img/discovery.jpg"));
        assert_eq!(result.confidence, Confidence::Fallback);
    }

    #[test]
    fn test_movie_item_keeps_title() {
        let item = dto::Item {
            title: Some("The Matrix (DVD)".to_string()),
            category: Some("Media > DVDs & Videos".to_string()),
            ..Default::default()
        };
        let result = to_result("upcitemdb", ok(vec![item])).unwrap();
        assert_eq!(result.title.as_deref(), Some("The Matrix"));
        assert_eq!(result.format.as_deref(), Some("DVD"));
        assert_eq!(result.kind, Some(MediaKind::Movie));
        assert_eq!(result.artist, None);
    }

    #[test]
    fn test_non_format_brackets_kept() {
        assert_eq!(
            strip_format_tag("Abbey Road (Remastered)"),
            ("Abbey Road (Remastered)".to_string(), None)
        );
        assert_eq!(
            strip_format_tag("Rumours [180g Vinyl]"),
            ("Rumours".to_string(), Some("Vinyl".to_string()))
        );
    }

    #[test]
    fn test_empty_items_not_found() {
        assert_eq!(to_result("upcitemdb", ok(vec![])), Err(ProviderError::NotFound));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(classify_code("TOO_FAST", None), ProviderError::RateLimited);
        assert_eq!(classify_code("EXCEED_LIMIT", None), ProviderError::RateLimited);
        assert_eq!(classify_code("INVALID_UPC", None), ProviderError::NotFound);
        assert!(matches!(
            classify_code("SERVER_ERR", Some("boom")),
            ProviderError::InvalidResponse(msg) if msg.contains("boom")
        ));
    }
}
