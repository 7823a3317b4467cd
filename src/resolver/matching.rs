//! Text matching helpers shared by the catalog adapters.

use super::domain::Confidence;

/// Loose equality used for secondary-field disambiguation:
/// case-insensitive equal, or either value contains the other.
pub fn loosely_matches(expected: &str, actual: &str) -> bool {
    let expected = expected.trim().to_lowercase();
    let actual = actual.trim().to_lowercase();
    if expected.is_empty() || actual.is_empty() {
        return false;
    }
    expected == actual || actual.contains(&expected) || expected.contains(&actual)
}

/// Confidence for a text hit given the expected secondary field (artist or
/// director) and what the candidate actually carries.
///
/// A mismatch lowers confidence but never rejects the candidate: for a
/// single-result lookup a wrong-looking hit beats no hit.
pub fn secondary_confidence(
    base: Confidence,
    expected: Option<&str>,
    actual: Option<&str>,
) -> Confidence {
    let Some(expected) = expected else {
        return base;
    };
    match actual {
        Some(actual) if loosely_matches(expected, actual) => base,
        _ => base.lowered(),
    }
}

/// Pull the year out of dates like "2001", "2001-03-12" or "12 Mar 2001".
pub fn parse_year(date: &str) -> Option<i32> {
    let trimmed = date.trim();
    if let Some(prefix) = trimmed.get(..4)
        && prefix.bytes().all(|b| b.is_ascii_digit())
    {
        return prefix.parse().ok();
    }
    trimmed
        .split(|c: char| !c.is_ascii_digit())
        .find(|part| part.len() == 4)
        .and_then(|part| part.parse().ok())
}

/// Split a comma-separated list ("Action, Sci-Fi") into trimmed entries.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
