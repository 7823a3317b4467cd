//! Internal domain models for metadata resolution.
//!
//! These types are OUR types - they don't change when external catalogs change.
//! Every catalog response gets converted into these types by its adapter.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What kind of physical media a query or result is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Music,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Movie => f.write_str("movie"),
            MediaKind::Music => f.write_str("music"),
        }
    }
}

/// Classification of a product code by its digit count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CodeKind {
    /// 8-digit EAN
    Ean8,
    /// 12-digit UPC-A
    UpcA,
    /// 13-digit EAN / JAN
    Ean13,
    /// 14-digit GTIN (case codes)
    Gtin14,
    /// Anything that isn't a purely numeric barcode
    Other,
}

impl CodeKind {
    /// Classify an already-normalized code
    pub fn classify(code: &str) -> Self {
        if code.is_empty() || !code.bytes().all(|b| b.is_ascii_digit()) {
            return CodeKind::Other;
        }
        match code.len() {
            8 => CodeKind::Ean8,
            12 => CodeKind::UpcA,
            13 => CodeKind::Ean13,
            14 => CodeKind::Gtin14,
            _ => CodeKind::Other,
        }
    }

    /// Whether this is one of the numeric barcode formats
    pub fn is_barcode(self) -> bool {
        !matches!(self, CodeKind::Other)
    }
}

/// Free-text lookup (title plus optional hints)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextQuery {
    pub title: String,
    /// Artist for music, director for movies
    pub artist: Option<String>,
    pub album: Option<String>,
    pub year: Option<i32>,
    /// Restricts candidates to providers cataloguing this kind
    pub kind: Option<MediaKind>,
}

impl TextQuery {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_kind(mut self, kind: MediaKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Reject queries no provider could answer
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        Ok(())
    }

    /// Secondary field used for disambiguation, if the caller supplied one
    pub fn expected_artist(&self) -> Option<&str> {
        self.artist
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
    }
}

/// Barcode / UPC / EAN lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierQuery {
    pub code: String,
    pub code_kind: CodeKind,
}

impl IdentifierQuery {
    /// Normalize a scanned code (spaces and hyphens stripped) and classify it.
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        let code: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();
        if code.is_empty() {
            return Err(ValidationError::EmptyCode);
        }
        let code_kind = CodeKind::classify(&code);
        Ok(Self { code, code_kind })
    }
}

/// A single inbound resolution request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Text(TextQuery),
    Identifier(IdentifierQuery),
}

impl Query {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Query::Text(q) => q.validate(),
            Query::Identifier(q) if q.code.is_empty() => Err(ValidationError::EmptyCode),
            Query::Identifier(_) => Ok(()),
        }
    }
}

/// How much a result should be trusted
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Last-resort value, e.g. an unstructured product title
    Fallback,
    /// Heuristic match; a supplied hint didn't line up
    Fuzzy,
    /// Identifier hit or a text hit that agrees with every hint
    Exact,
}

impl Confidence {
    /// One step down, bottoming out at `Fallback`
    pub fn lowered(self) -> Self {
        match self {
            Confidence::Exact => Confidence::Fuzzy,
            Confidence::Fuzzy | Confidence::Fallback => Confidence::Fallback,
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::Exact => f.write_str("exact"),
            Confidence::Fuzzy => f.write_str("fuzzy"),
            Confidence::Fallback => f.write_str("fallback"),
        }
    }
}

/// Normalized record handed to the persistence layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderResult {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub year: Option<i32>,
    pub cover_url: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub label: Option<String>,
    /// Full director credit for movies
    pub director: Option<String>,
    /// Physical/retail format (Vinyl, CD, Cassette, DVD, ...)
    pub format: Option<String>,
    pub catalog_number: Option<String>,
    /// The catalog's own record id
    pub external_id: Option<String>,
    pub kind: Option<MediaKind>,
    /// Id of the provider that produced this record
    pub source: String,
    pub confidence: Confidence,
}

impl ProviderResult {
    /// An empty record attributed to `source`
    pub fn new(source: impl Into<String>, confidence: Confidence) -> Self {
        Self {
            title: None,
            artist: None,
            album: None,
            year: None,
            cover_url: None,
            genres: Vec::new(),
            label: None,
            director: None,
            format: None,
            catalog_number: None,
            external_id: None,
            kind: None,
            source: source.into(),
            confidence,
        }
    }

    /// Whether the record carries anything a catalog entry could be built from
    pub fn is_usable(&self) -> bool {
        has_text(&self.title) || has_text(&self.album)
    }

    /// Trim fields, tidy genres and drop implausible years.
    pub fn normalize(&mut self) {
        for field in [
            &mut self.title,
            &mut self.artist,
            &mut self.album,
            &mut self.cover_url,
            &mut self.label,
            &mut self.director,
            &mut self.format,
            &mut self.catalog_number,
            &mut self.external_id,
        ] {
            if let Some(value) = field.as_mut() {
                let trimmed = value.trim();
                if trimmed.len() != value.len() {
                    *value = trimmed.to_string();
                }
            }
        }

        let mut seen: Vec<String> = Vec::with_capacity(self.genres.len());
        self.genres.retain_mut(|genre| {
            let trimmed = genre.trim();
            if trimmed.is_empty() {
                return false;
            }
            let key = trimmed.to_lowercase();
            if seen.contains(&key) {
                return false;
            }
            seen.push(key);
            if trimmed.len() != genre.len() {
                *genre = trimmed.to_string();
            }
            true
        });

        if let Some(year) = self.year
            && !(MIN_PLAUSIBLE_YEAR..=MAX_PLAUSIBLE_YEAR).contains(&year)
        {
            self.year = None;
        }
    }
}

const MIN_PLAUSIBLE_YEAR: i32 = 1800;
const MAX_PLAUSIBLE_YEAR: i32 = 2100;

fn has_text(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.trim().is_empty())
}

/// Outcome of one provider invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttemptOutcome {
    Success,
    NotFound,
    /// Local token bucket refused the call; the client was never invoked
    AdmissionDenied,
    /// The provider itself throttled us
    RateLimited,
    Timeout,
    TransportError,
    InvalidResponse,
}

impl AttemptOutcome {
    /// Label used for log/metric export. Local and remote throttling share one.
    pub fn as_str(self) -> &'static str {
        match self {
            AttemptOutcome::Success => "success",
            AttemptOutcome::NotFound => "not-found",
            AttemptOutcome::AdmissionDenied | AttemptOutcome::RateLimited => "rate-limited",
            AttemptOutcome::Timeout => "timeout",
            AttemptOutcome::TransportError => "transport-error",
            AttemptOutcome::InvalidResponse => "invalid-response",
        }
    }
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ephemeral record of one provider invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attempt {
    pub provider: String,
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
    pub outcome: AttemptOutcome,
}

/// Errors a single provider call can produce
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("No matching record")]
    NotFound,

    #[error("Rate limited by provider - try again later")]
    RateLimited,

    #[error("Provider call timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("Provider does not support this lookup")]
    Unsupported,
}

impl ProviderError {
    /// How this failure is recorded in the attempt log
    pub fn outcome(&self) -> AttemptOutcome {
        match self {
            ProviderError::NotFound => AttemptOutcome::NotFound,
            ProviderError::RateLimited => AttemptOutcome::RateLimited,
            ProviderError::Timeout => AttemptOutcome::Timeout,
            ProviderError::Transport(_) => AttemptOutcome::TransportError,
            // Asking for an unsupported lookup is a caller bug, never a network event
            ProviderError::InvalidResponse(_) | ProviderError::Unsupported => {
                AttemptOutcome::InvalidResponse
            }
        }
    }
}

/// Malformed input rejected before any provider is consulted
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Identifier code is empty")]
    EmptyCode,

    #[error("Title is empty")]
    EmptyTitle,
}
