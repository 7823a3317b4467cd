//! UPCitemdb API Data Transfer Objects
//!
//! API Reference: https://www.upcitemdb.com/api/explorer

use serde::{Deserialize, Serialize};

/// Lookup response; errors share the envelope with a non-"OK" code
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LookupResponse {
    /// "OK", "INVALID_UPC", "TOO_FAST", "EXCEED_LIMIT", ...
    pub code: String,
    pub message: Option<String>,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Item {
    pub ean: Option<String>,
    pub upc: Option<String>,
    /// Free-form retail title, e.g. "Daft Punk - Discovery [CD]"
    pub title: Option<String>,
    pub brand: Option<String>,
    /// Google-style taxonomy path, e.g. "Media > Music & Sound Recordings > Music CDs"
    pub category: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

// ============================================================================
// CONTRACT TESTS
// ============================================================================
