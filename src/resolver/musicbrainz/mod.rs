//! MusicBrainz integration
//!
//! Music metadata registry. Supports barcode lookups (release search on the
//! `barcode` field) and text lookups (release + artist phrase search).
//! Cover art URLs point at the Cover Art Archive for the matched release.
//!
//! API docs: https://musicbrainz.org/doc/MusicBrainz_API

pub mod dto;
mod adapter;
mod client;

pub use client::{DEFAULT_BASE_URL, DEFAULT_COVER_BASE_URL, MusicBrainzClient};
