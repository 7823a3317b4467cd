//! Discogs integration
//!
//! Marketplace catalog. Supports barcode and release-title/artist searches.

pub mod dto;
mod adapter;
mod client;

pub use client::{DEFAULT_BASE_URL, DiscogsClient};
