//! OMDb integration
//!
//! Movie database. Text lookups only; the `artist` hint of a text query is
//! treated as the expected director.

pub mod dto;
mod adapter;
mod client;

pub use client::{DEFAULT_BASE_URL, OmdbClient};
