//! iTunes Search API integration
//!
//! Consumer search API covering both albums and movies. Text lookups only.

pub mod dto;
mod adapter;
mod client;

pub use client::{DEFAULT_BASE_URL, ITunesClient};
