//! UPCitemdb integration
//!
//! Consumer product search by barcode. Results are unstructured retail
//! listings and always carry `Fallback` confidence.

pub mod dto;
mod adapter;
mod client;

pub use client::{DEFAULT_BASE_URL, UpcItemDbClient};
