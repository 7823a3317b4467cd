//! Media Resolver - metadata resolution for physical media.
//!
//! Resolves a scanned barcode or a title into a normalized metadata record by
//! consulting a ranked list of external catalogs under a time budget and a
//! shared per-catalog rate limiter.

pub mod config;
pub mod error;
pub mod ratelimit;
pub mod resolver;
#[cfg(test)]
pub mod test_utils;
