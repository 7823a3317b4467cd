//! Test utilities and fixtures for media-resolver tests.
//!
//! This module provides common fixtures and resolver builders to reduce
//! boilerplate in tests.
//!
//! # Example
//!
//! ```ignore
//! use media_resolver::test_utils::{resolver_with, daft_punk_discovery};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let provider = Arc::new(MockProvider::with_result("a", daft_punk_discovery("a")));
//!     let resolver = resolver_with(&[provider]);
//!     // ... test logic
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use crate::ratelimit::{Quota, RateLimiter};
use crate::resolver::domain::{Confidence, MediaKind, ProviderResult};
use crate::resolver::traits::mocks::MockProvider;
use crate::resolver::{ProviderEntry, Resolver};

/// Per-call timeout used by [`resolver_with`]
pub const TEST_PROVIDER_TIMEOUT: Duration = Duration::from_secs(2);

/// A limiter that will not get in the way of ordinary tests.
pub fn generous_limiter() -> Arc<RateLimiter> {
    Arc::new(RateLimiter::new(Quota::per_second(1_000)))
}

/// Build a resolver over mocks, ranked in slice order.
///
/// Each mock gets its own rate key (its id) and [`TEST_PROVIDER_TIMEOUT`].
pub fn resolver_with(providers: &[Arc<MockProvider>]) -> Resolver {
    providers
        .iter()
        .enumerate()
        .fold(Resolver::new(generous_limiter()), |resolver, (rank, provider)| {
            let client: Arc<dyn crate::resolver::ProviderClient> = provider.clone();
            resolver.with_provider(ProviderEntry::new(client, rank as u32, TEST_PROVIDER_TIMEOUT))
        })
}

/// The record a catalog returns for barcode 075021029811.
pub fn daft_punk_discovery(source: &str) -> ProviderResult {
    let mut result = ProviderResult::new(source, Confidence::Exact);
    result.title = Some("Discovery".to_string());
    result.album = Some("Discovery".to_string());
    result.artist = Some("Daft Punk".to_string());
    result.year = Some(2001);
    result.label = Some("Virgin".to_string());
    result.genres = vec!["Electronic".to_string(), "House".to_string()];
    result.kind = Some(MediaKind::Music);
    result
}

/// A movie record with a full director credit.
pub fn the_matrix(source: &str) -> ProviderResult {
    let mut result = ProviderResult::new(source, Confidence::Exact);
    result.title = Some("The Matrix".to_string());
    result.director = Some("Lana Wachowski, Lilly Wachowski".to_string());
    result.year = Some(1999);
    result.genres = vec!["Action".to_string(), "Sci-Fi".to_string()];
    result.kind = Some(MediaKind::Movie);
    result
}
