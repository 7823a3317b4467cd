//! The provider seam.
//!
//! Every external catalog implements [`ProviderClient`]. The resolver only ever
//! talks to `Arc<dyn ProviderClient>`, so tests substitute the mocks in
//! [`mocks`] for the real HTTP clients.
//!
//! # Example
//!
//! ```ignore
//! use media_resolver::resolver::traits::{Capabilities, ProviderClient};
//!
//! if client.capabilities().contains(Capabilities::IDENTIFIER) {
//!     let result = client.lookup_by_identifier(&query).await?;
//! }
//! ```

use async_trait::async_trait;
use bitflags::bitflags;

use super::domain::{CodeKind, IdentifierQuery, MediaKind, ProviderError, ProviderResult, TextQuery};

bitflags! {
    /// Which lookups a provider supports
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// Barcode / UPC / EAN lookups
        const IDENTIFIER = 0b0000_0001;
        /// Title (plus hints) lookups
        const TEXT       = 0b0000_0010;
    }
}

/// One external metadata catalog.
///
/// Implementations hold only fixed configuration (base URL, credentials, a
/// shared HTTP client) and make exactly one outbound request per lookup.
/// They never retry and never enforce their own deadline: the caller drops
/// the future when time runs out.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Short stable id, e.g. "musicbrainz"
    fn id(&self) -> &str;

    fn capabilities(&self) -> Capabilities;

    /// Media kinds this catalog covers
    fn media_kinds(&self) -> &[MediaKind];

    /// Whether the catalog understands codes of this kind
    fn accepts_code(&self, kind: CodeKind) -> bool {
        kind.is_barcode()
    }

    /// Look up a barcode.
    async fn lookup_by_identifier(
        &self,
        _query: &IdentifierQuery,
    ) -> Result<ProviderResult, ProviderError> {
        Err(ProviderError::Unsupported)
    }

    /// Look up a title, using any hints the query carries.
    async fn lookup_by_text(&self, _query: &TextQuery) -> Result<ProviderResult, ProviderError> {
        Err(ProviderError::Unsupported)
    }
}

/// Mock providers for resolver tests.
#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::resolver::domain::Confidence;

    /// What a mock returns when called
    #[derive(Debug, Clone)]
    pub enum Scripted {
        Found(ProviderResult),
        Fail(ProviderError),
    }

    /// Provider with a canned response, an optional delay and a call counter.
    pub struct MockProvider {
        pub id: String,
        pub capabilities: Capabilities,
        pub kinds: Vec<MediaKind>,
        pub response: Scripted,
        /// Simulated network latency
        pub delay: Option<Duration>,
        calls: AtomicUsize,
    }

    impl MockProvider {
        fn new(id: &str, response: Scripted) -> Self {
            Self {
                id: id.to_string(),
                capabilities: Capabilities::IDENTIFIER | Capabilities::TEXT,
                kinds: vec![MediaKind::Music, MediaKind::Movie],
                response,
                delay: None,
                calls: AtomicUsize::new(0),
            }
        }

        /// Create a mock that returns a record with the given title.
        pub fn found(id: &str, title: &str) -> Self {
            let mut result = ProviderResult::new(id, Confidence::Exact);
            result.title = Some(title.to_string());
            Self::new(id, Scripted::Found(result))
        }

        /// Create a mock that returns the given record.
        pub fn with_result(id: &str, result: ProviderResult) -> Self {
            Self::new(id, Scripted::Found(result))
        }

        /// Create a mock that finds nothing.
        pub fn not_found(id: &str) -> Self {
            Self::new(id, Scripted::Fail(ProviderError::NotFound))
        }

        /// Create a mock that fails with an error.
        pub fn failing(id: &str, error: ProviderError) -> Self {
            Self::new(id, Scripted::Fail(error))
        }

        pub fn delayed(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn only(mut self, capabilities: Capabilities) -> Self {
            self.capabilities = capabilities;
            self
        }

        pub fn kinds(mut self, kinds: &[MediaKind]) -> Self {
            self.kinds = kinds.to_vec();
            self
        }

        /// How many times a lookup was invoked
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        async fn respond(&self) -> Result<ProviderResult, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match &self.response {
                Scripted::Found(result) => Ok(result.clone()),
                Scripted::Fail(err) => Err(err.clone()),
            }
        }
    }

    #[async_trait]
    impl ProviderClient for MockProvider {
        fn id(&self) -> &str {
            &self.id
        }

        fn capabilities(&self) -> Capabilities {
            self.capabilities
        }

        fn media_kinds(&self) -> &[MediaKind] {
            &self.kinds
        }

        async fn lookup_by_identifier(
            &self,
            _query: &IdentifierQuery,
        ) -> Result<ProviderResult, ProviderError> {
            if !self.capabilities.contains(Capabilities::IDENTIFIER) {
                return Err(ProviderError::Unsupported);
            }
            self.respond().await
        }

        async fn lookup_by_text(&self, _query: &TextQuery) -> Result<ProviderResult, ProviderError> {
            if !self.capabilities.contains(Capabilities::TEXT) {
                return Err(ProviderError::Unsupported);
            }
            self.respond().await
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_counts_calls() {
            let mock = MockProvider::found("a", "Discovery");
            let query = TextQuery::new("Discovery");
            let result = mock.lookup_by_text(&query).await.unwrap();
            assert_eq!(result.title.as_deref(), Some("Discovery"));
            assert_eq!(mock.calls(), 1);
        }

        #[tokio::test]
        async fn test_mock_respects_capabilities() {
            let mock = MockProvider::found("a", "Discovery").only(Capabilities::TEXT);
            let query = IdentifierQuery::new("075021029811").unwrap();
            let result = mock.lookup_by_identifier(&query).await;
            assert_eq!(result, Err(ProviderError::Unsupported));
            assert_eq!(mock.calls(), 0);
        }

        #[tokio::test]
        async fn test_mock_error() {
            let mock = MockProvider::failing("a", ProviderError::RateLimited);
            let result = mock.lookup_by_text(&TextQuery::new("x")).await;
            assert_eq!(result, Err(ProviderError::RateLimited));
        }
    }
}
