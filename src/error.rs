//! Application-wide error types.
//!
//! This module provides a unified error hierarchy for the crate.
//! Library modules use specific error types via `thiserror`, while
//! the CLI/main uses `anyhow` for convenient error propagation.
//!
//! # Design
//!
//! - [`Error`]: Top-level error enum
//! - Module-specific errors ([`ConfigError`], [`RegistryError`],
//!   [`ValidationError`]) for detailed handling
//! - Provider failures are NOT errors at this level: they end up in the
//!   resolution's attempt log
//!
//! # Example
//!
//! ```ignore
//! use media_resolver::error::{Result, ResultExt};
//!
//! fn lookup(config: &Config) -> Result<Resolver> {
//!     let resolver = build_resolver(config).with_context("building resolver")?;
//!     Ok(resolver)
//! }
//! ```

use crate::config::ConfigError;
use crate::resolver::{RegistryError, ValidationError};

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error.
///
/// Aggregates errors from all subsystems for unified handling.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Resolver construction error
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Malformed query
    #[error("Invalid query: {0}")]
    Validation(#[from] ValidationError),

    /// Output serialization error
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().context(ctx))
    }
}
