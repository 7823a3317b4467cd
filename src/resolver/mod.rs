//! Metadata resolution for physical media.
//!
//! Given a scanned barcode or a title (plus optional hints), consult a ranked
//! list of external catalogs one at a time and return the first usable,
//! normalized record. Failures of individual catalogs never surface as errors;
//! they are recorded as attempts and drive fallback to the next catalog.
//!
//! # Architecture
//!
//! - `domain`: our own query/result/outcome types
//! - `traits`: the [`ProviderClient`] seam every catalog implements
//! - `musicbrainz`, `discogs`, `omdb`, `itunes`, `upcitemdb`: one module per
//!   catalog, each split into DTOs, an adapter and an HTTP client
//! - `aggregator`: the [`Resolver`] loop (admission, deadlines, fallback)
//! - `registry`: builds a [`Resolver`] from [`crate::config::Config`]
//!
//! # Example
//!
//! ```ignore
//! let resolver = registry::build_resolver(&config::load())?;
//! let resolution = resolver
//!     .resolve_by_identifier("075021029811", Duration::from_secs(5))
//!     .await?;
//! if let Some(result) = resolution.result {
//!     println!("{:?} by {:?}", result.album, result.artist);
//! }
//! ```

pub mod aggregator;
pub mod discogs;
pub mod domain;
pub mod http;
pub mod itunes;
pub mod matching;
pub mod musicbrainz;
pub mod omdb;
pub mod registry;
pub mod traits;
pub mod upcitemdb;

pub use aggregator::{DEFAULT_DEADLINE, ProviderEntry, Resolution, ResolutionStatus, Resolver};
pub use domain::{
    Attempt, AttemptOutcome, CodeKind, Confidence, IdentifierQuery, MediaKind, ProviderError,
    ProviderResult, Query, TextQuery, ValidationError,
};
pub use registry::{RegistryError, build_resolver};
pub use traits::{Capabilities, ProviderClient};
