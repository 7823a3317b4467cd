//! Builds the provider set and limiter quotas from configuration.

use std::sync::Arc;

use super::aggregator::{ProviderEntry, Resolver};
use super::traits::ProviderClient;
use super::{discogs, http, itunes, musicbrainz, omdb, upcitemdb};
use crate::config::{Config, ProviderConfig, ProviderDefaults, ProviderSettings};
use crate::ratelimit::{Quota, RateLimiter};

pub const MUSICBRAINZ: ProviderDefaults = ProviderDefaults {
    base_url: musicbrainz::DEFAULT_BASE_URL,
    rank: 10,
    timeout_ms: 3_000,
    // MusicBrainz asks for at most one request per second
    rate_limit: Quota {
        capacity: 1,
        refill_per_sec: 1.0,
    },
};

pub const DISCOGS: ProviderDefaults = ProviderDefaults {
    base_url: discogs::DEFAULT_BASE_URL,
    rank: 20,
    timeout_ms: 3_000,
    // 60/min authenticated
    rate_limit: Quota {
        capacity: 5,
        refill_per_sec: 1.0,
    },
};

pub const OMDB: ProviderDefaults = ProviderDefaults {
    base_url: omdb::DEFAULT_BASE_URL,
    rank: 10,
    timeout_ms: 3_000,
    rate_limit: Quota {
        capacity: 5,
        refill_per_sec: 0.5,
    },
};

pub const ITUNES: ProviderDefaults = ProviderDefaults {
    base_url: itunes::DEFAULT_BASE_URL,
    rank: 30,
    timeout_ms: 3_000,
    // Roughly 20/min before Apple starts answering 403
    rate_limit: Quota {
        capacity: 5,
        refill_per_sec: 0.33,
    },
};

pub const UPCITEMDB: ProviderDefaults = ProviderDefaults {
    base_url: upcitemdb::DEFAULT_BASE_URL,
    rank: 40,
    timeout_ms: 4_000,
    // Trial plan: 6 burst, 100/day
    rate_limit: Quota {
        capacity: 6,
        refill_per_sec: 0.1,
    },
};

/// Errors building the resolver
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Build a resolver for every enabled, usable provider in `config`.
///
/// All providers share one HTTP connection pool. A provider that needs a
/// credential it doesn't have is skipped with a warning.
pub fn build_resolver(config: &Config) -> Result<Resolver, RegistryError> {
    let http_client = http::build_client()?;
    let providers = &config.providers;
    let mut registered: Vec<(ProviderSettings, Arc<dyn ProviderClient>)> = Vec::new();

    if let Some(settings) = settings_for("musicbrainz", &providers.musicbrainz, &MUSICBRAINZ) {
        let client = musicbrainz::MusicBrainzClient::new(http_client.clone(), &settings.base_url);
        registered.push((settings, Arc::new(client)));
    }

    if let Some(settings) = settings_for("discogs", &providers.discogs, &DISCOGS) {
        if settings.api_key.is_none() {
            tracing::info!("No Discogs token configured, using anonymous access");
        }
        let client = discogs::DiscogsClient::new(
            http_client.clone(),
            &settings.base_url,
            settings.api_key.clone(),
        );
        registered.push((settings, Arc::new(client)));
    }

    if let Some(settings) = settings_for("omdb", &providers.omdb, &OMDB) {
        match settings.api_key.clone() {
            Some(key) => {
                let client = omdb::OmdbClient::new(http_client.clone(), &settings.base_url, key);
                registered.push((settings, Arc::new(client)));
            }
            None => tracing::warn!("OMDb enabled but no API key configured, skipping"),
        }
    }

    if let Some(settings) = settings_for("itunes", &providers.itunes, &ITUNES) {
        let client = itunes::ITunesClient::new(http_client.clone(), &settings.base_url);
        registered.push((settings, Arc::new(client)));
    }

    if let Some(settings) = settings_for("upcitemdb", &providers.upcitemdb, &UPCITEMDB) {
        let client = upcitemdb::UpcItemDbClient::new(
            http_client.clone(),
            &settings.base_url,
            settings.api_key.clone(),
        );
        registered.push((settings, Arc::new(client)));
    }

    let mut limiter = RateLimiter::new(config.resolver.default_rate_limit);
    for (settings, _) in &registered {
        // Providers sharing a key share the first quota registered for it
        if !limiter.has_quota(&settings.rate_key) {
            limiter = limiter.with_quota(settings.rate_key.clone(), settings.rate_limit);
        }
    }

    let resolver = registered.into_iter().fold(
        Resolver::new(Arc::new(limiter)).with_default_deadline(config.resolver.deadline()),
        |resolver, (settings, client)| {
            tracing::debug!(
                provider = client.id(),
                rank = settings.rank,
                rate_key = %settings.rate_key,
                "Registered provider"
            );
            resolver.with_provider(
                ProviderEntry::new(client, settings.rank, settings.timeout)
                    .with_rate_key(settings.rate_key),
            )
        },
    );

    tracing::info!("Resolver ready with {} providers", resolver.providers().len());
    Ok(resolver)
}

fn settings_for(
    id: &str,
    config: &ProviderConfig,
    defaults: &ProviderDefaults,
) -> Option<ProviderSettings> {
    if !config.enabled {
        tracing::debug!(provider = id, "Provider disabled in config");
        return None;
    }
    Some(config.resolve(id, defaults))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::Capabilities;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;

    fn ids(resolver: &Resolver) -> Vec<&str> {
        resolver.providers().iter().map(|p| p.id()).collect()
    }

    #[test]
    fn test_default_config_skips_keyless_omdb() {
        let resolver = build_resolver(&Config::default()).unwrap();
        assert_eq!(ids(&resolver), vec!["musicbrainz", "discogs", "itunes", "upcitemdb"]);
        assert_eq!(resolver.default_deadline(), Duration::from_secs(8));
    }

    #[test]
    fn test_omdb_registered_with_key() {
        let mut config = Config::default();
        config.providers.omdb.api_key = Some("secret".to_string());

        let resolver = build_resolver(&config).unwrap();

        // Equal ranks break ties by id
        assert_eq!(
            ids(&resolver),
            vec!["musicbrainz", "omdb", "discogs", "itunes", "upcitemdb"]
        );
        let omdb = &resolver.providers()[1];
        assert_eq!(omdb.client.capabilities(), Capabilities::TEXT);
    }

    #[test]
    fn test_disabled_and_reranked_providers() {
        let mut config = Config::default();
        config.providers.itunes.enabled = false;
        config.providers.upcitemdb.rank = Some(1);

        let resolver = build_resolver(&config).unwrap();

        assert_eq!(ids(&resolver), vec!["upcitemdb", "musicbrainz", "discogs"]);
    }

    #[test]
    fn test_quotas_registered_per_rate_key() {
        let mut config = Config::default();
        config.providers.discogs.rate_key = Some("shared".to_string());
        config.providers.itunes.rate_key = Some("shared".to_string());

        let resolver = build_resolver(&config).unwrap();
        let limiter = resolver.limiter();

        assert_eq!(limiter.quota_for("musicbrainz"), MUSICBRAINZ.rate_limit);
        assert_eq!(limiter.quota_for("shared"), DISCOGS.rate_limit);
        assert_eq!(limiter.quota_for("unknown"), Quota::default());
        let discogs = resolver.providers().iter().find(|p| p.id() == "discogs").unwrap();
        assert_eq!(discogs.rate_key, "shared");
    }

    #[tokio::test]
    async fn test_barcode_falls_back_across_real_clients() {
        let musicbrainz = MockServer::start_async().await;
        musicbrainz
            .mock_async(|when, then| {
                when.method(GET).path("/release");
                then.status(200).json_body(json!({"count": 0, "releases": []}));
            })
            .await;

        let discogs = MockServer::start_async().await;
        discogs
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/database/search")
                    .query_param("barcode", "075021029811");
                then.status(200).json_body(json!({
                    "results": [{
                        "id": 1,
                        "type": "release",
                        "title": "Daft Punk - Discovery",
                        "year": "2001",
                        "genre": ["Electronic"],
                        "label": ["Virgin"],
                        "format": ["CD", "Album"]
                    }]
                }));
            })
            .await;

        let mut config = Config::default();
        config.providers.musicbrainz.base_url = Some(musicbrainz.base_url());
        config.providers.discogs.base_url = Some(discogs.base_url());
        config.providers.upcitemdb.enabled = false;

        let resolver = build_resolver(&config).unwrap();
        let resolution = resolver
            .resolve_by_identifier("075021029811", Duration::from_secs(5))
            .await
            .unwrap();

        assert!(resolution.found());
        let result = resolution.result.unwrap();
        assert_eq!(result.source, "discogs");
        assert_eq!(result.artist.as_deref(), Some("Daft Punk"));
        assert_eq!(result.album.as_deref(), Some("Discovery"));
        assert_eq!(result.year, Some(2001));
        assert_eq!(resolution.attempts.len(), 2);
    }

    #[tokio::test]
    async fn test_matrix_director_through_omdb() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/")
                    .query_param("t", "The Matrix")
                    .query_param("type", "movie");
                then.status(200).json_body(json!({
                    "Title": "The Matrix",
                    "Year": "1999",
                    "Genre": "Action, Sci-Fi",
                    "Director": "Lana Wachowski, Lilly Wachowski",
                    "imdbID": "tt0133093",
                    "Response": "True"
                }));
            })
            .await;

        let mut config = Config::default();
        config.providers.omdb.api_key = Some("secret".to_string());
        config.providers.omdb.base_url = Some(server.base_url());
        config.providers.itunes.enabled = false;

        let resolver = build_resolver(&config).unwrap();
        let query = crate::resolver::TextQuery::new("The Matrix")
            .with_artist("Wachowski")
            .with_kind(crate::resolver::MediaKind::Movie);
        let resolution = resolver
            .resolve_by_text(query, Duration::from_secs(5))
            .await
            .unwrap();

        let result = resolution.result.unwrap();
        assert_eq!(result.source, "omdb");
        assert_eq!(result.director.as_deref(), Some("Lana Wachowski, Lilly Wachowski"));
        assert_eq!(result.year, Some(1999));
    }
}
