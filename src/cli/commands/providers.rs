//! Provider listing and config location commands.

use std::path::Path;

use serde_json::json;

use media_resolver::config::{self, Config};
use media_resolver::error::{Result, ResultExt};
use media_resolver::resolver::{Capabilities, ProviderEntry, build_resolver};

/// List providers in the order they will be tried
pub fn cmd_providers(config: &Config, json: bool) -> Result<()> {
    let resolver = build_resolver(config).with_context("building resolver")?;
    let limiter = resolver.limiter();

    if json {
        let entries: Vec<_> = resolver
            .providers()
            .iter()
            .map(|p| {
                json!({
                    "id": p.id(),
                    "rank": p.rank,
                    "capabilities": capability_names(p),
                    "media": p.client.media_kinds(),
                    "rate_key": p.rate_key,
                    "quota": limiter.quota_for(&p.rate_key),
                    "timeout_ms": p.timeout.as_millis() as u64,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if resolver.providers().is_empty() {
        println!("No providers enabled. Check {}", describe_config_path(None));
        return Ok(());
    }

    println!(
        "{:<5} {:<12} {:<16} {:<12} {:<12} {}",
        "RANK", "ID", "LOOKUPS", "MEDIA", "RATE KEY", "QUOTA"
    );
    for p in resolver.providers() {
        let quota = limiter.quota_for(&p.rate_key);
        let media: Vec<_> = p.client.media_kinds().iter().map(|k| k.to_string()).collect();
        println!(
            "{:<5} {:<12} {:<16} {:<12} {:<12} {} burst, {}/s, {} ms timeout",
            p.rank,
            p.id(),
            capability_names(p).join("+"),
            media.join("+"),
            p.rate_key,
            quota.capacity,
            quota.refill_per_sec,
            p.timeout.as_millis()
        );
    }
    Ok(())
}

/// Print the config file location, optionally writing a default config there
pub fn cmd_config_path(explicit: Option<&Path>, init: bool) -> Result<()> {
    if init {
        let path = config::write_default(explicit).with_context("writing default config")?;
        println!("✓ Wrote default config to {}", path.display());
        return Ok(());
    }
    println!("{}", describe_config_path(explicit));
    Ok(())
}

fn describe_config_path(explicit: Option<&Path>) -> String {
    let path = explicit.map(Path::to_path_buf).or_else(config::config_path);
    match path {
        Some(path) if path.exists() => format!("{}", path.display()),
        Some(path) => format!("{} (not created yet, using defaults)", path.display()),
        None => "No config directory available on this platform".to_string(),
    }
}

fn capability_names(entry: &ProviderEntry) -> Vec<&'static str> {
    let caps = entry.client.capabilities();
    let mut names = Vec::new();
    if caps.contains(Capabilities::IDENTIFIER) {
        names.push("barcode");
    }
    if caps.contains(Capabilities::TEXT) {
        names.push("text");
    }
    names
}
