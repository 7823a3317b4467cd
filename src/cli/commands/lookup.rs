//! Barcode and title lookup commands.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde_json::json;
use tokio::runtime::Runtime;

use media_resolver::config::Config;
use media_resolver::error::{Result, ResultExt};
use media_resolver::ratelimit;
use media_resolver::resolver::{TextQuery, build_resolver};

use super::print_resolution;

/// Resolve a single barcode
pub fn cmd_barcode(
    rt: &Runtime,
    config: &Config,
    code: &str,
    deadline: Duration,
    json: bool,
) -> Result<()> {
    let resolver = build_resolver(config).with_context("building resolver")?;

    if !json {
        println!("Resolving barcode: {}", code);
        println!();
    }

    let resolution = rt
        .block_on(resolver.resolve_by_identifier(code, deadline))
        .with_context(format!("resolving barcode {:?}", code))?;
    print_resolution(&resolution, json)
}

/// Resolve a title with optional hints
pub fn cmd_search(
    rt: &Runtime,
    config: &Config,
    query: TextQuery,
    deadline: Duration,
    json: bool,
) -> Result<()> {
    let resolver = build_resolver(config).with_context("building resolver")?;

    if !json {
        match &query.artist {
            Some(artist) => println!("Searching: {} ({})", query.title, artist),
            None => println!("Searching: {}", query.title),
        }
        println!();
    }

    let resolution = rt
        .block_on(resolver.resolve_by_text(query, deadline))
        .with_context("resolving title")?;
    print_resolution(&resolution, json)
}

/// Resolve many barcodes with at most `concurrency` in flight.
///
/// All lookups share one resolver, so provider quotas hold across the batch.
pub fn cmd_batch(
    rt: &Runtime,
    config: &Config,
    codes: &[String],
    concurrency: usize,
    deadline: Duration,
    json: bool,
) -> Result<()> {
    let resolver = build_resolver(config).with_context("building resolver")?;

    let mut outcomes = rt.block_on(async {
        let sweeper = ratelimit::spawn_sweeper(
            resolver.limiter().clone(),
            config.resolver.sweep_interval(),
            config.resolver.idle_horizon(),
        );

        let resolver = &resolver;
        let outcomes: Vec<_> = stream::iter(codes.iter().enumerate())
            .map(|(idx, code)| async move {
                (idx, code, resolver.resolve_by_identifier(code, deadline).await)
            })
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await;

        sweeper.abort();
        outcomes
    });
    outcomes.sort_by_key(|(idx, _, _)| *idx);

    if json {
        let entries: Vec<_> = outcomes
            .iter()
            .map(|(_, code, outcome)| match outcome {
                Ok(resolution) => json!({ "code": code, "resolution": resolution }),
                Err(e) => json!({ "code": code, "error": e.to_string() }),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    let mut found = 0;
    for (_, code, outcome) in &outcomes {
        match outcome {
            Ok(resolution) => match &resolution.result {
                Some(result) => {
                    found += 1;
                    println!(
                        "✓ {:<14} {} - {} ({}, {})",
                        code,
                        result.artist.as_deref().or(result.director.as_deref()).unwrap_or("?"),
                        result.album.as_deref().or(result.title.as_deref()).unwrap_or("?"),
                        result.source,
                        result.confidence
                    );
                }
                None => println!("✗ {:<14} not found ({} attempts)", code, resolution.attempts.len()),
            },
            Err(e) => println!("✗ {:<14} {}", code, e),
        }
    }

    println!();
    println!("Resolved {}/{} codes", found, outcomes.len());
    Ok(())
}
