//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `lookup`: barcode, title and batch resolution
//! - `providers`: provider listing and config location

mod lookup;
mod providers;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use tokio::runtime::Runtime;

use media_resolver::config::{self, Config};
use media_resolver::error::Result;
use media_resolver::resolver::{
    AttemptOutcome, MediaKind, ProviderResult, Resolution, ResolutionStatus, TextQuery,
};

pub use lookup::{cmd_barcode, cmd_batch, cmd_search};
pub use providers::{cmd_config_path, cmd_providers};

/// Media Resolver CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Overall lookup budget in milliseconds (overrides config)
    #[arg(long, global = true)]
    pub deadline_ms: Option<u64>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// OMDb API key (or set OMDB_API_KEY env var)
    #[arg(long, global = true, env = "OMDB_API_KEY", hide_env_values = true)]
    pub omdb_key: Option<String>,

    /// Discogs personal access token (or set DISCOGS_TOKEN env var)
    #[arg(long, global = true, env = "DISCOGS_TOKEN", hide_env_values = true)]
    pub discogs_token: Option<String>,

    /// UPCitemdb user key (or set UPCITEMDB_KEY env var)
    #[arg(long, global = true, env = "UPCITEMDB_KEY", hide_env_values = true)]
    pub upcitemdb_key: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Media kind filter for title searches
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    Movie,
    Music,
}

impl From<KindArg> for MediaKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Movie => MediaKind::Movie,
            KindArg::Music => MediaKind::Music,
        }
    }
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a barcode (UPC/EAN)
    Barcode {
        /// The scanned code; spaces and hyphens are ignored
        code: String,
    },
    /// Resolve a title, optionally with artist/director, album and year hints
    Search {
        #[arg(long)]
        title: String,
        /// Artist for music, director for movies
        #[arg(long)]
        artist: Option<String>,
        #[arg(long)]
        album: Option<String>,
        #[arg(long)]
        year: Option<i32>,
        /// Only ask catalogs covering this kind of media
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
    },
    /// Resolve many barcodes concurrently
    Batch {
        /// Codes to resolve
        #[arg(required = true)]
        codes: Vec<String>,
        /// Maximum resolutions in flight
        #[arg(short, long, default_value = "4")]
        concurrency: usize,
    },
    /// List configured providers in the order they are tried
    Providers,
    /// Show where the config file is read from
    ConfigPath {
        /// Write a default config file there (never overwrites)
        #[arg(long)]
        init: bool,
    },
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli);
    let deadline = cli
        .deadline_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.resolver.deadline());

    match &cli.command {
        Commands::Barcode { code } => {
            let rt = Runtime::new()?;
            cmd_barcode(&rt, &config, code, deadline, cli.json)?;
        }
        Commands::Search {
            title,
            artist,
            album,
            year,
            kind,
        } => {
            let query = TextQuery {
                title: title.clone(),
                artist: artist.clone(),
                album: album.clone(),
                year: *year,
                kind: kind.map(MediaKind::from),
            };
            let rt = Runtime::new()?;
            cmd_search(&rt, &config, query, deadline, cli.json)?;
        }
        Commands::Batch { codes, concurrency } => {
            let rt = Runtime::new()?;
            cmd_batch(&rt, &config, codes, *concurrency, deadline, cli.json)?;
        }
        Commands::Providers => cmd_providers(&config, cli.json)?,
        Commands::ConfigPath { init } => cmd_config_path(cli.config.as_deref(), *init)?,
    }
    Ok(())
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Load config from `--config` or the default location, then apply
/// credentials given on the command line or in the environment.
fn load_config(cli: &Cli) -> Config {
    let mut config = match &cli.config {
        Some(path) => config::load_from(path),
        None => config::load(),
    };

    let providers = &mut config.providers;
    for (key, slot) in [
        (&cli.omdb_key, &mut providers.omdb.api_key),
        (&cli.discogs_token, &mut providers.discogs.api_key),
        (&cli.upcitemdb_key, &mut providers.upcitemdb.api_key),
    ] {
        if key.is_some() {
            slot.clone_from(key);
        }
    }
    config
}

/// Print a single resolution as text or JSON
pub(crate) fn print_resolution(resolution: &Resolution, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(resolution)?);
        return Ok(());
    }

    match &resolution.result {
        Some(result) => {
            println!(
                "✓ Match found via {} (confidence: {})",
                result.source, result.confidence
            );
            println!();
            print_result(result);
        }
        None if resolution.status == ResolutionStatus::DeadlineExceeded => {
            println!("✗ Gave up: deadline reached before any catalog answered.");
        }
        None => {
            println!("✗ No metadata found.");
        }
    }

    if !resolution.attempts.is_empty() {
        println!();
        println!("Attempts:");
        for attempt in &resolution.attempts {
            let marker = if attempt.outcome == AttemptOutcome::Success {
                "✓"
            } else {
                "·"
            };
            println!(
                "  {} {:<12} {:<17} {:>6} ms",
                marker,
                attempt.provider,
                attempt.outcome.as_str(),
                attempt.duration.as_millis()
            );
        }
    }
    Ok(())
}

fn print_result(result: &ProviderResult) {
    let fields = [
        ("Title", result.title.as_deref()),
        ("Artist", result.artist.as_deref()),
        ("Album", result.album.as_deref()),
        ("Director", result.director.as_deref()),
        ("Label", result.label.as_deref()),
        ("Format", result.format.as_deref()),
        ("Cat #", result.catalog_number.as_deref()),
        ("Cover", result.cover_url.as_deref()),
    ];
    for (name, value) in fields {
        if let Some(value) = value {
            println!("  {:<9} {}", format!("{}:", name), value);
        }
    }
    if let Some(year) = result.year {
        println!("  Year:     {}", year);
    }
    if !result.genres.is_empty() {
        println!("  Genres:   {}", result.genres.join(", "));
    }
}
