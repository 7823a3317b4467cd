//! Media Resolver - resolve physical media metadata from the terminal.
//!
//! Looks up barcodes and titles against the configured catalogs and prints
//! the first usable record, or a per-catalog attempt log when nothing matched.

mod cli;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Logs go to stderr so --json output stays machine-readable
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("media_resolver=info".parse()?))
        .init();

    cli::run_command(&args)
}
