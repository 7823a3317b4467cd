//! Command-line interface for media-resolver.
//!
//! This module provides CLI commands for resolving barcodes and titles
//! against the configured catalogs from a terminal.

mod commands;

pub use commands::{Cli, Commands, run_command};
