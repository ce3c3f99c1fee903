// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::DEFAULT_COOLDOWN_MS;

/// Command-line arguments for `keepalive`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "keepalive",
    version,
    about = "Execute every executable in a folder in parallel and keep them alive.",
    long_about = None
)]
pub struct CliArgs {
    /// Folder containing the executables to run.
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Milliseconds between restarts if one of the executables exits.
    #[arg(
        short = 't',
        long,
        visible_alias = "timeout",
        value_name = "MS",
        default_value_t = DEFAULT_COOLDOWN_MS
    )]
    pub cooldown: u64,

    /// Verbose output (debug level, includes child output).
    #[arg(short, long)]
    pub verbose: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// Takes precedence over `--verbose`. If neither is given,
    /// `KEEPALIVE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Discover and print the executables, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
