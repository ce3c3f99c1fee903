// src/config.rs

//! Supervisor configuration.
//!
//! There is no config file: everything comes from the command line (or is
//! filled in directly by library users).

use std::path::PathBuf;
use std::time::Duration;

use crate::cli::CliArgs;

/// Default delay between a child's exit and its relaunch.
pub const DEFAULT_COOLDOWN_MS: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorConfig {
    /// Directory scanned for executables.
    pub dir: PathBuf,
    /// Delay between a child's exit and its relaunch.
    pub cooldown: Duration,
}

impl SupervisorConfig {
    pub fn new(dir: impl Into<PathBuf>, cooldown: Duration) -> Self {
        Self {
            dir: dir.into(),
            cooldown,
        }
    }

    pub fn from_args(args: &CliArgs) -> Self {
        Self::new(&args.dir, Duration::from_millis(args.cooldown))
    }
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self::new(".", Duration::from_millis(DEFAULT_COOLDOWN_MS))
    }
}
