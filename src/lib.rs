// src/lib.rs

pub mod cli;
pub mod config;
pub mod discovery;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod output;
pub mod supervisor;
pub mod types;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::SupervisorConfig;
use crate::supervisor::Supervisor;

pub use crate::discovery::ExecutableSet;
pub use crate::errors::KeepaliveError;
pub use crate::output::{EventSink, ProcessEvent, TracingSink};
pub use crate::types::{ExitOutcome, StreamKind};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config from the CLI
/// - executable discovery (fatal errors propagate)
/// - the supervisor loop
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config = SupervisorConfig::from_args(&args);
    let supervisor = Supervisor::new(&config)?;

    if args.dry_run {
        print_dry_run(&config, supervisor.executables());
        return Ok(());
    }

    debug!(executables = ?supervisor.executables().as_slice(), "will execute these files");

    // Dropping the supervisor future on Ctrl-C stops every unit and kills
    // the children.
    tokio::select! {
        res = supervisor.supervise() => res?,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("interrupt received; stopping all processes");
        }
    }

    Ok(())
}

/// Simple dry-run output: print what would be supervised.
fn print_dry_run(config: &SupervisorConfig, executables: &ExecutableSet) {
    println!("keepalive dry-run");
    println!("  dir = {}", config.dir.display());
    println!("  cooldown = {}ms", config.cooldown.as_millis());
    println!();

    println!("executables ({}):", executables.len());
    for (index, path) in executables.iter().enumerate() {
        println!("  [{index}] {}", path.display());
    }

    debug!("dry-run complete (no execution)");
}
