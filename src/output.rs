// src/output.rs

//! Where process lifecycle events and captured child output go.
//!
//! Runners and drain tasks never call the logging macros directly for
//! per-process events; they hand a [`ProcessEvent`] to an [`EventSink`].
//! Production uses [`TracingSink`], which turns every event into a
//! `tracing` event tagged with the process name (and stream kind for output
//! lines). Tests plug in a recording sink to assert on ordering and timing.

use std::io;
use std::time::Duration;

use tracing::{debug, error, info};

use crate::types::{ExitOutcome, StreamKind};

/// One observable thing that happened to a supervised process.
#[derive(Debug, Clone, Copy)]
pub enum ProcessEvent<'a> {
    /// About to spawn a new instance.
    Starting,
    /// One non-empty line read from a child stream.
    Line { stream: StreamKind, line: &'a str },
    /// A read from a child stream failed (reported once per failure streak).
    ReadFailed {
        stream: StreamKind,
        error: &'a io::Error,
    },
    /// The attempt is over; every captured line has already been emitted.
    Exited(&'a ExitOutcome),
    /// Waiting `Duration` before the next attempt.
    CoolingDown(Duration),
}

/// Receiver for process events.
///
/// Called concurrently from runner and drain tasks.
pub trait EventSink: Send + Sync {
    fn record(&self, process: &str, event: ProcessEvent<'_>);
}

/// Default sink: forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, process: &str, event: ProcessEvent<'_>) {
        match event {
            ProcessEvent::Starting => info!(process = %process, "will start"),
            ProcessEvent::Line { stream, line } => {
                debug!(process = %process, stream = %stream, "{line}")
            }
            ProcessEvent::ReadFailed { stream, error } => debug!(
                process = %process,
                stream = %stream,
                error = %error,
                "failed to read from pipe"
            ),
            ProcessEvent::Exited(outcome) => log_exit(process, outcome),
            ProcessEvent::CoolingDown(delay) => debug!(
                process = %process,
                delay_ms = delay.as_millis() as u64,
                "restarting after cooldown"
            ),
        }
    }
}

fn log_exit(process: &str, outcome: &ExitOutcome) {
    match outcome {
        ExitOutcome::Success | ExitOutcome::Cancelled => info!(process = %process, "{outcome}"),
        ExitOutcome::Failed { code } => info!(process = %process, exit_code = ?code, "{outcome}"),
        ExitOutcome::SpawnFailed { .. }
        | ExitOutcome::PipeUnavailable { .. }
        | ExitOutcome::WaitFailed { .. } => error!(process = %process, "{outcome}"),
    }
}
