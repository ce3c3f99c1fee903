// src/supervisor/mod.rs

//! Keep-alive supervisor.
//!
//! The supervisor owns the discovered [`ExecutableSet`] and keeps one child
//! running per entry, forever:
//!
//! ```text
//! Starting -> Running -> Exited -> CoolingDown -> Starting -> ...
//! ```
//!
//! Each index is driven by a unit (see [`slot`]) that runs one attempt,
//! sleeps the cooldown, then reports its index on a shared unbounded
//! completion channel. The dispatch loop in [`Supervisor::supervise`]
//! receives the index, joins the finished unit and starts a new one for the
//! same index. Cooldowns of different indices therefore run in parallel and
//! never hold up the dispatch loop.

mod slot;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::SupervisorConfig;
use crate::discovery::{self, ExecutableSet};
use crate::errors::{KeepaliveError, Result};
use crate::fs::FileSystem;
use crate::output::{EventSink, TracingSink};

use slot::{Slot, UnitContext};

pub struct Supervisor {
    executables: ExecutableSet,
    cooldown: Duration,
    sink: Arc<dyn EventSink>,
}

impl std::fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("executables", &self.executables)
            .field("cooldown", &self.cooldown)
            .finish_non_exhaustive()
    }
}

impl Supervisor {
    /// Discover executables in `config.dir` and build a supervisor for them.
    ///
    /// Discovery errors are returned as-is; nothing is started.
    pub fn new(config: &SupervisorConfig) -> Result<Self> {
        let executables = discovery::discover_executables(&config.dir)?;
        Ok(Self::from_executables(executables, config.cooldown))
    }

    /// Same as [`Supervisor::new`] but discovering through `fs`.
    pub fn with_filesystem(config: &SupervisorConfig, fs: &dyn FileSystem) -> Result<Self> {
        let executables = discovery::discover_with(fs, &config.dir)?;
        Ok(Self::from_executables(executables, config.cooldown))
    }

    /// Build a supervisor for an already computed set.
    pub fn from_executables(executables: ExecutableSet, cooldown: Duration) -> Self {
        Self {
            executables,
            cooldown,
            sink: Arc::new(TracingSink),
        }
    }

    /// Replace the event sink (defaults to [`TracingSink`]).
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn executables(&self) -> &ExecutableSet {
        &self.executables
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Launch every executable and keep relaunching them.
    ///
    /// Does not return under normal operation. Dropping the returned future
    /// stops every unit and kills their children.
    pub async fn supervise(self) -> Result<()> {
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<usize>();
        let ctx = UnitContext {
            cooldown: self.cooldown,
            sink: Arc::clone(&self.sink),
            done_tx,
        };

        if self.executables.is_empty() {
            warn!("no executables discovered; nothing to supervise");
        }

        info!(
            count = self.executables.len(),
            cooldown_ms = self.cooldown.as_millis() as u64,
            "supervisor started"
        );

        let mut slots: Vec<Slot> = self
            .executables
            .iter()
            .enumerate()
            .map(|(index, path)| Slot::new(index, path.to_path_buf()))
            .collect();

        for slot in slots.iter_mut() {
            slot.launch(&ctx).await;
        }

        // `ctx` keeps a sender alive, so `recv` only yields `None` if that
        // invariant is ever broken.
        while let Some(index) = done_rx.recv().await {
            match slots.get_mut(index) {
                Some(slot) => {
                    debug!(index, "relaunching after cooldown");
                    slot.launch(&ctx).await;
                }
                None => warn!(index, "completion reported for unknown index; ignoring"),
            }
        }

        Err(KeepaliveError::CompletionChannelClosed)
    }
}
