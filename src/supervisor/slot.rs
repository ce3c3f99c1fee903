// src/supervisor/slot.rs

//! Per-index supervision unit.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::exec::runner::{self, process_name};
use crate::output::{EventSink, ProcessEvent};
use crate::types::ExitOutcome;

/// Everything a unit needs to run one attempt and report back.
#[derive(Clone)]
pub(crate) struct UnitContext {
    pub cooldown: Duration,
    pub sink: Arc<dyn EventSink>,
    pub done_tx: mpsc::UnboundedSender<usize>,
}

/// Bookkeeping for one executable index.
///
/// - `cancel` stays alive for the whole supervision; every unit of this index
///   subscribes to it. Dropping it (with the supervisor) stops the index.
/// - `handle` is the currently running unit, joined before the next one
///   starts.
pub(crate) struct Slot {
    index: usize,
    path: PathBuf,
    cancel: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl Slot {
    pub fn new(index: usize, path: PathBuf) -> Self {
        let (cancel, _) = watch::channel(false);
        Self {
            index,
            path,
            cancel,
            handle: None,
        }
    }

    /// Start a fresh unit for this index, after joining the previous one.
    pub async fn launch(&mut self, ctx: &UnitContext) {
        if let Some(previous) = self.handle.take() {
            if let Err(e) = previous.await {
                warn!(index = self.index, path = ?self.path, error = %e, "previous unit did not finish cleanly");
            }
        }

        let cancel = self.cancel.subscribe();
        let ctx = ctx.clone();
        let index = self.index;
        let path = self.path.clone();

        self.handle = Some(tokio::spawn(async move {
            run_unit(index, path, ctx, cancel).await;
        }));
    }
}

/// Run one attempt, cool down, then report `index` as finished.
///
/// Nothing here can fail the supervisor: every outcome of the attempt leads
/// to the same cooldown-then-report path. Only cancellation ends the unit
/// without reporting.
async fn run_unit(
    index: usize,
    path: PathBuf,
    ctx: UnitContext,
    mut cancel: watch::Receiver<bool>,
) {
    if cancel.has_changed().is_err() {
        debug!(index, path = ?path, "supervisor gone before start; not launching");
        return;
    }

    let outcome = runner::run(&path, Arc::clone(&ctx.sink), &mut cancel).await;
    if outcome == ExitOutcome::Cancelled {
        return;
    }

    let name = process_name(&path);
    ctx.sink
        .record(&name, ProcessEvent::CoolingDown(ctx.cooldown));

    tokio::select! {
        _ = sleep(ctx.cooldown) => {}
        _ = cancel.changed() => {
            debug!(index, process = %name, "cancelled during cooldown");
            return;
        }
    }

    if ctx.done_tx.send(index).is_err() {
        debug!(index, process = %name, "completion channel closed; unit exiting");
    }
}
