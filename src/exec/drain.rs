// src/exec/drain.rs

//! Stream drain tasks.
//!
//! Each child stream gets its own Tokio task that owns the stream handle.
//! The task reads bounded chunks, logs every non-empty `\n`-separated piece
//! of a chunk, and keeps going until the runner sends an explicit stop
//! signal after the child has exited. After the stop signal it reads
//! whatever the child left in the pipe, until end-of-stream, until the pipe
//! stays idle for [`IDLE_BACKOFF`], or until [`FLUSH_LIMIT`] has passed,
//! whichever comes first. A background process that inherited the pipe and
//! keeps writing cannot hold the drain open past that limit.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{trace, warn};

use crate::output::{EventSink, ProcessEvent};
use crate::types::StreamKind;

/// Upper bound for a single read.
pub const READ_BUFFER_SIZE: usize = 1024;

/// Pause after a failed read, and how long a stopped drain waits for more
/// data before giving up on end-of-stream.
pub const IDLE_BACKOFF: Duration = Duration::from_millis(25);

/// Hard upper bound on reading after the stop signal.
pub const FLUSH_LIMIT: Duration = Duration::from_millis(100);

/// Split one read chunk into loggable lines.
///
/// Splitting is per chunk: a line that straddles two reads comes out as two
/// lines. Empty pieces are dropped.
pub fn chunk_lines(chunk: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(chunk)
        .split('\n')
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Report a read error only once per streak of failures.
#[derive(Debug, Default)]
pub struct ReadErrorDebounce {
    previous_failed: bool,
}

impl ReadErrorDebounce {
    /// Record a failed read; returns whether it should be reported.
    pub fn on_error(&mut self) -> bool {
        let report = !self.previous_failed;
        self.previous_failed = true;
        report
    }

    /// Record a successful read, re-arming reporting.
    pub fn on_success(&mut self) {
        self.previous_failed = false;
    }
}

/// A running drain task and the means to stop it.
#[derive(Debug)]
pub struct DrainHandle {
    stream: StreamKind,
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl DrainHandle {
    /// Spawn a drain task that takes ownership of `reader`.
    pub fn spawn<R>(
        process: String,
        stream: StreamKind,
        reader: R,
        sink: Arc<dyn EventSink>,
    ) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (stop, stop_rx) = oneshot::channel();
        let task = tokio::spawn(drain(process, stream, reader, sink, stop_rx));
        Self { stream, stop, task }
    }

    /// Send the stop signal and wait for the task to flush and finish.
    pub async fn stop(self) {
        // The task may already be gone only if it panicked; join reports that.
        let _ = self.stop.send(());
        if let Err(e) = self.task.await {
            warn!(stream = %self.stream, error = %e, "drain task did not finish cleanly");
        }
    }
}

async fn drain<R>(
    process: String,
    stream: StreamKind,
    mut reader: R,
    sink: Arc<dyn EventSink>,
    mut stop: oneshot::Receiver<()>,
) where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    let mut debounce = ReadErrorDebounce::default();

    loop {
        tokio::select! {
            // Once the child is gone, stop wins over a stream that never dries up.
            biased;

            _ = &mut stop => break,

            read = reader.read(&mut buf) => match read {
                Ok(0) => {
                    trace!(process = %process, stream = %stream, "end of stream; waiting for stop signal");
                    let _ = (&mut stop).await;
                    return;
                }
                Ok(n) => {
                    debounce.on_success();
                    emit_lines(sink.as_ref(), &process, stream, &buf[..n]);
                }
                Err(error) => {
                    if debounce.on_error() {
                        sink.record(&process, ProcessEvent::ReadFailed { stream, error: &error });
                    }
                    sleep(IDLE_BACKOFF).await;
                }
            },
        }
    }

    let leftover = flush(&process, stream, &mut reader, sink.as_ref(), &mut buf, &mut debounce);
    if timeout(FLUSH_LIMIT, leftover).await.is_err() {
        trace!(process = %process, stream = %stream, "pipe still busy after stop; leaving it");
    }
}

/// Read what the child left in the pipe until end-of-stream or idle.
async fn flush<R>(
    process: &str,
    stream: StreamKind,
    reader: &mut R,
    sink: &dyn EventSink,
    buf: &mut [u8],
    debounce: &mut ReadErrorDebounce,
) where
    R: AsyncRead + Unpin,
{
    loop {
        match timeout(IDLE_BACKOFF, reader.read(buf)).await {
            Ok(Ok(0)) => break,
            Ok(Ok(n)) => {
                debounce.on_success();
                emit_lines(sink, process, stream, &buf[..n]);
            }
            Ok(Err(error)) => {
                if debounce.on_error() {
                    sink.record(process, ProcessEvent::ReadFailed { stream, error: &error });
                }
                break;
            }
            Err(_) => {
                trace!(process = %process, stream = %stream, "pipe idle after stop; leaving it");
                break;
            }
        }
    }
}

fn emit_lines(sink: &dyn EventSink, process: &str, stream: StreamKind, chunk: &[u8]) {
    for line in chunk_lines(chunk) {
        sink.record(process, ProcessEvent::Line { stream, line: &line });
    }
}
