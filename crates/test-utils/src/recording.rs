use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use keepalive::{EventSink, ExitOutcome, ProcessEvent, StreamKind, TracingSink};

/// Owned copy of a [`ProcessEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedEvent {
    Starting,
    Line { stream: StreamKind, line: String },
    ReadFailed { stream: StreamKind, error: String },
    Exited(ExitOutcome),
    CoolingDown(Duration),
}

impl From<ProcessEvent<'_>> for RecordedEvent {
    fn from(event: ProcessEvent<'_>) -> Self {
        match event {
            ProcessEvent::Starting => RecordedEvent::Starting,
            ProcessEvent::Line { stream, line } => RecordedEvent::Line {
                stream,
                line: line.to_string(),
            },
            ProcessEvent::ReadFailed { stream, error } => RecordedEvent::ReadFailed {
                stream,
                error: error.to_string(),
            },
            ProcessEvent::Exited(outcome) => RecordedEvent::Exited(outcome.clone()),
            ProcessEvent::CoolingDown(delay) => RecordedEvent::CoolingDown(delay),
        }
    }
}

/// One recorded event with its process name and arrival time.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub process: String,
    pub at: Instant,
    pub event: RecordedEvent,
}

/// Sink that keeps every event in arrival order and also forwards it to
/// `tracing`, so failing tests show the usual log lines.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<Recorded>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<Recorded> {
        self.events.lock().unwrap().clone()
    }

    /// Events of one process, in arrival order.
    pub fn for_process(&self, process: &str) -> Vec<Recorded> {
        self.snapshot()
            .into_iter()
            .filter(|r| r.process == process)
            .collect()
    }

    /// Arrival times of `Starting` events for one process.
    pub fn starts(&self, process: &str) -> Vec<Instant> {
        self.times(process, |e| matches!(e, RecordedEvent::Starting))
    }

    /// Arrival times of `Exited` events for one process.
    pub fn exits(&self, process: &str) -> Vec<Instant> {
        self.times(process, |e| matches!(e, RecordedEvent::Exited(_)))
    }

    /// Outcomes of every finished attempt of one process.
    pub fn outcomes(&self, process: &str) -> Vec<ExitOutcome> {
        self.for_process(process)
            .into_iter()
            .filter_map(|r| match r.event {
                RecordedEvent::Exited(outcome) => Some(outcome),
                _ => None,
            })
            .collect()
    }

    /// Output lines of one process for one stream.
    pub fn lines(&self, process: &str, stream: StreamKind) -> Vec<String> {
        self.for_process(process)
            .into_iter()
            .filter_map(|r| match r.event {
                RecordedEvent::Line { stream: s, line } if s == stream => Some(line),
                _ => None,
            })
            .collect()
    }

    /// Poll until `pred` holds or `deadline` passes.
    pub async fn wait_until<F>(&self, deadline: Duration, pred: F) -> bool
    where
        F: Fn(&RecordingSink) -> bool,
    {
        let start = Instant::now();
        while start.elapsed() < deadline {
            if pred(self) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        pred(self)
    }

    fn times(&self, process: &str, pred: impl Fn(&RecordedEvent) -> bool) -> Vec<Instant> {
        self.for_process(process)
            .into_iter()
            .filter(|r| pred(&r.event))
            .map(|r| r.at)
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn record(&self, process: &str, event: ProcessEvent<'_>) {
        TracingSink.record(process, event);
        let mut guard = self.events.lock().unwrap();
        guard.push(Recorded {
            process: process.to_string(),
            at: Instant::now(),
            event: event.into(),
        });
    }
}
