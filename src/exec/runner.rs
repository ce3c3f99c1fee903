// src/exec/runner.rs

//! Single process instance runner.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;

use tokio::process::{Child, Command};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::exec::drain::DrainHandle;
use crate::output::{EventSink, ProcessEvent};
use crate::types::{ExitOutcome, StreamKind};

/// Display name of an executable: the last path component.
pub fn process_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// One execution attempt of one executable.
///
/// A fresh instance is built for every attempt, so nothing about a previous
/// child (handles, pipes) can leak into the next one.
#[derive(Debug)]
pub struct ProcessInstance {
    name: String,
    path: PathBuf,
    command: Command,
}

impl ProcessInstance {
    pub fn new(path: &Path) -> Self {
        let name = process_name(path);

        let mut command = Command::new(path);
        #[cfg(unix)]
        command.arg0(&name);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        Self {
            name,
            path: path.to_path_buf(),
            command,
        }
    }

    /// Run the child to completion.
    ///
    /// Emits `Starting` before spawning and `Exited` once the child is gone
    /// and both drain tasks have been stopped and joined, so every captured
    /// line is recorded before the exit event.
    ///
    /// If `cancel` fires (a value is sent or the sender is dropped) while the
    /// child runs, the child is killed and the outcome is
    /// [`ExitOutcome::Cancelled`].
    pub async fn run(
        self,
        sink: Arc<dyn EventSink>,
        cancel: &mut watch::Receiver<bool>,
    ) -> ExitOutcome {
        let Self {
            name,
            path,
            mut command,
        } = self;

        sink.record(&name, ProcessEvent::Starting);

        let spawned = command.spawn();
        drop(command);

        let outcome = match spawned {
            Ok(child) => {
                debug!(process = %name, path = ?path, pid = ?child.id(), "child spawned");
                supervise_child(&name, child, &sink, cancel).await
            }
            Err(e) => ExitOutcome::SpawnFailed {
                reason: e.to_string(),
            },
        };

        sink.record(&name, ProcessEvent::Exited(&outcome));
        outcome
    }
}

async fn supervise_child(
    name: &str,
    mut child: Child,
    sink: &Arc<dyn EventSink>,
    cancel: &mut watch::Receiver<bool>,
) -> ExitOutcome {
    // Ownership of each handle moves into its drain task.
    let (stdout, stderr) = match (child.stdout.take(), child.stderr.take()) {
        (Some(stdout), Some(stderr)) => (stdout, stderr),
        (stdout, _) => {
            let stream = if stdout.is_none() {
                StreamKind::Stdout
            } else {
                StreamKind::Stderr
            };
            reap(name, &mut child).await;
            return ExitOutcome::PipeUnavailable { stream };
        }
    };

    let stdout_drain =
        DrainHandle::spawn(name.to_string(), StreamKind::Stdout, stdout, Arc::clone(sink));
    let stderr_drain =
        DrainHandle::spawn(name.to_string(), StreamKind::Stderr, stderr, Arc::clone(sink));

    let outcome = tokio::select! {
        status = child.wait() => match status {
            Ok(status) => outcome_from_status(status),
            Err(e) => ExitOutcome::WaitFailed { reason: e.to_string() },
        },

        _ = cancel.changed() => {
            debug!(process = %name, "cancellation requested; killing child");
            reap(name, &mut child).await;
            ExitOutcome::Cancelled
        }
    };

    tokio::join!(stdout_drain.stop(), stderr_drain.stop());
    outcome
}

async fn reap(name: &str, child: &mut Child) {
    if let Err(e) = child.kill().await {
        warn!(process = %name, error = %e, "failed to kill child process");
    }
}

fn outcome_from_status(status: ExitStatus) -> ExitOutcome {
    if status.success() {
        ExitOutcome::Success
    } else {
        ExitOutcome::Failed {
            code: status.code(),
        }
    }
}

/// Run one attempt of the executable at `path`.
pub async fn run(
    path: &Path,
    sink: Arc<dyn EventSink>,
    cancel: &mut watch::Receiver<bool>,
) -> ExitOutcome {
    ProcessInstance::new(path).run(sink, cancel).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_name_is_the_basename() {
        assert_eq!(process_name(Path::new("/srv/bin/worker")), "worker");
        assert_eq!(process_name(Path::new("relative/tool.sh")), "tool.sh");
        assert_eq!(process_name(Path::new("solo")), "solo");
    }
}
