use std::fmt;

/// Which output stream of a child a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl StreamKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StreamKind::Stdout => "stdout",
            StreamKind::Stderr => "stderr",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How one run attempt of an executable ended.
///
/// Every variant leads to the same restart path; the distinction only shows
/// up in the logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Exited with status 0.
    Success,
    /// Non-zero exit. `code` is `None` when the child was killed by a signal.
    Failed { code: Option<i32> },
    /// The child could not be started.
    SpawnFailed { reason: String },
    /// The child started but one of its output pipes was not available.
    PipeUnavailable { stream: StreamKind },
    /// Waiting for the child failed.
    WaitFailed { reason: String },
    /// The attempt was stopped through its cancellation handle.
    Cancelled,
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitOutcome::Success => write!(f, "exited without an error"),
            ExitOutcome::Failed { code: Some(code) } => {
                write!(f, "exited with an error (exit status {code})")
            }
            ExitOutcome::Failed { code: None } => {
                write!(f, "exited with an error (terminated by signal)")
            }
            ExitOutcome::SpawnFailed { reason } => write!(f, "failed to start: {reason}"),
            ExitOutcome::PipeUnavailable { stream } => {
                write!(f, "failed to create {stream} pipe")
            }
            ExitOutcome::WaitFailed { reason } => write!(f, "failed waiting for exit: {reason}"),
            ExitOutcome::Cancelled => write!(f, "stopped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_kind_displays_lowercase() {
        assert_eq!(StreamKind::Stdout.to_string(), "stdout");
        assert_eq!(StreamKind::Stderr.to_string(), "stderr");
    }

    #[test]
    fn outcome_display_wording() {
        assert_eq!(ExitOutcome::Success.to_string(), "exited without an error");
        assert_eq!(
            ExitOutcome::Failed { code: Some(1) }.to_string(),
            "exited with an error (exit status 1)"
        );
        assert_eq!(
            ExitOutcome::PipeUnavailable {
                stream: StreamKind::Stdout
            }
            .to_string(),
            "failed to create stdout pipe"
        );
        assert_eq!(
            ExitOutcome::Failed { code: None }.to_string(),
            "exited with an error (terminated by signal)"
        );
        assert_eq!(ExitOutcome::Cancelled.to_string(), "stopped");
    }
}
