// tests/runner.rs
#![cfg(unix)]

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::watch;
use tokio::time::timeout;

use keepalive::exec::run;
use keepalive::{ExitOutcome, StreamKind};
use keepalive_test_utils::{
    RecordedEvent, RecordingSink, init_tracing, make_dir_with_mode, with_timeout, write_executable,
};

type TestResult = Result<(), Box<dyn Error>>;

const K: usize = 20;

#[tokio::test]
async fn every_line_is_recorded_before_the_exit_event() -> TestResult {
    init_tracing();
    let tmp = TempDir::new()?;
    let script = write_executable(
        tmp.path(),
        "chatty",
        &format!(
            "i=0\nwhile [ $i -lt {K} ]; do\n  echo \"out-$i\"\n  echo \"err-$i\" >&2\n  i=$((i+1))\ndone\nexit 0"
        ),
    )?;

    let sink = RecordingSink::new();
    let (_cancel_tx, mut cancel) = watch::channel(false);

    let outcome = with_timeout(run(&script, Arc::new(sink.clone()), &mut cancel)).await;
    assert_eq!(outcome, ExitOutcome::Success);

    let expected_out: Vec<String> = (0..K).map(|i| format!("out-{i}")).collect();
    let expected_err: Vec<String> = (0..K).map(|i| format!("err-{i}")).collect();
    assert_eq!(sink.lines("chatty", StreamKind::Stdout), expected_out);
    assert_eq!(sink.lines("chatty", StreamKind::Stderr), expected_err);

    let events = sink.for_process("chatty");
    assert_eq!(events.first().map(|r| &r.event), Some(&RecordedEvent::Starting));
    assert_eq!(
        events.last().map(|r| &r.event),
        Some(&RecordedEvent::Exited(ExitOutcome::Success)),
        "exit must be the last event, after every line"
    );
    Ok(())
}

#[tokio::test]
async fn last_words_before_exit_are_not_lost() -> TestResult {
    init_tracing();
    let tmp = TempDir::new()?;
    let script = write_executable(tmp.path(), "lastwords", "printf 'goodbye\\n'\nexit 4")?;

    let sink = RecordingSink::new();
    let (_cancel_tx, mut cancel) = watch::channel(false);

    let outcome = with_timeout(run(&script, Arc::new(sink.clone()), &mut cancel)).await;

    assert_eq!(outcome, ExitOutcome::Failed { code: Some(4) });
    assert_eq!(sink.lines("lastwords", StreamKind::Stdout), vec!["goodbye"]);
    Ok(())
}

#[tokio::test]
async fn empty_lines_are_skipped() -> TestResult {
    let tmp = TempDir::new()?;
    let script = write_executable(tmp.path(), "gappy", "printf 'a\\n\\n\\nb\\n'")?;

    let sink = RecordingSink::new();
    let (_cancel_tx, mut cancel) = watch::channel(false);
    with_timeout(run(&script, Arc::new(sink.clone()), &mut cancel)).await;

    assert_eq!(sink.lines("gappy", StreamKind::Stdout), vec!["a", "b"]);
    Ok(())
}

#[tokio::test]
async fn killed_by_signal_is_a_failure_without_code() -> TestResult {
    let tmp = TempDir::new()?;
    let script = write_executable(tmp.path(), "doomed", "kill -9 $$")?;

    let sink = RecordingSink::new();
    let (_cancel_tx, mut cancel) = watch::channel(false);
    let outcome = with_timeout(run(&script, Arc::new(sink.clone()), &mut cancel)).await;

    assert_eq!(outcome, ExitOutcome::Failed { code: None });
    Ok(())
}

#[tokio::test]
async fn directory_that_looks_executable_fails_to_spawn() -> TestResult {
    init_tracing();
    let tmp = TempDir::new()?;
    let dir = make_dir_with_mode(tmp.path(), "not-a-program", 0o755)?;

    let sink = RecordingSink::new();
    let (_cancel_tx, mut cancel) = watch::channel(false);
    let outcome = with_timeout(run(&dir, Arc::new(sink.clone()), &mut cancel)).await;

    assert!(
        matches!(outcome, ExitOutcome::SpawnFailed { .. }),
        "got {outcome:?}"
    );

    let events: Vec<RecordedEvent> = sink
        .for_process("not-a-program")
        .into_iter()
        .map(|r| r.event)
        .collect();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0], RecordedEvent::Starting);
    assert_eq!(events[1], RecordedEvent::Exited(outcome));
    Ok(())
}

#[tokio::test]
async fn cancellation_kills_a_running_child() -> TestResult {
    let tmp = TempDir::new()?;
    let script = write_executable(tmp.path(), "sleeper", "echo up\nexec sleep 30")?;

    let sink = RecordingSink::new();
    let (cancel_tx, mut cancel) = watch::channel(false);

    let runner = tokio::spawn({
        let sink = sink.clone();
        async move { run(&script, Arc::new(sink), &mut cancel).await }
    });

    assert!(
        sink.wait_until(Duration::from_secs(5), |s| !s.lines("sleeper", StreamKind::Stdout).is_empty())
            .await
    );
    cancel_tx.send(true)?;

    let outcome = timeout(Duration::from_secs(5), runner).await??;
    assert_eq!(outcome, ExitOutcome::Cancelled);
    assert_eq!(sink.outcomes("sleeper"), vec![ExitOutcome::Cancelled]);
    Ok(())
}

#[tokio::test]
async fn background_writer_does_not_hold_the_attempt_open() -> TestResult {
    init_tracing();
    let tmp = TempDir::new()?;
    // The subshell inherits stdout and keeps writing for a few seconds after
    // the script itself has exited.
    let script = write_executable(
        tmp.path(),
        "forker",
        "(i=0; while [ $i -lt 300 ]; do echo tick; sleep 0.01; i=$((i+1)); done) &\nexit 0",
    )?;

    let sink = RecordingSink::new();
    let (_cancel_tx, mut cancel) = watch::channel(false);

    let started = std::time::Instant::now();
    let outcome = timeout(
        Duration::from_secs(1),
        run(&script, Arc::new(sink.clone()), &mut cancel),
    )
    .await?;

    assert_eq!(outcome, ExitOutcome::Success);
    assert!(
        started.elapsed() < Duration::from_secs(1),
        "attempt ended {:?} after start",
        started.elapsed()
    );
    assert_eq!(sink.outcomes("forker"), vec![ExitOutcome::Success]);
    Ok(())
}
