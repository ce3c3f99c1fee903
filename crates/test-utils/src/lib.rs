pub mod recording;
#[cfg(unix)]
pub mod scripts;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

pub use recording::{Recorded, RecordedEvent, RecordingSink};
#[cfg(unix)]
pub use scripts::{make_dir_with_mode, write_executable, write_file_with_mode};

static INIT: Once = Once::new();

/// Upper bound for any single supervised scenario in the test suite.
pub const TEST_DEADLINE: Duration = Duration::from_secs(10);

/// Install a subscriber for supervisor and runner tests.
///
/// Reads the same `KEEPALIVE_LOG` filter as the binary (default `info`), so
/// `KEEPALIVE_LOG=keepalive=debug` shows captured child lines and restart
/// decisions for a failing test.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(keepalive::logging::LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new("info"));

        // A second subscriber from another test binary is not an error here.
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(false)
            .try_init();
    });
}

/// Await `f`, failing the test if a child or drain keeps it open past
/// [`TEST_DEADLINE`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(TEST_DEADLINE, f)
        .await
        .unwrap_or_else(|_| panic!("supervised scenario still running after {TEST_DEADLINE:?}"))
}
