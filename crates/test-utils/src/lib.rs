//! Shared helpers for rmq-portable's integration tests.
//!
//! - [`builders`]: synthetic install trees on disk.
//! - [`fake_process`]: an in-memory [`ProcessTable`](rmq_portable::process::ProcessTable).
//! - [`sink`]: an output sink that records what the broker printed.

pub mod builders;
pub mod fake_process;
pub mod sink;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use rmq_portable::logging::LOG_ENV_VAR;
use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Upper bound for any single supervisor call in a test.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Route `tracing` output through the test harness, once per binary.
///
/// Output shows only for failing tests unless run with `--nocapture`. The
/// filter comes from `RMQ_PORTABLE_LOG`, then `RUST_LOG`, then `info`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// Await `f`, panicking if it takes longer than [`TEST_TIMEOUT`]. A hung
/// kill or sweep should fail the test, not the whole CI job.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(TEST_TIMEOUT, f)
        .await
        .unwrap_or_else(|_| panic!("timed out after {TEST_TIMEOUT:?}"))
}
