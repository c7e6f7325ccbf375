//! Unified test logging initialization.
//!
//! One init for unit and integration tests alike, so log behavior does
//! not depend on which test binary ran first.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Initialize structured logging for tests.
///
/// Idempotent and race-safe; repeated calls are no-ops. The level is
/// read from `TEST_LOG` first, then `RUST_LOG`, then defaults to
/// `warn`. The subscriber writes through the test writer so cargo
/// captures output per test, and omits timestamps for stable logs.
pub fn init() {
    INITIALIZED.get_or_init(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}
