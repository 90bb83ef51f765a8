//! Unified test logging initialization
//!
//! One init function shared by unit tests and integration tests so every
//! binary in the workspace logs the same way.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Initialize structured logging for tests.
///
/// Idempotent and race-safe; call it from every test entry point. The filter
/// is resolved in this order:
///
/// 1. `TEST_LOG` environment variable (preferred)
/// 2. `RUST_LOG` environment variable (fallback)
/// 3. `"warn"` (default, quiet)
///
/// Set `TEST_LOG_FORMAT=json` to emit JSON lines instead of the human format.
/// Output goes through `with_test_writer()` so cargo and nextest capture it
/// per test, and timestamps are suppressed for stable output.
pub fn init() {
    INITIALIZED.get_or_init(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        let builder = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time();

        let as_json = std::env::var("TEST_LOG_FORMAT").is_ok_and(|v| v == "json");
        if as_json {
            // Never panic if something else already installed a subscriber.
            builder.json().try_init().ok();
        } else {
            builder.try_init().ok();
        }
    });
}
