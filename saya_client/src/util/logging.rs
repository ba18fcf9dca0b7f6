//! Logging initialization.
//!
//! Sets up a global `tracing` subscriber writing to stderr, guarded by a
//! [`Once`] so repeated calls (e.g. from several tests) are harmless. The
//! verbosity comes from `RUST_LOG` when set, otherwise from the level passed
//! in.
//!
//! [`log_level_from_env`] is separate from subscriber setup: it derives the
//! level token forwarded to the external program via its `--log-level` flag.

use std::io::stderr;
use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt::layer, prelude::*};

static INIT: Once = Once::new();

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Initializes the logging system once for the process.
pub fn init_logging(log_level: &str) {
    INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("{log_level},saya_client=debug")));

        tracing_subscriber::registry()
            .with(env_filter)
            .with(layer().with_writer(stderr).with_ansi(true))
            .init();
    });
}

/// Initialize verbose logging for tests.
pub fn init_test_logging() {
    init_logging("trace");
}

/// Returns the log level for the external program from the environment.
///
/// `SAYA_LOG_LEVEL` wins over `SAYA_LOG`. An empty or unset environment
/// yields an empty string (no `--log-level` flag is emitted then); a value
/// that is not one of `error|warn|info|debug|trace` coerces to `trace`.
pub fn log_level_from_env() -> String {
    let mut level = String::new();
    for key in ["SAYA_LOG_LEVEL", "SAYA_LOG"] {
        if let Ok(val) = std::env::var(key) {
            let val = val.trim().to_lowercase();
            if !val.is_empty() {
                level = val;
                break;
            }
        }
    }
    if level.is_empty() {
        return level;
    }
    if !LOG_LEVELS.contains(&level.as_str()) {
        return "trace".to_string();
    }
    level
}
