//! Diagnostic logging to stderr.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "TASKMGR_LOG";

/// Installs the global subscriber. `TASKMGR_LOG` overrides the level.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
