//! Structured logging on stderr.
//!
//! Stdout carries command output only, so it stays safe to pipe into other
//! tools. Records emitted by the library through the `log` facade are
//! forwarded into the same subscriber.

use tracing_subscriber::EnvFilter;

use crate::config::Config;

fn filter_from_config(config: &Config) -> EnvFilter {
    EnvFilter::new(config.log_level.as_filter_str())
}

/// Initialise the logging subsystem based on configuration.
///
/// Log level precedence (highest to lowest):
///
/// 1. CLI `--log-level`
/// 2. `SCOPE_RULES_LOG_LEVEL`
/// 3. `warn`
///
/// If a global subscriber is already set, this function silently keeps it.
pub fn init_logging(config: &Config) {
    let result = tracing_subscriber::fmt()
        .with_env_filter(filter_from_config(config))
        .with_writer(std::io::stderr)
        .with_target(true)
        .without_time()
        .try_init();
    if result.is_err() {
        tracing::debug!("logging already initialised; keeping existing subscriber");
    }
}
