use crate::consts::{DEFAULT_LOG_FILTER, ENV_LOG_FILTER};
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Diagnostics go to stderr so they never mix with the report on stdout.
pub fn init() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = EnvFilter::try_from_env(ENV_LOG_FILTER)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

        let result = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_ansi(crate::console::is_stderr_terminal())
            .try_init();

        if result.is_err() {
            tracing::debug!("Global tracing subscriber already initialized");
        }
    });
}
