// Logging setup

use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Settings;

/// Initialise the global subscriber. Logs go to stderr so that visitor
/// output on stdout can be piped.
pub fn init_logging(settings: &Settings) -> Result<(), String> {
    let filter = EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|e| {
        eprintln!(
            "fwpipe: invalid log filter '{}' ({}), using 'warn'",
            settings.log_filter, e
        );
        EnvFilter::new("warn")
    });

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(settings.log_ansi)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| format!("failed to initialise logging: {}", e))?;

    debug!("logging initialised with filter '{}'", settings.log_filter);
    Ok(())
}
