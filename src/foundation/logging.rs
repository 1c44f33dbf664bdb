//! Installs the global `tracing` subscriber.
//!
//! Events go to stderr so they never interleave with the coloured status
//! lines the binary prints on stdout.

use crate::configuration::LoggingSettings;
use tracing_subscriber::{fmt, EnvFilter};

pub type LoggingInitError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Initializes logging from the settings file.
///
/// `RUST_LOG`, when set, takes precedence over `settings.filter`.
pub fn init_logging(settings: &LoggingSettings) -> Result<(), LoggingInitError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(settings.include_target);

    if settings.json {
        builder.json().flatten_event(true).try_init()
    } else {
        builder.try_init()
    }
}
