use crate::config::LoggingSettings;
use crate::error::AppError;
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber
///
/// `RUST_LOG` takes precedence over the configured level. Returns `false`
/// when a subscriber was already installed, so embedding applications that
/// set up their own logging are left alone.
pub fn init(settings: &LoggingSettings) -> Result<bool, AppError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .map_err(|e| AppError::Telemetry(format!("invalid log level {:?}: {}", settings.level, e)))?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    let installed = if settings.format == "pretty" {
        subscriber.pretty().try_init()
    } else {
        subscriber.json().try_init()
    };

    Ok(installed.is_ok())
}
