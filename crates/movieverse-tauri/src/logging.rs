//! Logging setup for the MovieVerse app
//!
//! Installs a `tracing` subscriber writing formatted events to stderr.
//! The level is controlled by the `RUST_LOG` environment variable.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset or invalid
pub const DEFAULT_FILTER: &str = "movieverse_core=debug,movieverse_tauri=debug,warn";

/// Initialize the logging system.
///
/// # Errors
/// Returns an error string if a global subscriber is already installed.
pub fn init_logging() -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()
        .map_err(|e| e.to_string())?;

    tracing::info!("Logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }
}
