//! Tracing subscriber setup shared by binaries and integration tests.

use odyssey_error::{ConfigError, OdysseyResult};
use tracing_subscriber::EnvFilter;

/// Install a formatted tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `debug` when `verbose`, else `info`.
///
/// # Errors
///
/// Returns a [`ConfigError`] if a global subscriber is already installed
/// or the filter directive is malformed.
pub fn init_tracing(verbose: bool) -> OdysseyResult<()> {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = match std::env::var("RUST_LOG") {
        Ok(directive) if !directive.is_empty() => EnvFilter::try_new(directive)
            .map_err(|e| ConfigError::for_key("RUST_LOG", e.to_string()))?,
        _ => EnvFilter::new(fallback),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| ConfigError::new(format!("Failed to install tracing subscriber: {}", e)))?;

    Ok(())
}
