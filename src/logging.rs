//! Logging setup and error reporting.
//!
//! The subscriber is installed once, explicitly, from `main`. Components that
//! need to surface recoverable failures receive an [`ErrorSink`] instead of
//! writing to a global hook.

use std::error::Error;
use std::sync::Arc;

use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "info";

/// Install the global `tracing` subscriber.
///
/// Returns `false` if a subscriber was already installed.
pub fn init() -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}

/// Receiver for recoverable errors.
pub trait ErrorSink: Send + Sync {
    fn report(&self, context: &str, error: &dyn Error);
}

/// Forwards reports to `tracing` at warn level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ErrorSink for TracingSink {
    fn report(&self, context: &str, error: &dyn Error) {
        warn!(context, error = %error, "recoverable error");
    }
}

/// The sink used when the caller does not provide one.
pub fn default_sink() -> Arc<dyn ErrorSink> {
    Arc::new(TracingSink)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_harmless() {
        let _ = init();
        assert!(!init());
    }

    #[test]
    fn tracing_sink_accepts_reports() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.jpg");
        TracingSink.report("load", &err);
    }
}
