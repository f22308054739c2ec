//! Tracing subscriber setup for processes embedding the workflow.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

use crate::config::{LogFormat, OrderingConfig};

/// Installs the global tracing subscriber.
///
/// The filter comes from `RUST_LOG` when set and valid, otherwise from
/// `config.log_level`. Fails if a global subscriber is already installed.
pub fn init_tracing(config: &OrderingConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_rejected() {
        let config = OrderingConfig {
            log_format: LogFormat::Json,
            ..OrderingConfig::default()
        };

        // Only one global subscriber can exist per process.
        let _ = init_tracing(&config);
        assert!(init_tracing(&config).is_err());
        assert!(init_tracing(&OrderingConfig::default()).is_err());
    }
}
