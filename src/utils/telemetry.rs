//! Tracing setup
//!
//! Installs the global `tracing` subscriber: an `EnvFilter` taken from
//! `RUST_LOG` (or the supplied default) and a plain fmt layer.

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter {filter:?}: {source}")]
    Filter {
        filter: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled(#[from] tracing_subscriber::util::TryInitError),
}

/// Build the filter: `RUST_LOG` wins, otherwise `default_filter`
pub fn env_filter(default_filter: &str) -> Result<EnvFilter, TelemetryError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(default_filter).map_err(|source| TelemetryError::Filter {
            filter: default_filter.to_string(),
            source,
        }),
    }
}

pub fn init_tracing(default_filter: &str) -> Result<(), TelemetryError> {
    let filter = env_filter(default_filter)?;

    Registry::default()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .try_init()?;

    Ok(())
}
