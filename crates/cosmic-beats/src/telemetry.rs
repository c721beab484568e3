use crate::config::{AppEnvironment, TelemetryConfig};
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log filter '{value}'")]
    EnvFilter {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("unable to install tracing subscriber: {0}")]
    Subscriber(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Resolve the filter: `RUST_LOG` wins, otherwise the configured level.
pub fn env_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.log_level).map_err(|source| TelemetryError::EnvFilter {
        value: config.log_level.clone(),
        source,
    })
}

/// Install the global compact subscriber. Fails if one is already installed.
///
/// Development builds keep event targets so service and router logs can be told apart.
pub fn init(environment: AppEnvironment, config: &TelemetryConfig) -> Result<(), TelemetryError> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(config)?)
        .with_target(environment == AppEnvironment::Development)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}
