pub mod audit;
pub mod auth;
pub mod config;
pub mod error;
pub mod model;

use crate::config::{LogFormat, LoggingConfig};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init_tracing() {
    init_tracing_with(&LoggingConfig::default());
}

/// Installs the global subscriber; panics if one is already set.
pub fn init_tracing_with(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry().with(filter);

    match logging.format {
        LogFormat::Text => registry.with(fmt::layer().with_target(false)).init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(false))
            .init(),
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_tracing_installs_global_subscriber() {
        super::init_tracing();
        tracing::info!("tracing initialised");
        assert!(tracing::dispatcher::has_been_set());
    }
}
