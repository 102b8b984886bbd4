//! Log subscriber setup.
//!
//! Available with the `subscriber` feature. `RUST_LOG` takes precedence over
//! [`ResolverConfig::log_level`].

use crate::config::ResolverConfig;

/// Create a subscriber filtered by `RUST_LOG` or the configured level.
pub fn subscriber(config: &ResolverConfig) -> impl tracing::Subscriber + Send + Sync + use<> {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));

    tracing_subscriber::registry().with(filter).with(fmt::layer())
}

/// Install [`subscriber`] as the global default.
///
/// Returns `false` if a global subscriber was already set.
pub fn init(config: &ResolverConfig) -> bool {
    tracing::subscriber::set_global_default(subscriber(config)).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn test_subscriber_scoped() {
        let config = ResolverConfig::new().with_log_level(LogLevel::Debug);
        tracing::subscriber::with_default(subscriber(&config), || {
            tracing::debug!("scoped subscriber installed");
        });
    }
}
