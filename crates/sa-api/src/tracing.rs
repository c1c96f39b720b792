//! Logging setup.
//!
//! Development gets pretty, human-readable output with source locations;
//! production gets flattened JSON lines for log aggregation. `RUST_LOG`
//! overrides the default filter in both cases, e.g.
//! `RUST_LOG=sa_api=trace,tower_http=debug`.

use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Environment;

/// Filter used when `RUST_LOG` is unset.
pub fn default_filter(env: Environment) -> &'static str {
    if env.is_development() {
        "debug,tower_http=debug,sqlx=warn,hyper=info,reqwest=info"
    } else {
        "info,tower_http=info,sqlx=warn"
    }
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init_tracing(env: Environment) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(env)));

    if env.is_development() {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true)
                    .pretty()
                    .with_filter(env_filter),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .flatten_event(true)
                    .with_target(true)
                    .with_filter(env_filter),
            )
            .init();
    }

    tracing::info!(environment = ?env, "tracing initialized");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filters_parse() {
        for env in [Environment::Development, Environment::Production] {
            assert!(EnvFilter::try_new(default_filter(env)).is_ok());
        }
        assert!(default_filter(Environment::Production).starts_with("info"));
    }
}
