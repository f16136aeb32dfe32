//! # Structured Logging Module
//!
//! Environment-aware structured logging for following registration runs
//! across their concurrent resolution tasks.

use std::sync::OnceLock;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration.
///
/// `RUST_LOG` overrides the environment-derived level. Production output is
/// JSON, everything else is human-readable. Safe to call more than once and
/// from multiple hosts; only the first call installs a subscriber.
pub fn init() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = get_log_level(&environment);

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

        let subscriber = if environment == "production" {
            tracing_subscriber::registry().with(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(false)
                    .json()
                    .with_filter(filter)
                    .boxed(),
            )
        } else {
            tracing_subscriber::registry().with(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(true)
                    .with_filter(filter)
                    .boxed(),
            )
        };

        // Use try_init to avoid panic if a global subscriber already exists
        if subscriber.try_init().is_err() {
            tracing::debug!(
                "Global tracing subscriber already initialized - continuing with existing subscriber"
            );
        }

        tracing::info!(
            environment = %environment,
            "🔧 STRUCTURED LOGGING: Initialized"
        );
    });
}

/// Get current environment from environment variables
fn get_environment() -> String {
    std::env::var("REGISTRAR_ENV")
        .or_else(|_| std::env::var("NODE_ENV"))
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> String {
    match environment {
        "test" => "debug".to_string(),
        "development" => "debug".to_string(),
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}
