//! Structured logging setup.
//!
//! The library only emits `tracing` events; applications call
//! [`init_logging`] once to install a subscriber. `RUST_LOG` overrides the
//! configured level (e.g. `"info,solwallet_sdk=debug"`).

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines for terminals
    #[default]
    Human,
    /// Newline-delimited JSON
    Json,
}

/// Install the global subscriber.
///
/// Returns `false` when a subscriber was already installed, e.g. by the
/// host application or a previous call.
pub fn init_logging(format: LogFormat, level: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Human => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .try_init()
            .is_ok(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true))
            .try_init()
            .is_ok(),
    }
}
