//! Tracing subscriber setup.
//!
//! The library crates only emit `tracing` events. Binaries call
//! [`init_tracing`] once at startup to print them.
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Filter directives, e.g. `sigil_http_client=debug`
//! - `SIGIL_LOG_FORMAT=json|compact|pretty` - Output format (default `json`)

use std::env;
use std::str::FromStr;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

/// Environment variable selecting the output format.
pub const LOG_FORMAT_VAR: &str = "SIGIL_LOG_FORMAT";

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event, fields flattened.
    #[default]
    Json,
    /// Single-line human-readable output.
    Compact,
    /// Multi-line human-readable output.
    Pretty,
}

impl LogFormat {
    /// Read the format from `SIGIL_LOG_FORMAT`, falling back to JSON.
    pub fn from_env() -> Self {
        env::var(LOG_FORMAT_VAR)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Initialize tracing with `RUST_LOG`, defaulting to `info`.
///
/// Only the first call installs a subscriber; later calls do nothing.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    install(filter, LogFormat::from_env());
}

/// Initialize tracing with a custom log level, ignoring `RUST_LOG`.
pub fn init_tracing_with_level(level: &str) {
    install(EnvFilter::new(level), LogFormat::from_env());
}

fn install(filter: EnvFilter, format: LogFormat) {
    let _ = tracing_subscriber::registry()
        .with(fmt_layer(format))
        .with(filter)
        .try_init();
}

fn fmt_layer(format: LogFormat) -> Box<dyn Layer<Registry> + Send + Sync> {
    match format {
        LogFormat::Json => fmt::layer().json().flatten_event(true).boxed(),
        LogFormat::Compact => fmt::layer().compact().boxed(),
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_format() {
        assert_eq!("json".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!(" Compact ".parse::<LogFormat>(), Ok(LogFormat::Compact));
        assert_eq!("PRETTY".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_default_is_json() {
        assert_eq!(LogFormat::default(), LogFormat::Json);
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_tracing_with_level("warn");
        init_tracing_with_level("debug");
        tracing::info!("still running");
    }
}
