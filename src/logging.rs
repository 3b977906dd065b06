//! Subscriber setup for the `signal-source` binary.
//!
//! The library only emits `tracing` events; installing a subscriber is left to
//! the application. `RUST_LOG` takes precedence over the configured level.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    /// Trace level (includes every empty device read)
    Trace,
    /// Debug level
    Debug,
    /// Info level (default)
    #[default]
    Info,
    /// Warning level
    Warn,
    /// Error level
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Multi-line, human-readable
    Pretty,
    /// One line per event
    #[default]
    Compact,
}

/// Install the global subscriber, writing to stderr.
///
/// Subsequent calls are ignored.
pub fn init_logging(level: LogLevel, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level}")));

    let result = match format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .try_init(),
    };

    if result.is_err() {
        tracing::debug!("logging already initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_display_matches_filter_syntax() {
        assert_eq!(LogLevel::default().to_string(), "info");
        assert_eq!(LogLevel::Trace.to_string(), "trace");
        assert!(EnvFilter::try_new(LogLevel::Warn.to_string()).is_ok());
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging(LogLevel::Error, LogFormat::Compact);
        init_logging(LogLevel::Debug, LogFormat::Pretty);
    }
}
