//! Logging setup.

use clap::ValueEnum;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::layer::SubscriberExt;

use crate::orchestrator::RunError;

/// Log output format.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One line per event (default)
    #[default]
    Compact,
    /// Multi-line, human oriented
    Pretty,
    /// Newline-delimited JSON
    Json,
}

/// Default log level when `RUST_LOG` is unset.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

fn default_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from(level).into())
        .parse_lossy("")
}

/// Builds the filter: `RUST_LOG` when set and valid, `level` otherwise.
pub fn env_filter(level: LogLevel, directive: Option<&str>) -> EnvFilter {
    match directive {
        Some(directive) => match EnvFilter::try_new(directive) {
            Ok(filter) => filter,
            Err(err) => {
                eprintln!("invalid log filter {directive:?}: {err}");
                eprintln!("falling back to default logging");
                default_filter(level)
            }
        },
        None => default_filter(level),
    }
}

/// Installs the global subscriber. Events go to stderr so stdout stays
/// machine-readable.
pub fn setup_logging(level: LogLevel, format: LogFormat) -> Result<(), RunError> {
    let directive = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = env_filter(level, directive.as_deref());
    let use_color = std::io::IsTerminal::is_terminal(&std::io::stderr());

    let compact = tracing_subscriber::fmt::Layer::new()
        .compact()
        .without_time()
        .with_ansi(use_color)
        .with_writer(std::io::stderr);
    let pretty = tracing_subscriber::fmt::Layer::new()
        .pretty()
        .without_time()
        .with_ansi(use_color)
        .with_writer(std::io::stderr);
    let json = tracing_subscriber::fmt::Layer::new()
        .json()
        .without_time()
        .with_writer(std::io::stderr);

    let subscriber = tracing_subscriber::registry()
        .with((format == LogFormat::Compact).then_some(compact))
        .with((format == LogFormat::Pretty).then_some(pretty))
        .with((format == LogFormat::Json).then_some(json))
        .with(filter);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|err| RunError::Logging(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_uses_level() {
        assert_eq!(env_filter(LogLevel::Warn, None).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(
            env_filter(LogLevel::Trace, None).max_level_hint(),
            Some(LevelFilter::TRACE)
        );
    }

    #[test]
    fn test_rust_log_overrides_level() {
        let filter = env_filter(LogLevel::Warn, Some("debug"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_invalid_directive_falls_back() {
        let filter = env_filter(LogLevel::Info, Some("template_parser=notalevel"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }
}
