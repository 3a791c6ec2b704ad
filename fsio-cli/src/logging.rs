//! CLI logging setup
//!
//! `tracing-subscriber` registry with one level per component target.

use crate::error::{CliError, CliResult};
use fsio_config::{Component, LogConfig, LogLevel};
use std::fs::OpenOptions;
use std::io::{self, Write as _};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer};

/// Log output format
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Multi-line, with timestamps (for humans)
    Pretty,
    /// One line per event
    Compact,
    /// JSON lines (for tooling)
    Json,
}

pub fn to_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Trace => LevelFilter::TRACE,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Off => LevelFilter::OFF,
    }
}

/// Per-target filter built from the log configuration
pub fn targets(log_config: &LogConfig) -> Targets {
    Component::all().into_iter().fold(
        Targets::new().with_default(to_filter(log_config.global)),
        |targets, component| {
            targets.with_target(component.target(), to_filter(log_config.level_for(component)))
        },
    )
}

/// Install the global subscriber. Events go to stderr, and additionally to
/// `file` (appended) when given.
pub fn init_with_file(log_config: &LogConfig, format: LogFormat, file: Option<&Path>) -> CliResult<()> {
    let targets = targets(log_config);
    let stderr_layer = create_format_layer(format, io::stderr).with_filter(targets.clone());

    if let Some(path) = file {
        let handle = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| CliError::LogFile {
                path: path.to_path_buf(),
                source,
            })?;
        let handle = Arc::new(handle);
        let file_layer = fmt::layer()
            .with_ansi(false)
            .with_writer(move || FileWriter(Arc::clone(&handle)))
            .with_filter(targets);

        tracing_subscriber::registry()
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry().with(stderr_layer).init();
    }
    Ok(())
}

/// Shared append handle for the file layer
struct FileWriter(Arc<std::fs::File>);

impl io::Write for FileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (&*self.0).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        (&*self.0).flush()
    }
}

fn create_format_layer<W, F>(format: LogFormat, make_writer: F) -> impl Layer<tracing_subscriber::Registry>
where
    W: io::Write + Send + Sync + 'static,
    F: Fn() -> W + Send + Sync + 'static,
{
    match format {
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_target(true)
            .with_writer(make_writer)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(true)
            .without_time()
            .with_writer(make_writer)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_writer(make_writer)
            .boxed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn test_to_filter() {
        assert_eq!(to_filter(LogLevel::Trace), LevelFilter::TRACE);
        assert_eq!(to_filter(LogLevel::Error), LevelFilter::ERROR);
        assert_eq!(to_filter(LogLevel::Off), LevelFilter::OFF);
    }

    #[test]
    fn test_silent_disables_errors() {
        let config = LogConfig {
            global: LogLevel::parse("silent").unwrap(),
            ..LogConfig::default()
        };
        let targets = targets(&config);
        for target in ["fsio::facade", "fsio::backend", "other"] {
            assert!(!targets.would_enable(target, &Level::ERROR), "{}", target);
        }
    }

    #[test]
    fn test_targets_per_component() {
        let config = LogConfig {
            global: LogLevel::Warn,
            backend: Some(LogLevel::Trace),
            ..LogConfig::default()
        };
        let targets = targets(&config);

        assert!(targets.would_enable("fsio::backend", &Level::TRACE));
        assert!(!targets.would_enable("fsio::facade", &Level::DEBUG));
        assert!(targets.would_enable("fsio::facade", &Level::WARN));
        assert!(!targets.would_enable("other", &Level::INFO));
        assert_eq!(targets.default_level(), Some(LevelFilter::WARN));
    }
}
