//! Subscriber setup: level/directive filtering, output format, and target.

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use crate::error::{TelemetryError, TelemetryResult};

/// Output shape for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Multi-line, human-readable.
    #[default]
    Pretty,
    /// Single-line, human-readable.
    Compact,
    /// Single-line JSON, for log aggregation.
    Json,
}

/// Where log lines are written.
#[derive(Debug, Clone, Default)]
pub enum LogTarget {
    /// Standard error (the default — keeps stdout clean for worker IPC).
    #[default]
    Stderr,
    /// Standard output.
    Stdout,
    /// A rolling daily file under the given directory.
    File(PathBuf),
}

/// Logging configuration: base level, extra per-target directives, output
/// format, and output target.
#[derive(Debug, Clone)]
pub struct LogConfig {
    level: String,
    directives: Vec<String>,
    format: LogFormat,
    target: LogTarget,
}

impl LogConfig {
    /// Start a config at the given base level (`"info"`, `"debug"`, …).
    #[must_use]
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            directives: Vec::new(),
            format: LogFormat::default(),
            target: LogTarget::default(),
        }
    }

    /// Set the output format.
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Append a per-module filter directive (e.g. `"astrid_security=trace"`).
    #[must_use]
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    /// Set the output target.
    #[must_use]
    pub fn with_target(mut self, target: LogTarget) -> Self {
        self.target = target;
        self
    }

    fn filter(&self) -> TelemetryResult<EnvFilter> {
        let mut spec = self.level.clone();
        for directive in &self.directives {
            spec.push(',');
            spec.push_str(directive);
        }
        EnvFilter::try_new(spec).map_err(|e| TelemetryError::ConfigError(e.to_string()))
    }
}

/// Initialize the global `tracing` subscriber from `config`.
///
/// Installs a file appender guard (when `config.target` is
/// [`LogTarget::File`]) via a deliberate leak: the guard must outlive the
/// subscriber, and the subscriber is itself process-global, so there is no
/// earlier point at which it could be dropped safely.
///
/// # Errors
///
/// Returns [`TelemetryError::ConfigError`] if the filter directives don't
/// parse, or [`TelemetryError::InitError`] if a subscriber is already
/// installed.
pub fn setup_logging(config: &LogConfig) -> TelemetryResult<()> {
    let filter = config.filter()?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let result = match (&config.target, config.format) {
        (LogTarget::Stderr, LogFormat::Json) => builder.json().with_writer(std::io::stderr).try_init(),
        (LogTarget::Stderr, LogFormat::Compact) => builder.compact().with_writer(std::io::stderr).try_init(),
        (LogTarget::Stderr, LogFormat::Pretty) => builder.pretty().with_writer(std::io::stderr).try_init(),
        (LogTarget::Stdout, LogFormat::Json) => builder.json().with_writer(std::io::stdout).try_init(),
        (LogTarget::Stdout, LogFormat::Compact) => builder.compact().with_writer(std::io::stdout).try_init(),
        (LogTarget::Stdout, LogFormat::Pretty) => builder.pretty().with_writer(std::io::stdout).try_init(),
        (LogTarget::File(dir), format) => {
            let appender = tracing_appender::rolling::daily(dir, "astrid.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            // The non-blocking writer's flush thread depends on this guard;
            // leak it deliberately since the subscriber it backs is global.
            Box::leak(Box::new(guard));
            match format {
                LogFormat::Json => builder.json().with_writer(writer).try_init(),
                LogFormat::Compact => builder.compact().with_writer(writer).try_init(),
                LogFormat::Pretty => builder.pretty().with_writer(writer).try_init(),
            }
        },
    };

    result.map_err(|e| TelemetryError::InitError(e.to_string()))
}

/// Convenience: `setup_logging` with level `"info"` and no extra
/// directives, logging pretty-printed to stderr.
///
/// # Errors
///
/// See [`setup_logging`].
pub fn setup_default_logging() -> TelemetryResult<()> {
    setup_logging(&LogConfig::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_combines_level_and_directives() {
        let config = LogConfig::new("info").with_directive("astrid_security=trace");
        let filter = config.filter().unwrap();
        assert!(filter.to_string().contains("astrid_security=trace"));
    }

    #[test]
    fn rejects_malformed_directive() {
        let config = LogConfig::new("info").with_directive("not a valid directive===");
        assert!(config.filter().is_err());
    }
}
