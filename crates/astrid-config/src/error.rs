//! Configuration error types.

use thiserror::Error;

/// Errors raised while discovering, parsing, or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file could not be read.
    #[error("could not read config file {path}: {source}")]
    Read {
        /// The offending path.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A config file failed to parse as TOML.
    #[error("could not parse config file {path}: {source}")]
    ParseError {
        /// The offending path.
        path: String,
        /// The underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// The merged configuration failed a validation rule.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// The home directory could not be determined.
    #[error("could not determine home directory")]
    NoHomeDirectory,
}

/// Result type for `astrid-config` operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
