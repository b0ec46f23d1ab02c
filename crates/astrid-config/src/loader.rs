//! Config file discovery and layered loading.
//!
//! Precedence, highest to lowest: environment variables, the explicit
//! override file (if one is given), embedded defaults.

use std::path::Path;

use tracing::info;

use crate::env::env_overlay;
use crate::error::{ConfigError, ConfigResult};
use crate::merge::deep_merge;
use crate::types::HostConfig;
use crate::validate::validate;

const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Load the host configuration, merging the embedded defaults, an optional
/// file at `override_path`, and recognized `ASTRID_*` environment
/// variables, then validate the result.
///
/// # Errors
///
/// Returns a [`ConfigError`] if `override_path` is set but unreadable or
/// malformed, or if the merged configuration fails validation.
pub fn load(override_path: Option<&Path>) -> ConfigResult<HostConfig> {
    let mut merged: toml::Value = toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
        path: "<embedded defaults>".to_string(),
        source: e,
    })?;

    if let Some(path) = override_path {
        let overlay = load_file_as_value(path)?;
        deep_merge(&mut merged, &overlay);
        info!(path = %path.display(), "loaded config overlay");
    }

    deep_merge(&mut merged, &env_overlay());

    let config: HostConfig = merged.try_into().map_err(|e: toml::de::Error| ConfigError::ParseError {
        path: "<merged configuration>".to_string(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Load configuration from exactly one file, ignoring defaults and
/// environment overlays. Used by `astrid-cli doctor` to sanity-check a
/// config file in isolation.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
/// validation.
pub fn load_file(path: &Path) -> ConfigResult<HostConfig> {
    let value = load_file_as_value(path)?;
    let config: HostConfig = value.try_into().map_err(|e: toml::de::Error| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

fn load_file_as_value(path: &Path) -> ConfigResult<toml::Value> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_embedded_defaults_when_no_override_given() {
        let config = load(None).unwrap();
        assert_eq!(config.worker.idle_timeout_seconds, 600);
        assert_eq!(config.workspace.default_trigger, "!agent");
    }

    #[test]
    fn file_overlay_replaces_only_the_keys_it_sets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[worker]\nidle_timeout_seconds = 30\n").unwrap();

        let config = load(Some(&path)).unwrap();
        assert_eq!(config.worker.idle_timeout_seconds, 30);
        // Untouched sibling field keeps its default.
        assert_eq!(config.worker.graceful_stop_seconds, 10);
    }

    #[test]
    fn missing_override_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(load(Some(&missing)).is_err());
    }
}
