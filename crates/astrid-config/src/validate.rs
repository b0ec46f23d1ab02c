//! Configuration validation rules.

use crate::error::{ConfigError, ConfigResult};
use crate::types::HostConfig;

/// Reject configurations that would put the host in an inconsistent or
/// unsafe state.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] with a description of the first
/// violated rule.
pub fn validate(config: &HostConfig) -> ConfigResult<()> {
    if config.worker.idle_timeout_seconds == 0 {
        return Err(ConfigError::Invalid(
            "worker.idle_timeout_seconds must be greater than zero".to_string(),
        ));
    }
    if config.scheduler.tick_seconds == 0 {
        return Err(ConfigError::Invalid("scheduler.tick_seconds must be greater than zero".to_string()));
    }
    if config.workspace.default_trigger.is_empty() {
        return Err(ConfigError::Invalid("workspace.default_trigger must not be empty".to_string()));
    }
    if config.data_root.as_os_str().is_empty() {
        return Err(ConfigError::Invalid("data_root must not be empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_idle_timeout() {
        let mut config = HostConfig::default();
        config.worker.idle_timeout_seconds = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn accepts_defaults() {
        assert!(validate(&HostConfig::default()).is_ok());
    }
}
