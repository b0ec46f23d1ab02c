//! Environment variable overlay.
//!
//! `ASTRID_*` variables apply last, after every config file layer, and only
//! cover the handful of settings operators most often need to flip without
//! editing a file: the data root and the logging filter.

use std::env;

/// Build a TOML overlay from recognized `ASTRID_*` environment variables.
/// Unset variables are simply absent from the returned table.
#[must_use]
pub fn env_overlay() -> toml::Value {
    let mut table = toml::value::Table::new();

    if let Ok(data_root) = env::var("ASTRID_DATA_ROOT") {
        table.insert("data_root".to_string(), toml::Value::String(data_root));
    }

    let mut telemetry = toml::value::Table::new();
    if let Ok(filter) = env::var("ASTRID_LOG_FILTER") {
        telemetry.insert("filter".to_string(), toml::Value::String(filter));
    }
    if let Ok(json) = env::var("ASTRID_LOG_JSON") {
        telemetry.insert("json".to_string(), toml::Value::Boolean(json == "1" || json.eq_ignore_ascii_case("true")));
    }
    if !telemetry.is_empty() {
        table.insert("telemetry".to_string(), toml::Value::Table(telemetry));
    }

    if let Ok(timezone) = env::var("ASTRID_TIMEZONE") {
        let mut scheduler = toml::value::Table::new();
        scheduler.insert("timezone_override".to_string(), toml::Value::String(timezone));
        table.insert("scheduler".to_string(), toml::Value::Table(scheduler));
    }

    toml::Value::Table(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_is_always_a_table() {
        let overlay = env_overlay();
        assert!(overlay.as_table().is_some());
    }
}
