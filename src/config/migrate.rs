//! Upgrade an existing YAML config file in place: keys added by newer
//! versions are filled with their defaults, unknown keys are left alone.

use super::{
    default_busy_timeout, default_device_label, default_settings_refresh, default_sweep_interval,
    default_utc_offset,
};
use crate::errors::{AppError, AppResult};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;

/// Keys every config file should carry, with their default values.
fn expected_keys() -> Vec<(&'static str, Value)> {
    vec![
        ("utc_offset", Value::String(default_utc_offset())),
        ("sweep_interval_secs", Value::from(default_sweep_interval())),
        ("settings_refresh_secs", Value::from(default_settings_refresh())),
        ("busy_timeout_ms", Value::from(default_busy_timeout())),
        ("device_label", Value::String(default_device_label())),
    ]
}

fn read_mapping(path: &Path) -> AppResult<Mapping> {
    let content = fs::read_to_string(path)?;
    let yaml: Value = serde_yaml::from_str(&content)
        .map_err(|e| AppError::Configuration(format!("{}: {}", path.display(), e)))?;

    match yaml {
        Value::Mapping(map) => Ok(map),
        Value::Null => Ok(Mapping::new()),
        _ => Err(AppError::Configuration(format!(
            "{}: expected a YAML mapping",
            path.display()
        ))),
    }
}

/// Keys absent from the config file at `path`.
pub fn missing_keys(path: &Path) -> AppResult<Vec<&'static str>> {
    let map = read_mapping(path)?;
    let mut missing = Vec::new();

    if !map.contains_key(Value::String("database".into())) {
        missing.push("database");
    }
    for (key, _) in expected_keys() {
        if !map.contains_key(Value::String(key.into())) {
            missing.push(key);
        }
    }
    Ok(missing)
}

/// Add every missing key with its default and rewrite the file.
/// Returns the keys that were added.
pub fn fill_missing_keys(path: &Path, database: &str) -> AppResult<Vec<&'static str>> {
    let mut map = read_mapping(path)?;
    let mut added = Vec::new();

    let db_key = Value::String("database".into());
    if !map.contains_key(&db_key) {
        map.insert(db_key, Value::String(database.to_string()));
        added.push("database");
    }

    for (key, default) in expected_keys() {
        let k = Value::String(key.into());
        if !map.contains_key(&k) {
            map.insert(k, default);
            added.push(key);
        }
    }

    if !added.is_empty() {
        let serialized =
            serde_yaml::to_string(&Value::Mapping(map)).map_err(|_| AppError::ConfigSave)?;
        fs::write(path, serialized)?;
    }

    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn temp_conf(name: &str, body: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("rattendance_conf_{}.yaml", name));
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn old_config_gets_new_keys() {
        let path = temp_conf("old", "database: /tmp/a.sqlite\nutc_offset: \"+01:00\"\n");

        let missing = missing_keys(&path).unwrap();
        assert!(missing.contains(&"sweep_interval_secs"));
        assert!(!missing.contains(&"utc_offset"));

        let added = fill_missing_keys(&path, "/ignored").unwrap();
        assert_eq!(added, missing);
        assert!(missing_keys(&path).unwrap().is_empty());

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.utc_offset, "+01:00");
        assert_eq!(cfg.database, "/tmp/a.sqlite");
        assert_eq!(cfg.busy_timeout_ms, 2000);

        let _ = fs::remove_file(&path);
    }
}
