//! Provider CLI configuration loading.
//!
//! TOML is the sole config source; CLI flags override individual fields.
//! Default config path: `/etc/ember-engine/provider.toml`.

use std::path::Path;

use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub port: u16,
    pub snapshot_path: String,
    /// Disconnect a session that sends nothing (no request, no keep-alive)
    /// within this many seconds. `None` never times out.
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    bind_address: Option<String>,
    port: Option<u16>,
    snapshot_path: Option<String>,
    idle_timeout_secs: Option<u64>,
}

pub fn load_config_from_path(path: &Path) -> Result<Config, ConfigError> {
    let toml_str = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Io(format!("reading config file '{}': {e}", path.display())))?;
    load_config_from_str(&toml_str)
}

pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    let raw: RawConfig = toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))?;

    let snapshot_path = raw.snapshot_path.ok_or_else(|| ConfigError::MissingField("snapshot_path".to_owned()))?;
    if snapshot_path.is_empty() {
        return Err(ConfigError::InvalidValue("snapshot_path must not be empty".to_owned()));
    }

    Ok(Config {
        bind_address: raw.bind_address.unwrap_or_else(|| "0.0.0.0".to_owned()),
        port: raw.port.unwrap_or(ember_provider::DEFAULT_PORT),
        snapshot_path,
        idle_timeout_secs: raw.idle_timeout_secs,
    })
}

#[derive(Debug)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    MissingField(String),
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(s) => write!(f, "I/O error: {s}"),
            ConfigError::Parse(s) => write!(f, "parse error: {s}"),
            ConfigError::MissingField(s) => write!(f, "missing required field: {s}"),
            ConfigError::InvalidValue(s) => write!(f, "invalid config value: {s}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_applies_defaults() {
        let cfg = load_config_from_str("snapshot_path = \"snapshot.json\"\n").unwrap();
        assert_eq!(cfg.bind_address, "0.0.0.0");
        assert_eq!(cfg.port, ember_provider::DEFAULT_PORT);
        assert_eq!(cfg.idle_timeout_secs, None);
    }

    #[test]
    fn missing_snapshot_path_is_rejected() {
        let err = load_config_from_str("port = 9099\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(field) if field == "snapshot_path"));
    }
}
