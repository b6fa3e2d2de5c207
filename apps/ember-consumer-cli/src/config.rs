//! Consumer CLI configuration loading.
//!
//! TOML is the sole config source; CLI flags override individual fields.
//! Default config path: `/etc/ember-engine/consumer.toml`.

use std::path::Path;

use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub connect_timeout_secs: u64,
    /// Root paths to expand eagerly once connected, in addition to whatever
    /// the initial root `GetDirectory` reports.
    pub expand_paths: Vec<String>,
    pub snapshot_output_path: String,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    host: Option<String>,
    port: Option<u16>,
    connect_timeout_secs: Option<u64>,
    expand_paths: Option<Vec<String>>,
    snapshot_output_path: Option<String>,
}

pub fn load_config_from_path(path: &Path) -> Result<Config, ConfigError> {
    let toml_str = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Io(format!("reading config file '{}': {e}", path.display())))?;
    load_config_from_str(&toml_str)
}

pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    let raw: RawConfig = toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))?;

    let host = raw.host.ok_or_else(|| ConfigError::MissingField("host".to_owned()))?;
    let port = raw.port.unwrap_or(ember_consumer_default_port());
    if raw.snapshot_output_path.as_deref().is_some_and(str::is_empty) {
        return Err(ConfigError::InvalidValue("snapshot_output_path must not be empty".to_owned()));
    }

    Ok(Config {
        host,
        port,
        connect_timeout_secs: raw.connect_timeout_secs.unwrap_or(5),
        expand_paths: raw.expand_paths.unwrap_or_default(),
        snapshot_output_path: raw.snapshot_output_path.unwrap_or_else(|| "snapshot.json".to_owned()),
    })
}

fn ember_consumer_default_port() -> u16 {
    9092
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
