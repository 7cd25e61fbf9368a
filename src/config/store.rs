use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::fs;
use tracing::info;

use crate::types::MonitorError;

use super::{paths, Config};

/// Flat key/value settings owned by an external collaborator.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self) -> Result<Config, MonitorError>;

    async fn set(&self, key: &str, value: Value) -> Result<(), MonitorError>;
}

/// Settings persisted as a single JSON object on disk.
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The same `config.json` that `Config::load` reads.
    pub fn at_default_location() -> Result<Self, MonitorError> {
        Ok(Self::new(paths::get_config_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_object(&self) -> Result<Map<String, Value>, MonitorError> {
        if !self.path.exists() {
            return match serde_json::to_value(Config::default())? {
                Value::Object(map) => Ok(map),
                _ => Ok(Map::new()),
            };
        }
        let contents = fs::read_to_string(&self.path).await?;
        match serde_json::from_str::<Value>(&contents)? {
            Value::Object(map) => Ok(map),
            other => Err(MonitorError::Config(format!(
                "Settings file {} is not a JSON object: {other}",
                self.path.display()
            ))),
        }
    }
}

#[async_trait]
impl SettingsStore for JsonSettingsStore {
    async fn load(&self) -> Result<Config, MonitorError> {
        let object = self.read_object().await?;
        let mut config: Config = serde_json::from_value(Value::Object(object))?;
        config.apply_env_overrides();
        Ok(config)
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), MonitorError> {
        let mut object = self.read_object().await?;
        let known = match serde_json::to_value(Config::default())? {
            Value::Object(defaults) => defaults.contains_key(key) || key == "daemon_url",
            _ => false,
        };
        if !known {
            return Err(MonitorError::UnknownSetting(key.to_string()));
        }

        let value = coerce_setting(key, value)?;
        object.insert(key.to_string(), value);

        // Reject writes that would leave the file undeserializable.
        serde_json::from_value::<Config>(Value::Object(object.clone()))
            .map_err(|err| MonitorError::Config(format!("Invalid value for {key}: {err}")))?;

        fs::write(&self.path, serde_json::to_string_pretty(&object)?).await?;
        info!(setting = %key, "Updated settings");
        Ok(())
    }
}

/// Callers frequently hand over stringly-typed values; normalise them.
fn coerce_setting(key: &str, value: Value) -> Result<Value, MonitorError> {
    if key == "port" {
        if let Value::String(raw) = &value {
            let port: u16 = raw.trim().parse().map_err(|_| {
                MonitorError::Config(format!("Port must be a number, got {raw:?}"))
            })?;
            return Ok(Value::from(port));
        }
    }
    Ok(match value {
        Value::String(raw) if raw == "true" => Value::Bool(true),
        Value::String(raw) if raw == "false" => Value::Bool(false),
        other => other,
    })
}
