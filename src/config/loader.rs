use std::env;
use std::path::Path;

use serde_json::Value;
use tokio::fs;
use tracing::{info, warn};

use crate::types::MonitorError;

use super::{paths, Config};

impl Config {
    /// Load configuration from config.json in the app directory
    /// Falls back to defaults if the file doesn't exist or can't be parsed
    pub async fn load() -> Self {
        let mut config = match Self::try_load().await {
            Ok(config) => config,
            Err(err) => {
                warn!(error = ?err, "Failed to load config.json, using defaults");
                Self::default()
            }
        };
        config.apply_env_overrides();
        info!(
            port = config.port,
            watchdog = %config.watchdog_url,
            daemon = %config.daemon_base_url(),
            "Loaded configuration"
        );
        config
    }

    async fn try_load() -> Result<Self, MonitorError> {
        let config_path = paths::get_config_path()?;

        if !config_path.exists() {
            warn!(path = %config_path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        Self::try_load_from(&config_path).await
    }

    /// Strictly load `path`; any read or parse failure is an error.
    pub async fn try_load_from(path: &Path) -> Result<Self, MonitorError> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|err| MonitorError::Config(format!("Failed to read config file: {err}")))?;

        let value: Value = serde_json::from_str(&contents)
            .map_err(|err| MonitorError::Config(format!("Failed to parse config.json: {err}")))?;

        serde_json::from_value(value).map_err(|err| {
            MonitorError::Config(format!("Failed to deserialize config.json: {err}"))
        })
    }

    /// `SYNCTHING_API_KEY` and `SYNCTHING_API_URL` take precedence over the file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("SYNCTHING_API_KEY") {
            if !value.trim().is_empty() {
                self.api_key = value.trim().to_string();
            }
        }
        if let Ok(value) = env::var("SYNCTHING_API_URL") {
            if !value.trim().is_empty() {
                self.daemon_url = Some(value.trim().to_string());
            }
        }
    }

    /// The API key, or `MissingApiKey` when none is configured.
    pub fn require_api_key(&self) -> Result<&str, MonitorError> {
        let key = self.api_key.trim();
        if key.is_empty() {
            Err(MonitorError::MissingApiKey)
        } else {
            Ok(key)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn loads_partial_file_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"port": 8080, "api_key": "abc"}}"#).unwrap();

        let config = Config::try_load_from(file.path()).await.unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.require_api_key().unwrap(), "abc");
        assert_eq!(config.request_timeout_secs, 8);
    }

    #[tokio::test]
    async fn malformed_file_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = Config::try_load_from(file.path()).await.unwrap_err();
        assert!(matches!(err, MonitorError::Config(_)));
    }

    #[test]
    fn blank_api_key_is_missing() {
        let config = Config {
            api_key: "   ".into(),
            ..Config::default()
        };
        assert!(matches!(
            config.require_api_key(),
            Err(MonitorError::MissingApiKey)
        ));
    }
}
