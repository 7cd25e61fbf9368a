use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the Syncthing monitor.
///
/// Mirrors the flat settings object owned by the settings store; only the
/// fields the monitor actually consumes are modelled here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub basic_auth_user: String,

    /// Talk to the daemon directly instead of through the watchdog proxy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daemon_url: Option<String>,

    #[serde(default = "default_watchdog_url")]
    pub watchdog_url: String,

    #[serde(default = "default_true")]
    pub use_watchdog_proxy: bool,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_start_max_attempts")]
    pub start_max_attempts: u32,

    #[serde(default = "default_start_poll_interval_ms")]
    pub start_poll_interval_ms: u64,

    #[serde(default = "default_state_retry_delay_ms")]
    pub state_retry_delay_ms: u64,
}

/// Bounds for the start-up availability polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartPolicy {
    pub max_attempts: u32,
    pub poll_interval: Duration,
    /// Pause between a control request and the confirming state query.
    pub settle_delay: Duration,
}

impl Default for StartPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_start_max_attempts(),
            poll_interval: Duration::from_millis(default_start_poll_interval_ms()),
            settle_delay: Duration::from_millis(100),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            api_key: String::new(),
            basic_auth_user: String::new(),
            daemon_url: None,
            watchdog_url: default_watchdog_url(),
            use_watchdog_proxy: true,
            request_timeout_secs: default_request_timeout_secs(),
            start_max_attempts: default_start_max_attempts(),
            start_poll_interval_ms: default_start_poll_interval_ms(),
            state_retry_delay_ms: default_state_retry_delay_ms(),
        }
    }
}

impl Config {
    /// Base URL for the daemon's REST API.
    pub fn daemon_base_url(&self) -> String {
        if let Some(url) = self.daemon_url.as_deref() {
            let trimmed = url.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
        if self.use_watchdog_proxy {
            self.watchdog_url.clone()
        } else {
            format!("http://127.0.0.1:{}/", self.port)
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn state_retry_delay(&self) -> Duration {
        Duration::from_millis(self.state_retry_delay_ms)
    }

    pub fn start_policy(&self) -> StartPolicy {
        StartPolicy {
            max_attempts: self.start_max_attempts.max(1),
            poll_interval: Duration::from_millis(self.start_poll_interval_ms),
            ..StartPolicy::default()
        }
    }
}

fn default_port() -> u16 {
    8384
}

fn default_watchdog_url() -> String {
    "http://127.0.0.1:58384/".to_string()
}

fn default_true() -> bool {
    true
}

fn default_request_timeout_secs() -> u64 {
    8
}

fn default_start_max_attempts() -> u32 {
    30
}

fn default_start_poll_interval_ms() -> u64 {
    1000
}

fn default_state_retry_delay_ms() -> u64 {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.port, 8384);
        assert!(config.use_watchdog_proxy);
        assert_eq!(config.daemon_base_url(), "http://127.0.0.1:58384/");
        assert_eq!(config.start_policy().max_attempts, 30);
    }

    #[test]
    fn direct_mode_uses_configured_port() {
        let config: Config =
            serde_json::from_str(r#"{"port": 8080, "use_watchdog_proxy": false}"#).unwrap();
        assert_eq!(config.daemon_base_url(), "http://127.0.0.1:8080/");
    }

    #[test]
    fn explicit_daemon_url_wins() {
        let config = Config {
            daemon_url: Some(" https://10.0.0.2:8384 ".into()),
            ..Config::default()
        };
        assert_eq!(config.daemon_base_url(), "https://10.0.0.2:8384");
    }
}
