use std::fmt;

use serde::Serialize;

use crate::types::MonitorError;

/// Coarse lifecycle state of the daemon as reported by the watchdog.
///
/// `Unknown` is what callers hold before the first successful poll and after
/// any failed or ambiguous one. It means "ask again", never success.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WatchdogState {
    Stopped,
    Wait,
    Running,
    Failed,
    #[default]
    Unknown,
}

impl WatchdogState {
    /// Parse the watchdog's plain-text state body.
    pub fn parse(body: &str) -> Result<Self, MonitorError> {
        match body.trim() {
            "stopped" => Ok(Self::Stopped),
            "wait" => Ok(Self::Wait),
            "running" => Ok(Self::Running),
            "failed" => Ok(Self::Failed),
            other => Err(MonitorError::UnexpectedState(other.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Wait => "wait",
            Self::Running => "running",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }

    /// Running and Wait are the states a toggle turns into a stop.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Running | Self::Wait)
    }
}

impl fmt::Display for WatchdogState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
