use serde::{Deserialize, Serialize};

use crate::types::MonitorError;

pub const UNKNOWN_START_ERROR: &str = "Unknown error";
pub const UNKNOWN_START_DETAILS: &str = "There was an unknown error starting Syncthing.";

/// Body of `check/start`.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct StartCheck {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_details: Option<String>,
}

impl StartCheck {
    pub fn into_result(self) -> Result<(), MonitorError> {
        if self.success {
            return Ok(());
        }
        Err(MonitorError::StartFailed {
            error: self.error.unwrap_or_else(|| UNKNOWN_START_ERROR.to_string()),
            details: Some(
                self.error_details
                    .unwrap_or_else(|| UNKNOWN_START_DETAILS.to_string()),
            ),
        })
    }
}

pub(crate) const NOTHING_FOUND: &str = "Nothing was detected";

#[derive(Debug, Deserialize, Default)]
pub(crate) struct ScannedPort {
    #[serde(default)]
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct ScannedApiKey {
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct ScannedBasicAuth {
    #[serde(default)]
    pub basic_auth_user: Option<String>,
}

/// Either the watchdog's structured `{error}` payload or a scan result.
/// `Failure` must stay first: the scan payloads accept any object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum CheckResponse<T> {
    Failure { error: String },
    Scanned(T),
}

impl<T> CheckResponse<T> {
    pub(crate) fn detect<V>(self, pick: impl FnOnce(T) -> Option<V>) -> Detection<V> {
        match self {
            CheckResponse::Failure { error } => Detection::Failed { error },
            CheckResponse::Scanned(scan) => match pick(scan) {
                Some(value) => Detection::Found(value),
                None => Detection::NeedsManualInput {
                    reason: NOTHING_FOUND.to_string(),
                },
            },
        }
    }
}

/// Outcome of a pre-flight detection probe that the watchdog answered.
#[derive(Debug, Clone, PartialEq)]
pub enum Detection<T> {
    Found(T),
    /// The probe ran but found nothing; ask the user instead.
    NeedsManualInput { reason: String },
    /// The watchdog could not run the probe and said why.
    Failed { error: String },
}

impl<T> Detection<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Detection::Found(value) => Some(value),
            Detection::NeedsManualInput { .. } | Detection::Failed { .. } => None,
        }
    }

    /// Collapse to a `Result` for callers that can't prompt the user.
    pub fn required(self) -> Result<T, MonitorError> {
        match self {
            Detection::Found(value) => Ok(value),
            Detection::NeedsManualInput { reason } | Detection::Failed { error: reason } => {
                Err(MonitorError::DetectionFailed { reason })
            }
        }
    }
}
