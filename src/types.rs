use thiserror::Error;

/// Every failure the monitor can surface to a caller.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// The daemon rejected our credentials (401/403).
    #[error("{path} rejected the API key (HTTP {status})")]
    Authentication {
        path: String,
        status: u16,
        body: String,
    },

    #[error("{path} returned HTTP {status}: {body}")]
    Http {
        path: String,
        status: u16,
        body: String,
    },

    /// The start-up probe never reported the daemon as reachable.
    #[error("Syncthing did not come up after {attempts} attempts")]
    Timeout { attempts: u32 },

    #[error("Detection failed: {reason}")]
    DetectionFailed { reason: String },

    /// Connection-level failure (refused, reset, timed out).
    #[error("Unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    #[error("HTTP transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Failed to decode response from {path}: {message}")]
    Decode { path: String, message: String },

    #[error("Watchdog reported an unknown state: {0}")]
    UnexpectedState(String),

    /// The supervisor tried to start the daemon and reported why it could not.
    #[error("{error}")]
    StartFailed {
        error: String,
        details: Option<String>,
    },

    #[error("Another start/stop transition is already in progress")]
    TransitionInFlight,

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No API key configured")]
    MissingApiKey,

    #[error("Unknown setting: {0}")]
    UnknownSetting(String),
}

impl MonitorError {
    /// Classify a reqwest failure for a request against `path`.
    pub(crate) fn from_reqwest(path: &str, err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            MonitorError::Unreachable(err)
        } else if err.is_decode() {
            MonitorError::Decode {
                path: path.to_string(),
                message: err.to_string(),
            }
        } else {
            MonitorError::Transport(err)
        }
    }

    /// Map a non-success response into `Authentication` or `Http`.
    pub(crate) fn from_status(path: &str, status: u16, body: String) -> Self {
        if status == 401 || status == 403 {
            MonitorError::Authentication {
                path: path.to_string(),
                status,
                body,
            }
        } else {
            MonitorError::Http {
                path: path.to_string(),
                status,
                body,
            }
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { status, .. } | Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
