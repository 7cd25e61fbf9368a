use serde::Serialize;
use serde_json::Value;

use crate::syncthing_client::api::VersionInfo;

/// Aggregated system status information from Syncthing.
#[derive(Debug, Serialize, Default, Clone)]
pub struct SyncthingOverview {
    pub my_id: Option<String>,
    pub version: Option<String>,
    pub os: Option<String>,
    pub arch: Option<String>,
    pub started_at: Option<String>,
    pub uptime_seconds: Option<f64>,
    pub goroutine_count: Option<u64>,
    pub alloc_bytes: Option<u64>,
}

impl SyncthingOverview {
    /// `status` is the raw `rest/system/status` body; it changes shape between
    /// daemon releases, so only the fields we know are picked out.
    pub fn from_parts(status: &Value, version: &VersionInfo) -> Self {
        Self {
            my_id: status
                .get("myID")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            version: version.version.clone(),
            os: version.os.clone(),
            arch: version.arch.clone(),
            started_at: status
                .get("startTime")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            uptime_seconds: status.get("uptime").and_then(|v| v.as_f64()),
            goroutine_count: status.get("goroutines").and_then(|v| v.as_u64()),
            alloc_bytes: status.get("alloc").and_then(|v| v.as_u64()),
        }
    }
}
