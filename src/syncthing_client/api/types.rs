use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::syncthing_client::models::FolderType;

/// Entry of `rest/config/devices`.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct DeviceConfig {
    #[serde(rename = "deviceID", default)]
    pub device_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub paused: Option<bool>,
    #[serde(default)]
    pub max_send_kbps: Option<u64>,
    #[serde(default)]
    pub max_recv_kbps: Option<u64>,
    #[serde(default)]
    pub introducer: Option<bool>,
    #[serde(default)]
    pub introduced_by: Option<String>,
    #[serde(default)]
    pub auto_accept_folders: Option<bool>,
    #[serde(default)]
    pub untrusted: Option<bool>,
    #[serde(default)]
    pub addresses: Vec<String>,
}

/// Value of `rest/stats/device`, keyed by device ID.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStats {
    #[serde(default)]
    pub last_seen: Option<String>,
    #[serde(default)]
    pub last_connection_duration_s: Option<f64>,
}

/// Entry of `rest/config/folders`.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct FolderConfig {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub paused: Option<bool>,
    #[serde(rename = "type", default)]
    pub folder_type: Option<FolderType>,
    #[serde(default)]
    pub devices: Vec<FolderDevice>,
    #[serde(default)]
    pub rescan_interval_s: Option<u32>,
    #[serde(default)]
    pub fs_watcher_enabled: Option<bool>,
    #[serde(default)]
    pub versioning: Option<VersioningConfig>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct FolderDevice {
    #[serde(rename = "deviceID")]
    pub device_id: String,
    #[serde(default)]
    pub introduced_by: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VersioningConfig {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub params: HashMap<String, String>,
    #[serde(default)]
    pub cleanup_interval_s: Option<u64>,
}

/// Value of `rest/stats/folder`, keyed by folder ID.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct FolderStats {
    #[serde(default)]
    pub last_scan: Option<String>,
    #[serde(default)]
    pub last_file: Option<LastFile>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LastFile {
    #[serde(default)]
    pub at: Option<String>,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub deleted: bool,
}

/// Response of `rest/db/status?folder=<id>`.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct DbStatus {
    #[serde(default)]
    pub global_bytes: Option<u64>,
    #[serde(default)]
    pub global_total_items: Option<u64>,
    #[serde(default)]
    pub local_bytes: Option<u64>,
    #[serde(default)]
    pub local_total_items: Option<u64>,
    #[serde(default)]
    pub need_bytes: Option<u64>,
    #[serde(default)]
    pub need_total_items: Option<u64>,
    #[serde(default)]
    pub need_deletes: Option<u64>,
    #[serde(default)]
    pub in_sync_bytes: Option<u64>,
    #[serde(default)]
    pub receive_only_changed_bytes: Option<u64>,
    #[serde(default)]
    pub receive_only_total_items: Option<u64>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub state_changed: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub errors: Option<u64>,
    #[serde(default)]
    pub pull_errors: Option<u64>,
    #[serde(default)]
    pub watch_error: Option<String>,
}

/// Response of `rest/db/completion?device=<id>&folder=<id>`.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FolderCompletion {
    #[serde(default)]
    pub completion: f64,
    #[serde(default)]
    pub global_bytes: u64,
    #[serde(default)]
    pub need_bytes: u64,
    #[serde(default)]
    pub global_items: u64,
    #[serde(default)]
    pub need_items: u64,
    #[serde(default)]
    pub need_deletes: u64,
}

/// Response of `rest/system/version`.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub long_version: Option<String>,
    #[serde(default)]
    pub os: Option<String>,
    #[serde(default)]
    pub arch: Option<String>,
}
