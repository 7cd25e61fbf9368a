use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::syncthing_client::api::{DbStatus, FolderConfig, FolderStats, LastFile, VersioningConfig};
use crate::syncthing_client::helpers::{non_empty, parse_timestamp};

/// Rescan interval Syncthing applies when a folder doesn't specify one.
const DEFAULT_RESCAN_INTERVAL_S: u32 = 3600;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum FolderType {
    #[default]
    #[serde(rename = "sendreceive", alias = "readwrite")]
    SendReceive,
    #[serde(rename = "sendonly", alias = "readonly")]
    SendOnly,
    #[serde(rename = "receiveonly")]
    ReceiveOnly,
    #[serde(rename = "receiveencrypted")]
    ReceiveEncrypted,
}

/// Represents the current state of a folder.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FolderStatus {
    Paused,
    ScanWaiting,
    Scanning,
    SyncWaiting,
    SyncPreparing,
    Syncing,
    CleanWaiting,
    Cleaning,
    /// The daemon itself reports the folder in its error state.
    Error,
    /// Error counters are non-zero while the daemon state looks healthy.
    FailedItems,
    Unshared,
    OutOfSync,
    LocalAdditions,
    LocalUnencrypted,
    Idle,
    Unknown,
}

impl FolderStatus {
    pub fn label(self) -> &'static str {
        match self {
            FolderStatus::Paused => "Paused",
            FolderStatus::ScanWaiting => "Waiting to Scan",
            FolderStatus::Scanning => "Scanning",
            FolderStatus::SyncWaiting => "Waiting to Sync",
            FolderStatus::SyncPreparing => "Preparing to Sync",
            FolderStatus::Syncing => "Syncing",
            FolderStatus::CleanWaiting => "Waiting to Clean",
            FolderStatus::Cleaning => "Cleaning Versions",
            FolderStatus::Error => "Stopped",
            FolderStatus::FailedItems => "Failed Items",
            FolderStatus::Unshared => "Unshared",
            FolderStatus::OutOfSync => "Out of Sync",
            FolderStatus::LocalAdditions => "Local Additions",
            FolderStatus::LocalUnencrypted => "Unexpected Items",
            FolderStatus::Idle => "Up to Date",
            FolderStatus::Unknown => "Unknown",
        }
    }
}

/// Health of the folder's filesystem watcher.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FolderWatcherState {
    Disabled,
    Enabled,
    Failing,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SharedDevice {
    pub device_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub introduced_by: Option<String>,
}

/// Byte and item counters from the folder's db status; missing values are 0.
#[derive(Debug, Serialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct FolderCounters {
    pub global_bytes: u64,
    pub global_items: u64,
    pub local_bytes: u64,
    pub local_items: u64,
    pub need_bytes: u64,
    pub need_items: u64,
    pub need_deletes: u64,
    pub in_sync_bytes: u64,
    pub receive_only_changed_bytes: u64,
    pub receive_only_changed_items: u64,
}

/// A folder's configuration merged with its statistics and db status.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct FolderRecord {
    pub id: String,
    /// Falls back to `id` when the configured label is empty.
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub paused: bool,
    pub folder_type: FolderType,
    pub devices: Vec<SharedDevice>,
    pub counters: FolderCounters,
    /// Free-text daemon state: idle, scanning, syncing, error, ...
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_changed: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub errors: u64,
    pub pull_errors: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watch_error: Option<String>,
    pub rescan_interval_s: u32,
    pub fs_watcher_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub versioning: Option<VersioningConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_scan: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_file: Option<LastFile>,
}

impl FolderRecord {
    pub fn from_parts(
        folder: &FolderConfig,
        stats: Option<&FolderStats>,
        status: Option<&DbStatus>,
    ) -> Self {
        let counters = status.map(FolderCounters::from_status).unwrap_or_default();

        Self {
            id: folder.id.clone(),
            label: non_empty(folder.label.as_deref()).unwrap_or_else(|| folder.id.clone()),
            path: non_empty(folder.path.as_deref()),
            paused: folder.paused.unwrap_or(false),
            folder_type: folder.folder_type.unwrap_or_default(),
            devices: folder
                .devices
                .iter()
                .filter(|d| !d.device_id.is_empty())
                .map(|d| SharedDevice {
                    device_id: d.device_id.clone(),
                    introduced_by: non_empty(d.introduced_by.as_deref()),
                })
                .collect(),
            counters,
            state: status.and_then(|s| non_empty(s.state.as_deref())),
            state_changed: status
                .and_then(|s| s.state_changed.as_deref())
                .and_then(parse_timestamp),
            error: status.and_then(|s| non_empty(s.error.as_deref())),
            errors: status.and_then(|s| s.errors).unwrap_or(0),
            pull_errors: status.and_then(|s| s.pull_errors).unwrap_or(0),
            watch_error: status.and_then(|s| non_empty(s.watch_error.as_deref())),
            rescan_interval_s: folder.rescan_interval_s.unwrap_or(DEFAULT_RESCAN_INTERVAL_S),
            fs_watcher_enabled: folder.fs_watcher_enabled.unwrap_or(false),
            versioning: folder
                .versioning
                .clone()
                .filter(|v| !v.kind.is_empty()),
            last_scan: stats
                .and_then(|s| s.last_scan.as_deref())
                .and_then(parse_timestamp),
            last_file: stats
                .and_then(|s| s.last_file.clone())
                .filter(|f| !f.filename.is_empty()),
        }
    }

    pub fn is_shared_with(&self, device_id: &str) -> bool {
        self.devices.iter().any(|d| d.device_id == device_id)
    }
}

impl FolderCounters {
    fn from_status(status: &DbStatus) -> Self {
        Self {
            global_bytes: status.global_bytes.unwrap_or(0),
            global_items: status.global_total_items.unwrap_or(0),
            local_bytes: status.local_bytes.unwrap_or(0),
            local_items: status.local_total_items.unwrap_or(0),
            need_bytes: status.need_bytes.unwrap_or(0),
            need_items: status.need_total_items.unwrap_or(0),
            need_deletes: status.need_deletes.unwrap_or(0),
            in_sync_bytes: status.in_sync_bytes.unwrap_or(0),
            receive_only_changed_bytes: status.receive_only_changed_bytes.unwrap_or(0),
            receive_only_changed_items: status.receive_only_total_items.unwrap_or(0),
        }
    }
}
