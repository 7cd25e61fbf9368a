use serde::Serialize;

use crate::syncthing_client::models::{
    ConnectionSample, DeviceCompletion, DeviceRecord, DeviceStatus, FolderRecord, FolderStatus,
    FolderWatcherState, SyncthingOverview,
};

/// One fully derived poll cycle.
#[derive(Debug, Serialize)]
pub struct SyncthingData {
    pub overview: SyncthingOverview,
    pub folders: Vec<FolderView>,
    pub devices: Vec<DeviceView>,
    /// Aggregate counters across all connections, with rates.
    pub total: ConnectionSample,
}

#[derive(Debug, Serialize)]
pub struct FolderView {
    #[serde(flatten)]
    pub record: FolderRecord,
    pub status: FolderStatus,
    pub watcher: FolderWatcherState,
}

#[derive(Debug, Serialize)]
pub struct DeviceView {
    #[serde(flatten)]
    pub record: DeviceRecord,
    pub status: DeviceStatus,
    pub completion: DeviceCompletion,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection: Option<ConnectionSample>,
}
