use chrono::{DateTime, Duration, Utc};

use crate::syncthing_client::models::{
    ConnectionsSnapshot, DeviceCompletion, DeviceRecord, DeviceStatus, FolderRecord,
    FolderStatus, FolderType, FolderWatcherState,
};

/// A disconnected device not seen for this long is reported as inactive.
pub const INACTIVE_AFTER_SECS: i64 = 7 * 24 * 60 * 60;

/// Classify a remote device. First matching rule wins.
///
/// A connected device without completion data is still reported as
/// `Syncing`: completion is unknown, not 100.
pub fn classify_device(
    device: &DeviceRecord,
    folders: &[FolderRecord],
    connections: &ConnectionsSnapshot,
    completion: Option<&DeviceCompletion>,
    now: DateTime<Utc>,
) -> DeviceStatus {
    if !folders.iter().any(|f| f.is_shared_with(&device.device_id)) {
        return DeviceStatus::Unused;
    }

    let Some(connection) = connections.get(&device.device_id) else {
        return DeviceStatus::Unknown;
    };

    if device.paused {
        return DeviceStatus::Paused;
    }

    if connection.connected {
        return match completion {
            Some(completion) if completion.is_complete() => DeviceStatus::InSync,
            _ => DeviceStatus::Syncing,
        };
    }

    let inactive = match device.last_seen {
        Some(last_seen) => now - last_seen >= Duration::seconds(INACTIVE_AFTER_SECS),
        None => true,
    };
    if inactive {
        DeviceStatus::DisconnectedInactive
    } else {
        DeviceStatus::Disconnected
    }
}

pub fn classify_folder(folder: &FolderRecord) -> FolderStatus {
    if folder.paused {
        return FolderStatus::Paused;
    }

    let state = folder.state.as_deref().unwrap_or_default();
    match state {
        "scan-waiting" => return FolderStatus::ScanWaiting,
        "scanning" => return FolderStatus::Scanning,
        "sync-waiting" => return FolderStatus::SyncWaiting,
        "sync-preparing" => return FolderStatus::SyncPreparing,
        "syncing" => return FolderStatus::Syncing,
        "clean-waiting" => return FolderStatus::CleanWaiting,
        "cleaning" => return FolderStatus::Cleaning,
        "error" => return FolderStatus::Error,
        _ => {}
    }

    // The daemon can say idle while still carrying failures from a previous pull.
    if folder.errors > 0 || folder.pull_errors > 0 {
        return FolderStatus::FailedItems;
    }

    if state != "idle" {
        return FolderStatus::Unknown;
    }

    let counters = &folder.counters;
    let receive_only = matches!(
        folder.folder_type,
        FolderType::ReceiveOnly | FolderType::ReceiveEncrypted
    );
    if receive_only && counters.receive_only_changed_items > 0 {
        return if folder.folder_type == FolderType::ReceiveEncrypted {
            FolderStatus::LocalUnencrypted
        } else {
            FolderStatus::LocalAdditions
        };
    }
    // The share list always contains the local device.
    if folder.devices.len() <= 1 {
        return FolderStatus::Unshared;
    }
    if counters.need_items > 0 || counters.need_deletes > 0 {
        return FolderStatus::OutOfSync;
    }
    FolderStatus::Idle
}

/// Paused or stopped folders never report a failing watcher, even when a
/// stale `watch_error` is still attached.
pub fn watcher_state(folder: &FolderRecord, status: FolderStatus) -> FolderWatcherState {
    if !folder.fs_watcher_enabled {
        return FolderWatcherState::Disabled;
    }
    let suppressed = folder.paused || matches!(status, FolderStatus::Paused | FolderStatus::Error);
    if folder.watch_error.is_some() && !suppressed {
        FolderWatcherState::Failing
    } else {
        FolderWatcherState::Enabled
    }
}
