use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::syncthing_client::api::{DeviceConfig, DeviceStats};
use crate::syncthing_client::helpers::{non_empty, parse_timestamp};

use super::ConnectionSample;

/// Discrete liveness/sync classification of a remote device.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeviceStatus {
    Unused,
    Unknown,
    Paused,
    InSync,
    Syncing,
    Disconnected,
    DisconnectedInactive,
}

impl DeviceStatus {
    pub fn label(self) -> &'static str {
        match self {
            DeviceStatus::Unused => "Unused",
            DeviceStatus::Unknown => "Unknown",
            DeviceStatus::Paused => "Paused",
            DeviceStatus::InSync => "Up to Date",
            DeviceStatus::Syncing => "Syncing",
            DeviceStatus::Disconnected => "Disconnected",
            DeviceStatus::DisconnectedInactive => "Disconnected (Inactive)",
        }
    }
}

/// A device's configuration merged with its statistics for one poll cycle.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DeviceRecord {
    pub device_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub paused: bool,
    /// `None` when the daemon has never seen the device.
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_connection_duration_s: Option<f64>,
    /// KiB/s, 0 means unlimited.
    pub max_send_kbps: u64,
    pub max_recv_kbps: u64,
    pub introducer: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub introduced_by: Option<String>,
    pub auto_accept_folders: bool,
    pub untrusted: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<String>,
    /// Only known while the device is connected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_version: Option<String>,
}

impl DeviceRecord {
    /// Join a config entry with its (possibly absent) stats entry.
    pub fn from_parts(config: &DeviceConfig, stats: Option<&DeviceStats>) -> Self {
        Self {
            device_id: config.device_id.clone(),
            name: non_empty(config.name.as_deref()),
            paused: config.paused.unwrap_or(false),
            last_seen: stats
                .and_then(|s| s.last_seen.as_deref())
                .and_then(parse_timestamp),
            last_connection_duration_s: stats.and_then(|s| s.last_connection_duration_s),
            max_send_kbps: config.max_send_kbps.unwrap_or(0),
            max_recv_kbps: config.max_recv_kbps.unwrap_or(0),
            introducer: config.introducer.unwrap_or(false),
            introduced_by: non_empty(config.introduced_by.as_deref()),
            auto_accept_folders: config.auto_accept_folders.unwrap_or(false),
            untrusted: config.untrusted.unwrap_or(false),
            addresses: config.addresses.clone(),
            client_version: None,
        }
    }

    /// Copy of this record carrying the live connection's client version.
    pub fn with_connection(&self, connection: Option<&ConnectionSample>) -> Self {
        Self {
            client_version: connection
                .filter(|c| c.connected)
                .and_then(|c| non_empty(c.client_version.as_deref())),
            ..self.clone()
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.device_id)
    }
}
