pub mod api;
mod client;
pub mod core;
pub mod helpers;
pub mod models;

pub use api::{DeviceView, FolderView, SyncthingData};
pub use client::SyncthingClient;
pub use models::{
    ConnectionSample, ConnectionsSnapshot, DeviceCompletion, DeviceRecord, DeviceStatus,
    FolderRecord, FolderStatus, FolderWatcherState, SyncthingOverview,
};
