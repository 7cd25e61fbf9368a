mod queries;
mod responses;
mod types;

pub use queries::{CompletionQuery, FolderStatusQuery};
pub use responses::{DeviceView, FolderView, SyncthingData};
pub use types::{
    DbStatus, DeviceConfig, DeviceStats, FolderCompletion, FolderConfig, FolderDevice,
    FolderStats, LastFile, VersionInfo, VersioningConfig,
};
