mod completion;
mod connection;
mod device;
mod folder;
mod overview;

pub use completion::DeviceCompletion;
pub use connection::{ConnectionSample, ConnectionsSnapshot};
pub use device::{DeviceRecord, DeviceStatus};
pub use folder::{
    FolderCounters, FolderRecord, FolderStatus, FolderType, FolderWatcherState, SharedDevice,
};
pub use overview::SyncthingOverview;
