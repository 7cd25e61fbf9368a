use std::collections::BTreeMap;

use serde::Serialize;

use crate::syncthing_client::api::FolderCompletion;

/// How far one remote device is from having all the data it shares with us.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DeviceCompletion {
    /// 0..=100; exactly 100 only when nothing at all is left to do.
    pub total: u8,
    pub need_bytes: u64,
    /// Needed items plus needed deletes.
    pub need_items: u64,
    pub folders: BTreeMap<String, FolderCompletion>,
}

impl DeviceCompletion {
    pub fn is_complete(&self) -> bool {
        self.total == 100
    }
}
