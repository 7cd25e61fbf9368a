use std::collections::BTreeMap;

use crate::syncthing_client::api::FolderCompletion;
use crate::syncthing_client::models::DeviceCompletion;

/// Reported when no bytes are needed but deletes or metadata-only items are
/// still pending, so the device never shows as finished while work remains.
pub const METADATA_ONLY_PERCENT: u8 = 95;

/// Reduce per-folder completion data for one device to a single percentage.
pub fn aggregate<I>(folders: I) -> DeviceCompletion
where
    I: IntoIterator<Item = (String, FolderCompletion)>,
{
    let folders: BTreeMap<String, FolderCompletion> = folders.into_iter().collect();

    let mut global: u64 = 0;
    let mut needed: u64 = 0;
    let mut items: u64 = 0;
    let mut deletes: u64 = 0;
    for completion in folders.values() {
        global = global.saturating_add(completion.global_bytes);
        needed = needed.saturating_add(completion.need_bytes);
        items = items.saturating_add(completion.need_items);
        deletes = deletes.saturating_add(completion.need_deletes);
    }
    let pending_items = items.saturating_add(deletes);

    let total = if global == 0 {
        100
    } else if needed == 0 && pending_items > 0 {
        METADATA_ONLY_PERCENT
    } else {
        let have = u128::from(global.saturating_sub(needed));
        (100 * have / u128::from(global)) as u8
    };

    DeviceCompletion {
        total,
        need_bytes: needed,
        need_items: pending_items,
        folders,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folder(
        global_bytes: u64,
        need_bytes: u64,
        need_items: u64,
        need_deletes: u64,
    ) -> FolderCompletion {
        FolderCompletion {
            global_bytes,
            need_bytes,
            need_items,
            need_deletes,
            ..Default::default()
        }
    }

    fn one(completion: FolderCompletion) -> DeviceCompletion {
        aggregate([("default".to_string(), completion)])
    }

    #[test]
    fn nothing_shared_is_complete() {
        assert_eq!(aggregate(Vec::new()).total, 100);
        assert_eq!(one(folder(0, 0, 3, 2)).total, 100);
    }

    #[test]
    fn pending_metadata_reports_95() {
        let completion = one(folder(1000, 0, 2, 1));
        assert_eq!(completion.total, 95);
        assert_eq!(completion.need_items, 3);
        assert!(!completion.is_complete());

        assert_eq!(one(folder(1000, 0, 0, 4)).total, 95);
    }

    #[test]
    fn fully_synced_is_100() {
        assert!(one(folder(1000, 0, 0, 0)).is_complete());
    }

    #[test]
    fn percentage_is_floored_across_folders() {
        let completion = aggregate([
            ("a".to_string(), folder(600, 1, 1, 0)),
            ("b".to_string(), folder(400, 0, 0, 0)),
        ]);
        // 999/1000 floors to 99, never rounds up to 100
        assert_eq!(completion.total, 99);
        assert_eq!(completion.need_bytes, 1);
        assert_eq!(completion.folders.len(), 2);

        assert_eq!(one(folder(3, 2, 1, 0)).total, 33);
    }

    #[test]
    fn need_above_global_clamps_to_zero() {
        assert_eq!(one(folder(10, 50, 1, 0)).total, 0);
    }
}
