//! Lock-free page table mapping page IDs to buffer frames.

use crate::frame::FrameId;
use burrow_common::page::PageId;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Sentinel value for empty key slots.
const EMPTY_KEY: u64 = u64::MAX;

/// Sentinel value for deleted key slots (tombstone).
const TOMBSTONE_KEY: u64 = u64::MAX - 1;

/// Sentinel value for empty frame slots.
const EMPTY_FRAME: u32 = u32::MAX;

/// Lock-free page table mapping PageId to FrameId.
///
/// Open-addressing hash table with linear probing. Removals leave tombstones
/// so probe chains stay intact. Sized at twice the frame count for a ~50%
/// load factor.
pub struct PageTable {
    /// Table keys (packed 64-bit PageId).
    keys: Box<[AtomicU64]>,
    /// Table values (frame IDs).
    values: Box<[AtomicU32]>,
    /// Bitmask for table indexing (table size - 1).
    mask: usize,
}

impl PageTable {
    /// Creates a new page table with capacity for the given number of frames.
    pub fn new(capacity: usize) -> Self {
        let size = (capacity * 2).next_power_of_two().max(64);

        let keys: Box<[AtomicU64]> = (0..size).map(|_| AtomicU64::new(EMPTY_KEY)).collect();
        let values: Box<[AtomicU32]> = (0..size).map(|_| AtomicU32::new(EMPTY_FRAME)).collect();

        Self {
            keys,
            values,
            mask: size - 1,
        }
    }

    /// Computes the starting probe index for a key.
    #[inline(always)]
    fn slot_index(&self, key: u64) -> usize {
        // Multiplicative hash for distribution
        let hash = key.wrapping_mul(0x517cc1b727220a95);
        (hash as usize) & self.mask
    }

    /// Looks up a page ID and returns its frame ID if present.
    #[inline]
    pub fn get(&self, page_id: PageId) -> Option<FrameId> {
        let key = page_id.as_u64();
        let mut idx = self.slot_index(key);

        for _ in 0..self.keys.len() {
            let stored = self.keys[idx].load(Ordering::Acquire);
            if stored == EMPTY_KEY {
                return None;
            }
            if stored == key {
                return Some(FrameId(self.values[idx].load(Ordering::Acquire)));
            }
            // Tombstones keep the probe chain alive
            idx = (idx + 1) & self.mask;
        }
        None
    }

    /// Inserts a page ID to frame ID mapping. Returns true on success.
    ///
    /// A tombstone earlier in the probe chain is reused, so the caller must
    /// not insert a key that is already present (the pool always misses on
    /// `get` before inserting).
    pub fn insert(&self, page_id: PageId, frame_id: FrameId) -> bool {
        let key = page_id.as_u64();
        let mut idx = self.slot_index(key);

        for _ in 0..self.keys.len() {
            let stored = self.keys[idx].load(Ordering::Acquire);
            if stored == EMPTY_KEY || stored == TOMBSTONE_KEY {
                self.values[idx].store(frame_id.0, Ordering::Release);
                self.keys[idx].store(key, Ordering::Release);
                return true;
            }
            if stored == key {
                self.values[idx].store(frame_id.0, Ordering::Release);
                return true;
            }
            idx = (idx + 1) & self.mask;
        }
        false // table full
    }

    /// Removes a page ID mapping. Returns the frame ID if it was present.
    pub fn remove(&self, page_id: PageId) -> Option<FrameId> {
        let key = page_id.as_u64();
        let mut idx = self.slot_index(key);

        for _ in 0..self.keys.len() {
            let stored = self.keys[idx].load(Ordering::Acquire);
            if stored == EMPTY_KEY {
                return None;
            }
            if stored == key {
                let frame_id = self.values[idx].load(Ordering::Acquire);
                self.keys[idx].store(TOMBSTONE_KEY, Ordering::Release);
                return Some(FrameId(frame_id));
            }
            idx = (idx + 1) & self.mask;
        }
        None
    }

    /// Returns true if the page ID is in the table.
    pub fn contains(&self, page_id: PageId) -> bool {
        self.get(page_id).is_some()
    }

    /// Returns the number of entries in the table.
    pub fn len(&self) -> usize {
        self.keys
            .iter()
            .filter(|slot| {
                let key = slot.load(Ordering::Relaxed);
                key != EMPTY_KEY && key != TOMBSTONE_KEY
            })
            .count()
    }

    /// Returns true if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over all entries, calling the provided function for each.
    /// Returns early if the function returns false.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(PageId, FrameId) -> bool,
    {
        for (idx, key_slot) in self.keys.iter().enumerate() {
            let key = key_slot.load(Ordering::Relaxed);
            if key != EMPTY_KEY && key != TOMBSTONE_KEY {
                let frame_id = FrameId(self.values[idx].load(Ordering::Relaxed));
                if !f(PageId::from_u64(key), frame_id) {
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get() {
        let table = PageTable::new(100);
        let page_id = PageId::new(0, 42);

        assert!(table.insert(page_id, FrameId(7)));
        assert_eq!(table.get(page_id), Some(FrameId(7)));
        assert!(table.contains(page_id));
    }

    #[test]
    fn test_get_missing() {
        let table = PageTable::new(100);
        assert_eq!(table.get(PageId::new(3, 9)), None);
    }

    #[test]
    fn test_remove() {
        let table = PageTable::new(100);
        let page_id = PageId::new(1, 42);

        table.insert(page_id, FrameId(7));
        assert_eq!(table.remove(page_id), Some(FrameId(7)));
        assert_eq!(table.get(page_id), None);
        assert!(!table.contains(page_id));
    }

    #[test]
    fn test_remove_missing() {
        let table = PageTable::new(100);
        assert_eq!(table.remove(PageId::new(2, 2)), None);
    }

    #[test]
    fn test_reinsert_after_remove() {
        let table = PageTable::new(100);
        let page_id = PageId::new(1, 5);

        table.insert(page_id, FrameId(1));
        table.remove(page_id);
        assert!(table.insert(page_id, FrameId(2)));
        assert_eq!(table.get(page_id), Some(FrameId(2)));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_update_existing() {
        let table = PageTable::new(100);
        let page_id = PageId::new(0, 42);

        table.insert(page_id, FrameId(1));
        table.insert(page_id, FrameId(2));

        assert_eq!(table.get(page_id), Some(FrameId(2)));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_len() {
        let table = PageTable::new(100);

        assert_eq!(table.len(), 0);
        assert!(table.is_empty());

        table.insert(PageId::new(0, 1), FrameId(1));
        table.insert(PageId::new(0, 2), FrameId(2));
        table.insert(PageId::new(1, 1), FrameId(3));

        assert_eq!(table.len(), 3);
        assert!(!table.is_empty());
    }

    #[test]
    fn test_many_entries_probe_chains() {
        let table = PageTable::new(128);

        for i in 0..128u32 {
            assert!(table.insert(PageId::new(i % 4, i + 1), FrameId(i)));
        }
        for i in 0..128u32 {
            assert_eq!(table.get(PageId::new(i % 4, i + 1)), Some(FrameId(i)));
        }
        assert_eq!(table.len(), 128);
    }

    #[test]
    fn test_for_each() {
        let table = PageTable::new(16);
        table.insert(PageId::new(0, 1), FrameId(1));
        table.insert(PageId::new(0, 2), FrameId(2));

        let mut seen = Vec::new();
        table.for_each(|page_id, frame_id| {
            seen.push((page_id, frame_id));
            true
        });
        seen.sort_by_key(|(p, _)| p.page_no);

        assert_eq!(
            seen,
            vec![
                (PageId::new(0, 1), FrameId(1)),
                (PageId::new(0, 2), FrameId(2)),
            ]
        );
    }

    #[test]
    fn test_for_each_early_exit() {
        let table = PageTable::new(16);
        table.insert(PageId::new(0, 1), FrameId(1));
        table.insert(PageId::new(0, 2), FrameId(2));

        let mut count = 0;
        table.for_each(|_, _| {
            count += 1;
            false
        });
        assert_eq!(count, 1);
    }
}
