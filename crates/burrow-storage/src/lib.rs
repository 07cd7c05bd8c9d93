//! Storage engine for burrowdb.
//!
//! This crate provides:
//! - Disk manager for page-level I/O over named files
//! - Slotted heap pages and relation files with a full-file scanner
//! - Record identifiers
//! - The disk-backed B+ tree secondary index

mod btree;
mod disk;
mod heap;
mod rid;

pub use btree::{
    index_file_name, BTreeIndex, IndexMetadata, LeafNode, NonLeafNode, ScanOp, HEADER_PAGE_NO,
    INVALID_KEY, LEAF_CAPACITY, LEVEL_LEAF_CHILDREN, LEVEL_NONLEAF_CHILDREN, NONLEAF_CAPACITY,
};
pub use disk::{DiskManager, DiskManagerConfig};
pub use heap::{HeapPage, HeapPageHeader, RecordSlot, RelationFile, RelationScan, SlotId};
pub use rid::RecordId;
