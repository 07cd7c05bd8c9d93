//! Heap storage for relation files.
//!
//! This module provides:
//! - HeapPage: slotted page format for variable-length records
//! - RelationFile: buffer-pool-backed relation storage with a full-file
//!   scanner, the tuple source driven by index bulk loads

mod file;
mod page;

pub use file::{RelationFile, RelationScan};
pub use page::{HeapPage, HeapPageHeader, RecordSlot, SlotId};
