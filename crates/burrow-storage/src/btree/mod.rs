//! Disk-backed B+ tree secondary index.
//!
//! The index maps one fixed-width integer attribute of a relation to the
//! record IDs of its tuples. All persistent state lives in one index file:
//!
//! ```text
//! page 1:  header (relation name, attribute offset, type tag, root page)
//! page 2+: non-leaf and leaf nodes, typed contextually by descent
//! ```
//!
//! Nodes are fixed-fanout arrays sized to fill a page. Leaves chain through
//! `right_sib` page numbers in key order, which range scans follow. Inserts
//! descend with a path stack of page numbers and propagate splits upward;
//! nodes store no parent pointers.
//!
//! The index consumes the buffer pool's pin/unpin protocol: every page
//! access brackets a pin/unpin pair, and an executing scan keeps exactly
//! its current leaf pinned.

pub mod constants;
mod index;
mod meta;
mod node;
mod scan;

pub use constants::{
    HEADER_PAGE_NO, INVALID_KEY, LEAF_CAPACITY, LEVEL_LEAF_CHILDREN, LEVEL_NONLEAF_CHILDREN,
    NONLEAF_CAPACITY,
};
pub use index::{index_file_name, BTreeIndex};
pub use meta::IndexMetadata;
pub use node::{LeafNode, NonLeafNode};
pub use scan::ScanOp;
