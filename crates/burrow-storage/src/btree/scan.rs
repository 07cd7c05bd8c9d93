//! Range scan state machine for the B+ tree index.
//!
//! A scan descends from the root to the first leaf that can hold the lower
//! bound, then walks the leaf chain. The current leaf stays pinned between
//! `scan_next` calls; exhaustion is signaled with `IndexScanCompleted` and
//! implicitly ends the scan.

use crate::btree::constants::{INVALID_KEY, LEAF_CAPACITY, LEVEL_LEAF_CHILDREN};
use crate::btree::index::BTreeIndex;
use crate::btree::node::{LeafNode, NonLeafNode};
use crate::rid::RecordId;
use burrow_common::page::INVALID_PAGE_NO;
use burrow_common::{BurrowError, Result};

/// Comparison operator for a scan bound.
///
/// A lower bound takes `Gt` or `Gte`; an upper bound takes `Lt` or `Lte`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOp {
    /// Strictly less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Strictly greater than.
    Gt,
    /// Greater than or equal.
    Gte,
}

impl ScanOp {
    /// Returns true if a key satisfies this operator as the lower bound.
    fn admits_lower(&self, key: i32, low: i32) -> bool {
        match self {
            ScanOp::Gt => key > low,
            ScanOp::Gte => key >= low,
            ScanOp::Lt | ScanOp::Lte => false,
        }
    }

    /// Returns true if a key satisfies this operator as the upper bound.
    fn admits_upper(&self, key: i32, high: i32) -> bool {
        match self {
            ScanOp::Lt => key < high,
            ScanOp::Lte => key <= high,
            ScanOp::Gt | ScanOp::Gte => false,
        }
    }
}

/// State of an executing scan.
///
/// The leaf at `current_page_no` is pinned in the buffer pool for as long
/// as this state exists; `node` is its decoded contents and `next_entry`
/// the next slot to examine.
pub(crate) struct ScanState {
    /// Lower bound value.
    low_val: i32,
    /// Lower bound operator (Gt or Gte).
    low_op: ScanOp,
    /// Upper bound value.
    high_val: i32,
    /// Upper bound operator (Lt or Lte).
    high_op: ScanOp,
    /// Page number of the pinned current leaf (0 for an empty tree).
    current_page_no: u32,
    /// Decoded contents of the current leaf.
    node: LeafNode,
    /// Next slot to examine.
    next_entry: usize,
}

impl BTreeIndex {
    /// Starts a range scan over `(low_val, low_op, high_val, high_op)`.
    ///
    /// The lower operator must be `Gt` or `Gte` and the upper operator `Lt`
    /// or `Lte`, otherwise the call fails with `BadOpcodes`; `low_val` must
    /// not exceed `high_val`, otherwise it fails with `BadScanRange`.
    /// Starting a scan while one is executing ends the old scan first.
    pub fn start_scan(
        &mut self,
        low_val: i32,
        low_op: ScanOp,
        high_val: i32,
        high_op: ScanOp,
    ) -> Result<()> {
        if !matches!(low_op, ScanOp::Gt | ScanOp::Gte)
            || !matches!(high_op, ScanOp::Lt | ScanOp::Lte)
        {
            return Err(BurrowError::BadOpcodes);
        }
        if low_val > high_val {
            return Err(BurrowError::BadScanRange {
                low: low_val,
                high: high_val,
            });
        }

        if self.scan.is_some() {
            self.end_scan()?;
        }

        // Descend to the leaf that could hold the first qualifying key
        let mut page_no = self.root_page_no();
        let leaf_no = loop {
            let node = NonLeafNode::from_bytes(self.read_node(page_no)?);
            let idx = node.descend_index(low_val);
            let child = node.child(idx);

            if child == INVALID_PAGE_NO {
                // Empty tree: park the scan on a synthetic empty leaf so the
                // first scan_next reports completion
                self.scan = Some(ScanState {
                    low_val,
                    low_op,
                    high_val,
                    high_op,
                    current_page_no: INVALID_PAGE_NO,
                    node: LeafNode::new(),
                    next_entry: 0,
                });
                return Ok(());
            }
            if node.level() == LEVEL_LEAF_CHILDREN {
                break child;
            }
            page_no = child;
        };

        let node = self.pin_leaf(leaf_no)?;

        // Position on the first entry satisfying the lower bound; if this
        // leaf has none, the chain walk in scan_next advances past it
        let mut next_entry = 0;
        while next_entry < LEAF_CAPACITY {
            let key = node.key(next_entry);
            if key == INVALID_KEY || low_op.admits_lower(key, low_val) {
                break;
            }
            next_entry += 1;
        }

        self.scan = Some(ScanState {
            low_val,
            low_op,
            high_val,
            high_op,
            current_page_no: leaf_no,
            node,
            next_entry,
        });
        Ok(())
    }

    /// Returns the record id of the next entry in ascending key order that
    /// satisfies both bounds.
    ///
    /// Fails with `ScanNotInitialized` when no scan is executing and with
    /// `IndexScanCompleted` when the matches are exhausted; completion
    /// unpins the current leaf and ends the scan.
    pub fn scan_next(&mut self) -> Result<RecordId> {
        let mut state = self.scan.take().ok_or(BurrowError::ScanNotInitialized)?;

        loop {
            // A sentinel slot means the rest of this leaf is unused
            if state.next_entry == LEAF_CAPACITY
                || state.node.key(state.next_entry) == INVALID_KEY
            {
                let right = state.node.right_sib();
                self.unpin_quiet(state.current_page_no);
                if right == INVALID_PAGE_NO {
                    // End of the leaf chain; scan is over
                    return Err(BurrowError::IndexScanCompleted);
                }
                state.node = self.pin_leaf(right)?;
                state.current_page_no = right;
                state.next_entry = 0;
                continue;
            }

            let key = state.node.key(state.next_entry);

            // Entries below the range are skipped; this covers leaves whose
            // leftmost keys predate the scan and duplicates at the boundary
            if !state.low_op.admits_lower(key, state.low_val) {
                state.next_entry += 1;
                continue;
            }

            if !state.high_op.admits_upper(key, state.high_val) {
                self.unpin_quiet(state.current_page_no);
                return Err(BurrowError::IndexScanCompleted);
            }

            let rid = state.node.rid(state.next_entry);
            state.next_entry += 1;
            self.scan = Some(state);
            return Ok(rid);
        }
    }

    /// Ends an executing scan, unpinning the current leaf.
    ///
    /// Fails with `ScanNotInitialized` when no scan is executing.
    pub fn end_scan(&mut self) -> Result<()> {
        let state = self.scan.take().ok_or(BurrowError::ScanNotInitialized)?;
        self.unpin_quiet(state.current_page_no);
        Ok(())
    }
}
