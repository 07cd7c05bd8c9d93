//! Buffer management for burrowdb.
//!
//! This crate provides in-memory page caching with:
//! - Fixed-size buffer pool with configurable frame count
//! - Pin counting for page residency
//! - Clock eviction policy gated on pin counts
//! - Dirty page tracking with per-file flush

mod frame;
mod page_table;
mod pool;
mod replacer;

pub use frame::{BufferFrame, FrameId};
pub use pool::{
    BufferPool, BufferPoolConfig, BufferPoolStats, EvictedPage, PageReadGuard, PageWriteGuard,
};
pub use replacer::{ClockReplacer, Replacer};
