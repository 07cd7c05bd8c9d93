//! Relation file manager with buffer pool integration.
//!
//! All page I/O is routed through the buffer pool. Pages are pinned,
//! modified in place through pool guards, marked dirty, and written back
//! lazily on eviction or flush.

use crate::disk::DiskManager;
use crate::heap::page::{HeapPage, SlotId};
use crate::rid::RecordId;
use burrow_common::page::PageId;
use burrow_common::{BurrowError, Result};
use burrow_buffer::{BufferPool, PageReadGuard, PageWriteGuard};
use bytes::Bytes;
use std::sync::Arc;

/// A relation stored as a file of slotted heap pages.
///
/// The relation file is append-oriented: records are inserted into the last
/// page until it fills, then a new page is allocated. Records are opaque
/// byte strings addressed by [`RecordId`].
pub struct RelationFile {
    /// Disk manager for page I/O.
    disk: Arc<DiskManager>,
    /// Buffer pool for page caching.
    pool: Arc<BufferPool>,
    /// File ID assigned by the disk manager.
    file_id: u32,
    /// Relation name (file name under the data directory).
    name: String,
}

impl RelationFile {
    /// Creates a new relation file. Fails with `FileExists` if present.
    pub fn create(disk: Arc<DiskManager>, pool: Arc<BufferPool>, name: &str) -> Result<Self> {
        let file_id = disk.create(name)?;
        Ok(Self {
            disk,
            pool,
            file_id,
            name: name.to_string(),
        })
    }

    /// Opens an existing relation file. Fails with `FileNotFound` if absent.
    pub fn open(disk: Arc<DiskManager>, pool: Arc<BufferPool>, name: &str) -> Result<Self> {
        let file_id = disk.open(name)?;
        Ok(Self {
            disk,
            pool,
            file_id,
            name: name.to_string(),
        })
    }

    /// Returns the relation name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the file ID assigned by the disk manager.
    pub fn file_id(&self) -> u32 {
        self.file_id
    }

    /// Returns the number of pages in the relation file.
    pub fn page_count(&self) -> Result<u32> {
        self.disk.num_pages(self.file_id)
    }

    /// Makes a page resident in the buffer pool, loading it from disk if
    /// needed. Leaves the page unpinned.
    fn ensure_cached(&self, page_id: PageId) -> Result<()> {
        if self.pool.contains(page_id) {
            return Ok(());
        }
        let data = self.disk.read_page(page_id)?;
        let (_, evicted) = self.pool.load_page(page_id, &data)?;
        if let Some(evicted) = evicted {
            self.disk.write_page(evicted.page_id, &*evicted.data)?;
        }
        self.pool.unpin_page(page_id, false)?;
        Ok(())
    }

    /// Returns a pinned read guard for a page of this relation.
    fn read_guard(&self, page_no: u32) -> Result<PageReadGuard<'_>> {
        let page_id = PageId::new(self.file_id, page_no);
        self.ensure_cached(page_id)?;
        self.pool
            .read_page(page_id)
            .ok_or(BurrowError::PageNotFound { page_id })
    }

    /// Returns a pinned write guard for a page of this relation.
    fn write_guard(&self, page_no: u32) -> Result<PageWriteGuard<'_>> {
        let page_id = PageId::new(self.file_id, page_no);
        self.ensure_cached(page_id)?;
        self.pool
            .write_page(page_id)
            .ok_or(BurrowError::PageNotFound { page_id })
    }

    /// Inserts a record and returns its record ID.
    pub fn insert(&self, record: &[u8]) -> Result<RecordId> {
        // Try the last page first
        let num_pages = self.page_count()?;
        if num_pages > 0 {
            let guard = self.write_guard(num_pages)?;
            let mut data = guard.data_mut();
            match HeapPage::insert_record_in_slice(&mut **data, record) {
                Ok(slot) => {
                    drop(data);
                    guard.set_dirty();
                    return Ok(RecordId::new(num_pages, slot.0));
                }
                Err(BurrowError::PageFull) => {}
                Err(e) => return Err(e),
            }
        }

        // Last page full (or file empty): extend the file
        let page_id = self.disk.allocate_page(self.file_id)?;
        let guard = self.write_guard(page_id.page_no)?;
        let mut data = guard.data_mut();
        let slot = HeapPage::insert_record_in_slice(&mut **data, record)?;
        drop(data);
        guard.set_dirty();
        Ok(RecordId::new(page_id.page_no, slot.0))
    }

    /// Returns the record bytes for a record ID.
    pub fn get(&self, rid: RecordId) -> Result<Bytes> {
        if !rid.is_valid() || rid.page_no > self.page_count()? {
            return Err(BurrowError::RecordNotFound(rid.to_string()));
        }
        let guard = self.read_guard(rid.page_no)?;
        let data = guard.data();
        HeapPage::record_in_slice(&**data, SlotId(rid.slot_no))
            .map(Bytes::copy_from_slice)
            .ok_or_else(|| BurrowError::RecordNotFound(rid.to_string()))
    }

    /// Reads a page into an owned copy (used by the scanner).
    fn read_page_copy(&self, page_no: u32) -> Result<HeapPage> {
        let guard = self.read_guard(page_no)?;
        let data = guard.data();
        Ok(HeapPage::from_bytes(**data))
    }

    /// Starts a scan over every record in file order.
    pub fn scan(&self) -> RelationScan<'_> {
        RelationScan {
            file: self,
            next_page_no: 1,
            next_slot: 0,
            current: None,
        }
    }

    /// Flushes all dirty pages of this relation to disk.
    pub fn flush(&self) -> Result<()> {
        self.pool
            .flush_file(self.file_id, |pid, data| self.disk.write_page(pid, data))?;
        self.disk.flush_file(self.file_id)
    }
}

/// Cursor yielding every record of a relation in file order.
///
/// `next_record` raises `EndOfFile` once the relation is exhausted; callers
/// driving a bulk load treat that as the normal terminator.
pub struct RelationScan<'a> {
    file: &'a RelationFile,
    /// Next page to visit (1-based).
    next_page_no: u32,
    /// Next slot to visit on the current page.
    next_slot: u16,
    /// Copy of the page currently being scanned.
    current: Option<HeapPage>,
}

impl RelationScan<'_> {
    /// Returns the next record and its record ID.
    pub fn next_record(&mut self) -> Result<(RecordId, Bytes)> {
        loop {
            if let Some(page) = self.current.as_ref() {
                if self.next_slot < page.slot_count() {
                    let slot = SlotId(self.next_slot);
                    let rid = RecordId::new(self.next_page_no, self.next_slot);
                    self.next_slot += 1;
                    let record = page.record(slot).map(Bytes::copy_from_slice).ok_or_else(
                        || BurrowError::RecordNotFound(rid.to_string()),
                    )?;
                    return Ok((rid, record));
                }
                self.current = None;
                self.next_page_no += 1;
                self.next_slot = 0;
                continue;
            }

            if self.next_page_no > self.file.page_count()? {
                return Err(BurrowError::EndOfFile);
            }
            self.current = Some(self.file.read_page_copy(self.next_page_no)?);
        }
    }
}
