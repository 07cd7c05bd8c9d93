//! Disk manager for page-level I/O over named files.

use burrow_common::page::{PageId, INVALID_PAGE_NO, PAGE_SIZE};
use burrow_common::{BurrowError, Result, StorageConfig};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Configuration for the disk manager.
#[derive(Debug, Clone)]
pub struct DiskManagerConfig {
    /// Base directory for data files.
    pub data_dir: PathBuf,
    /// Enable fsync after writes.
    pub fsync_enabled: bool,
}

impl Default for DiskManagerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            fsync_enabled: true,
        }
    }
}

impl From<&StorageConfig> for DiskManagerConfig {
    fn from(config: &StorageConfig) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            fsync_enabled: config.fsync_enabled,
        }
    }
}

/// Manages reading and writing pages to named data files.
///
/// Files are identified by caller-visible names under the data directory
/// (e.g. a relation file, or an index file named `<relation>.<offset>`).
/// Each open file gets a runtime file ID used in [`PageId`]s. Page numbers
/// are 1-based; page number 0 is reserved as invalid.
pub struct DiskManager {
    /// Configuration.
    config: DiskManagerConfig,
    /// Open files and the name-to-id mapping.
    inner: Mutex<DiskManagerInner>,
}

struct DiskManagerInner {
    /// Open file handles keyed by file ID.
    by_id: HashMap<u32, FileHandle>,
    /// File IDs keyed by file name.
    ids_by_name: HashMap<String, u32>,
    /// Next file ID to hand out.
    next_file_id: u32,
}

/// Handle for an open data file.
struct FileHandle {
    /// The file handle.
    file: File,
    /// Name under the data directory.
    name: String,
    /// Number of pages in the file.
    num_pages: u32,
}

impl DiskManager {
    /// Creates a new disk manager.
    pub fn new(config: DiskManagerConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;

        Ok(Self {
            config,
            inner: Mutex::new(DiskManagerInner {
                by_id: HashMap::new(),
                ids_by_name: HashMap::new(),
                next_file_id: 0,
            }),
        })
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.config.data_dir.join(name)
    }

    /// Creates a new file exclusively and returns its file ID.
    ///
    /// Fails with `FileExists` when a file of that name is already on disk
    /// (or already open); this outcome drives the index open-or-create
    /// decision.
    pub fn create(&self, name: &str) -> Result<u32> {
        let mut inner = self.inner.lock();

        if inner.ids_by_name.contains_key(name) {
            return Err(BurrowError::FileExists(name.to_string()));
        }

        let path = self.file_path(name);
        let file = match OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(BurrowError::FileExists(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(inner.register(name, file, 0))
    }

    /// Opens an existing file and returns its file ID.
    ///
    /// Returns the already-assigned ID if the file is open. Fails with
    /// `FileNotFound` when no file of that name exists.
    pub fn open(&self, name: &str) -> Result<u32> {
        let mut inner = self.inner.lock();

        if let Some(&file_id) = inner.ids_by_name.get(name) {
            return Ok(file_id);
        }

        let path = self.file_path(name);
        let file = match OpenOptions::new().read(true).write(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(BurrowError::FileNotFound(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let file_size = file.metadata()?.len();
        let num_pages = (file_size / PAGE_SIZE as u64) as u32;

        Ok(inner.register(name, file, num_pages))
    }

    /// Reads a page from disk.
    pub fn read_page(&self, page_id: PageId) -> Result<[u8; PAGE_SIZE]> {
        let mut inner = self.inner.lock();
        let handle = inner.handle_mut(page_id.file_id)?;

        if page_id.page_no == INVALID_PAGE_NO || page_id.page_no > handle.num_pages {
            return Err(BurrowError::PageNotFound { page_id });
        }

        handle.file.seek(SeekFrom::Start(page_offset(page_id.page_no)))?;

        let mut buffer = [0u8; PAGE_SIZE];
        handle.file.read_exact(&mut buffer)?;

        Ok(buffer)
    }

    /// Writes a page to disk.
    pub fn write_page(&self, page_id: PageId, data: &[u8]) -> Result<()> {
        if data.len() != PAGE_SIZE {
            return Err(BurrowError::PageSizeMismatch {
                expected: PAGE_SIZE,
                actual: data.len(),
            });
        }
        if page_id.page_no == INVALID_PAGE_NO {
            return Err(BurrowError::PageNotFound { page_id });
        }

        let fsync = self.config.fsync_enabled;
        let mut inner = self.inner.lock();
        let handle = inner.handle_mut(page_id.file_id)?;

        handle.file.seek(SeekFrom::Start(page_offset(page_id.page_no)))?;
        handle.file.write_all(data)?;

        if fsync {
            handle.file.sync_all()?;
        }

        if page_id.page_no > handle.num_pages {
            handle.num_pages = page_id.page_no;
        }

        Ok(())
    }

    /// Allocates a new zeroed page at the end of the file.
    ///
    /// Returns the PageId of the newly allocated page; the first allocation
    /// in a fresh file yields page number 1.
    pub fn allocate_page(&self, file_id: u32) -> Result<PageId> {
        let fsync = self.config.fsync_enabled;
        let mut inner = self.inner.lock();
        let handle = inner.handle_mut(file_id)?;

        let page_no = handle.num_pages + 1;

        handle.file.seek(SeekFrom::Start(page_offset(page_no)))?;
        handle.file.write_all(&[0u8; PAGE_SIZE])?;

        if fsync {
            handle.file.sync_all()?;
        }

        handle.num_pages = page_no;

        Ok(PageId::new(file_id, page_no))
    }

    /// Returns the number of pages in a file.
    pub fn num_pages(&self, file_id: u32) -> Result<u32> {
        let mut inner = self.inner.lock();
        Ok(inner.handle_mut(file_id)?.num_pages)
    }

    /// Flushes pending writes of one file to disk.
    pub fn flush_file(&self, file_id: u32) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.handle_mut(file_id)?.file.sync_all()?;
        Ok(())
    }

    /// Closes a file, releasing its handle.
    pub fn close_file(&self, file_id: u32) -> Result<()> {
        let mut inner = self.inner.lock();
        if let Some(handle) = inner.by_id.remove(&file_id) {
            inner.ids_by_name.remove(&handle.name);
            handle.file.sync_all()?;
        }
        Ok(())
    }

    /// Closes all open files.
    pub fn close_all(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.ids_by_name.clear();
        for (_, handle) in inner.by_id.drain() {
            handle.file.sync_all()?;
        }
        Ok(())
    }

    /// Removes a file from disk, closing it first if open.
    pub fn remove_file(&self, name: &str) -> Result<()> {
        {
            let mut inner = self.inner.lock();
            if let Some(file_id) = inner.ids_by_name.remove(name) {
                inner.by_id.remove(&file_id);
            }
        }
        let path = self.file_path(name);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

impl Drop for DiskManager {
    fn drop(&mut self) {
        let _ = self.close_all();
    }
}

impl DiskManagerInner {
    fn register(&mut self, name: &str, file: File, num_pages: u32) -> u32 {
        let file_id = self.next_file_id;
        self.next_file_id += 1;
        self.ids_by_name.insert(name.to_string(), file_id);
        self.by_id.insert(
            file_id,
            FileHandle {
                file,
                name: name.to_string(),
                num_pages,
            },
        );
        file_id
    }

    fn handle_mut(&mut self, file_id: u32) -> Result<&mut FileHandle> {
        self.by_id
            .get_mut(&file_id)
            .ok_or_else(|| BurrowError::FileNotFound(format!("file id {}", file_id)))
    }
}

/// Byte offset of a 1-based page number within its file.
#[inline]
fn page_offset(page_no: u32) -> u64 {
    (page_no as u64 - 1) * PAGE_SIZE as u64
}
