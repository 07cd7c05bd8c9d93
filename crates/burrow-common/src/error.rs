//! Error types for burrowdb.

use crate::page::PageId;
use thiserror::Error;

/// Result type alias using BurrowError.
pub type Result<T> = std::result::Result<T, BurrowError>;

/// Errors that can occur in burrowdb operations.
#[derive(Debug, Error)]
pub enum BurrowError {
    // I/O and file errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file already exists: {0}")]
    FileExists(String),

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("page not found: {page_id}")]
    PageNotFound { page_id: PageId },

    #[error("page buffer size mismatch: expected {expected}, got {actual}")]
    PageSizeMismatch { expected: usize, actual: usize },

    // Buffer manager errors
    #[error("buffer pool full, unable to allocate frame")]
    BufferPoolFull,

    #[error("page not pinned: {page_id}")]
    PageNotPinned { page_id: PageId },

    // Heap errors
    #[error("page full, unable to insert record")]
    PageFull,

    #[error("record not found: {0}")]
    RecordNotFound(String),

    /// Normal terminator of a relation scan.
    #[error("end of file reached")]
    EndOfFile,

    // Index errors
    #[error("existing index metadata does not match parameters: {0}")]
    BadIndexInfo(String),

    #[error("invalid scan operators")]
    BadOpcodes,

    #[error("invalid scan range: low {low} > high {high}")]
    BadScanRange { low: i32, high: i32 },

    #[error("scan not initialized")]
    ScanNotInitialized,

    /// Normal terminator of an index range scan.
    #[error("index scan completed")]
    IndexScanCompleted,

    #[error("unsupported attribute type: {0}")]
    UnsupportedType(String),

    // Internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn test_io_error_conversion() {
        let io_err = IoError::new(ErrorKind::NotFound, "file not found");
        let err: BurrowError = io_err.into();
        assert!(matches!(err, BurrowError::Io(_)));
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_file_errors_display() {
        let err = BurrowError::FileExists("users.8".to_string());
        assert_eq!(err.to_string(), "file already exists: users.8");

        let err = BurrowError::FileNotFound("missing.rel".to_string());
        assert_eq!(err.to_string(), "file not found: missing.rel");
    }

    #[test]
    fn test_page_not_found_display() {
        let err = BurrowError::PageNotFound {
            page_id: PageId::new(1, 42),
        };
        assert_eq!(err.to_string(), "page not found: 1:42");
    }

    #[test]
    fn test_page_not_pinned_display() {
        let err = BurrowError::PageNotPinned {
            page_id: PageId::new(0, 7),
        };
        assert_eq!(err.to_string(), "page not pinned: 0:7");
    }

    #[test]
    fn test_buffer_pool_full_display() {
        let err = BurrowError::BufferPoolFull;
        assert_eq!(err.to_string(), "buffer pool full, unable to allocate frame");
    }

    #[test]
    fn test_scan_errors_display() {
        assert_eq!(BurrowError::BadOpcodes.to_string(), "invalid scan operators");
        assert_eq!(
            BurrowError::BadScanRange { low: 10, high: 5 }.to_string(),
            "invalid scan range: low 10 > high 5"
        );
        assert_eq!(
            BurrowError::ScanNotInitialized.to_string(),
            "scan not initialized"
        );
        assert_eq!(
            BurrowError::IndexScanCompleted.to_string(),
            "index scan completed"
        );
    }

    #[test]
    fn test_bad_index_info_display() {
        let err = BurrowError::BadIndexInfo("offset mismatch".to_string());
        assert_eq!(
            err.to_string(),
            "existing index metadata does not match parameters: offset mismatch"
        );
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<i32> {
            Ok(42)
        }

        fn returns_err() -> Result<i32> {
            Err(BurrowError::EndOfFile)
        }

        assert!(returns_ok().is_ok());
        assert!(returns_err().is_err());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BurrowError>();
    }
}
