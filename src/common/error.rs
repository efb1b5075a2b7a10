//! Error types for pagestore.

use std::path::PathBuf;

use thiserror::Error;

use crate::common::FileId;

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors surfaced by the replacer and disk manager.
///
/// Not every outcome is an error: an empty replacer, a log read past the end
/// of the file, and an unstattable path are reported with `None`.
#[derive(Debug, Error)]
pub enum Error {
    /// No regular file at this path, or it could not be deleted.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// `create_file` on a path that already exists.
    #[error("file already exists: {}", .0.display())]
    FileExists(PathBuf),

    /// `destroy_file` on a path that is still open.
    #[error("file still open: {}", .0.display())]
    FileNotClosed(PathBuf),

    /// The handle is not tracked as open.
    #[error("{0} is not open")]
    FileNotOpen(FileId),

    /// The handle lies outside the configured handle range.
    #[error("{0} is out of range")]
    InvalidFileId(FileId),

    /// Every handle slot is in use.
    #[error("too many open files (limit {0})")]
    TooManyOpenFiles(usize),

    /// A write transferred fewer bytes than requested.
    #[error("short write: expected {expected} bytes, wrote {actual}")]
    ShortWrite { expected: usize, actual: usize },

    /// A read transferred fewer bytes than requested.
    #[error("short read: expected {expected} bytes, read {actual}")]
    ShortRead { expected: usize, actual: usize },

    /// The file has no page numbers left to hand out.
    #[error("{0} has no page numbers left")]
    PageSpaceExhausted(FileId),

    /// I/O error from the operating system.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::FileExists(PathBuf::from("t.db"));
        assert_eq!(format!("{}", err), "file already exists: t.db");

        let err = Error::FileNotOpen(FileId::new(3));
        assert_eq!(format!("{}", err), "File(3) is not open");

        let err = Error::PageSpaceExhausted(FileId::new(1));
        assert_eq!(format!("{}", err), "File(1) has no page numbers left");

        let err = Error::ShortWrite {
            expected: 4096,
            actual: 100,
        };
        assert_eq!(
            format!("{}", err),
            "short write: expected 4096 bytes, wrote 100"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();

        match err {
            Error::Io(_) => {}
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_io_error_source() {
        use std::error::Error as _;

        let err: Error = std::io::Error::other("boom").into();
        assert!(err.source().is_some());
        assert!(Error::TooManyOpenFiles(8).source().is_none());
    }
}
