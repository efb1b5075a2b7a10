//! Configuration for pagestore.
//!
//! Page geometry and handle limits are compile-time constants shared by every
//! caller. [`DiskManagerConfig`] carries the few values a
//! [`DiskManager`](crate::storage::DiskManager) needs at construction.

use std::path::{Path, PathBuf};

/// Size of a page in bytes (4KB).
///
/// # Layout
/// Page `n` of a file occupies bytes `[n × PAGE_SIZE, (n + 1) × PAGE_SIZE)`.
/// No header or metadata is written around it.
pub const PAGE_SIZE: usize = 4096;

/// Default upper bound on simultaneously open data files.
///
/// File handles are allocated from `0..MAX_OPEN_FILES`.
pub const MAX_OPEN_FILES: usize = 8192;

/// Default name of the log file.
pub const LOG_FILE_NAME: &str = "db.log";

/// Construction-time settings for a `DiskManager`.
///
/// # Example
/// ```
/// use pagestore::common::config::DiskManagerConfig;
///
/// let config = DiskManagerConfig::in_dir("/tmp/mydb").with_max_open_files(64);
/// assert!(config.log_path.ends_with("db.log"));
/// assert_eq!(config.max_open_files, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskManagerConfig {
    /// Path of the append-only log file. Opened lazily on first log access.
    pub log_path: PathBuf,

    /// Number of handle slots (and page-number counters).
    pub max_open_files: usize,
}

impl DiskManagerConfig {
    /// Config whose log file lives inside `dir`.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            log_path: dir.as_ref().join(LOG_FILE_NAME),
            ..Self::default()
        }
    }

    /// Override the log file path.
    pub fn with_log_path<P: Into<PathBuf>>(mut self, log_path: P) -> Self {
        self.log_path = log_path.into();
        self
    }

    /// Override the number of handle slots.
    pub fn with_max_open_files(mut self, max_open_files: usize) -> Self {
        self.max_open_files = max_open_files;
        self
    }
}

impl Default for DiskManagerConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from(LOG_FILE_NAME),
            max_open_files: MAX_OPEN_FILES,
        }
    }
}
