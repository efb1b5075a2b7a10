//! pagestore - the page-level storage core of a disk-backed database.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │              Buffer Pool Manager (caller, not here)             │
//! │         frame table · page table · flush/fetch decisions        │
//! └───────────────┬─────────────────────────────────┬───────────────┘
//!                 │ victim / pin / unpin / size     │ page + log I/O
//!                 ↓                                 ↓
//! ┌───────────────────────────────┐ ┌───────────────────────────────┐
//! │   Replacer (buffer/)          │ │   DiskManager (storage/)      │
//! │   LRU registry of unpinned    │ │   path ↔ FileId table         │
//! │   frames, O(1) operations     │ │   per-file page counters      │
//! │                               │ │   page I/O · log channel      │
//! └───────────────────────────────┘ └───────────────────────────────┘
//! ```
//!
//! The two components never call each other and can be used on their own.
//!
//! # Modules
//! - [`common`] - Shared primitives (FrameId, FileId, PageNo, Error, config)
//! - [`buffer`] - Eviction policies
//! - [`storage`] - Disk I/O
//!
//! # Quick Start
//! ```no_run
//! use pagestore::common::config::DiskManagerConfig;
//! use pagestore::storage::DiskManager;
//! use pagestore::PAGE_SIZE;
//!
//! let dm = DiskManager::new(DiskManagerConfig::in_dir("my_database"));
//! dm.create_dir("my_database").unwrap();
//! dm.create_file("my_database/t.db").unwrap();
//!
//! let fd = dm.open_file("my_database/t.db").unwrap();
//! let page_no = dm.allocate_page(fd).unwrap();
//! dm.write_page(fd, page_no, &[0xAB; PAGE_SIZE]).unwrap();
//! ```

pub mod buffer;
pub mod common;
pub mod storage;

pub use common::config::PAGE_SIZE;
pub use common::{Error, FileId, FrameId, PageId, PageNo, Result};

pub use buffer::{LruReplacer, Replacer};
pub use storage::DiskManager;
