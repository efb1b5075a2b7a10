//! Common types shared across pagestore.
//!
//! - Configuration constants and [`DiskManagerConfig`](config::DiskManagerConfig)
//! - Error types
//! - Identifiers (FrameId, FileId, PageNo, PageId)

pub mod config;
pub mod error;
mod file_id;
mod frame_id;
mod page_id;

pub use error::{Error, Result};
pub use file_id::FileId;
pub use frame_id::FrameId;
pub use page_id::{PageId, PageNo};
