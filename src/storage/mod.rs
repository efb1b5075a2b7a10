//! Storage layer - disk I/O.
//!
//! - [`DiskManager`] - Page-addressed file I/O, file handles and the log file

mod disk_manager;

pub use disk_manager::DiskManager;
