//! Buffer management policies.
//!
//! The buffer pool itself lives above this crate. What it needs from here is
//! an eviction policy that decides which of its frames to reclaim.
//!
//! # Components
//! - [`replacer`] - Eviction policy trait and implementations

pub mod replacer;

pub use replacer::{LruReplacer, Replacer};
