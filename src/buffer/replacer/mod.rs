//! Eviction policy implementations (replacers).
//!
//! A replacer tracks which frames of the buffer pool may be reclaimed and
//! picks a victim when the pool needs a free slot. It knows nothing about
//! page contents or files.
//!
//! Currently implements:
//! - [`LruReplacer`] - Least Recently Unpinned, O(1) for every operation

mod lru;

pub use lru::LruReplacer;

use crate::common::FrameId;

/// An eviction policy shared by the worker threads of a buffer pool.
///
/// Implementations synchronize internally, so every method takes `&self`
/// and a replacer can be shared through an `Arc`. A frame is either tracked
/// (unpinned, eligible for eviction) or not; there is no separate pinned set.
pub trait Replacer: Send + Sync {
    /// Remove and return the frame to evict, or `None` if no frame is
    /// eligible. Each tracked frame is handed to exactly one caller.
    fn victim(&self) -> Option<FrameId>;

    /// Make a frame ineligible for eviction. No-op if it is not tracked.
    fn pin(&self, frame_id: FrameId);

    /// Make a frame eligible for eviction. No-op if it is already tracked.
    fn unpin(&self, frame_id: FrameId);

    /// Number of frames currently eligible for eviction.
    fn size(&self) -> usize;
}
