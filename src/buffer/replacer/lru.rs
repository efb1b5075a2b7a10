//! LRU (Least Recently Used) replacement policy.
//!
//! Frames enter the registry when they are unpinned and leave it when they
//! are pinned again or chosen as a victim. The victim is always the frame
//! that has been sitting unpinned the longest.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::trace;

use crate::buffer::replacer::Replacer;
use crate::common::FrameId;

/// A thread-safe LRU eviction policy.
///
/// # Structure
/// ```text
///   head (most recently unpinned)              tail (victim)
///    ┌────────┐    ┌────────┐    ┌────────┐    ┌────────┐
///    │Frame 7 │◀──▶│Frame 2 │◀──▶│Frame 5 │◀──▶│Frame 0 │
///    └────────┘    └────────┘    └────────┘    └────────┘
///        ▲             ▲             ▲             ▲
///  index: FrameId ──▶ arena slot (O(1) removal on pin)
/// ```
///
/// The list is an arena of nodes linked by slot index; freed slots are
/// recycled, so the arena never grows beyond the peak number of tracked
/// frames.
///
/// # Thread Safety
/// One `Mutex` guards the list and the index together. Every operation holds
/// it for its full duration so a concurrent `pin`/`unpin` can never observe
/// the index and the list out of step.
///
/// # Example
/// ```
/// use pagestore::buffer::replacer::{LruReplacer, Replacer};
/// use pagestore::FrameId;
///
/// let replacer = LruReplacer::new(3);
/// replacer.unpin(FrameId::new(1));
/// replacer.unpin(FrameId::new(2));
///
/// assert_eq!(replacer.victim(), Some(FrameId::new(1)));
/// assert_eq!(replacer.size(), 1);
/// ```
pub struct LruReplacer {
    inner: Mutex<LruList>,

    /// Number of frames in the pool this replacer serves.
    capacity: usize,
}

impl LruReplacer {
    /// Create a replacer for a pool of `capacity` frames.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(LruList::with_capacity(capacity)),
            capacity,
        }
    }

    /// Pool size given at construction.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Replacer for LruReplacer {
    fn victim(&self) -> Option<FrameId> {
        let victim = self.inner.lock().pop_back();
        if let Some(frame_id) = victim {
            trace!(%frame_id, "selected victim");
        }
        victim
    }

    fn pin(&self, frame_id: FrameId) {
        self.inner.lock().remove(frame_id);
    }

    fn unpin(&self, frame_id: FrameId) {
        self.inner.lock().push_front(frame_id);
    }

    fn size(&self) -> usize {
        self.inner.lock().len()
    }
}

impl std::fmt::Debug for LruReplacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LruReplacer")
            .field("capacity", &self.capacity)
            .field("size", &self.size())
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
struct Node {
    frame_id: FrameId,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Doubly-linked list over an arena, plus a frame → slot index.
#[derive(Debug, Default)]
struct LruList {
    nodes: Vec<Node>,
    free_slots: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    index: HashMap<FrameId, usize>,
}

impl LruList {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            ..Self::default()
        }
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    /// Insert at the head. Frames already present keep their position.
    fn push_front(&mut self, frame_id: FrameId) {
        if self.index.contains_key(&frame_id) {
            return;
        }

        let node = Node {
            frame_id,
            prev: None,
            next: self.head,
        };
        let slot = match self.free_slots.pop() {
            Some(slot) => {
                self.nodes[slot] = node;
                slot
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };

        match self.head {
            Some(old_head) => self.nodes[old_head].prev = Some(slot),
            None => self.tail = Some(slot),
        }
        self.head = Some(slot);
        self.index.insert(frame_id, slot);
    }

    /// Remove a frame wherever it sits. Returns false if it was not tracked.
    fn remove(&mut self, frame_id: FrameId) -> bool {
        match self.index.remove(&frame_id) {
            Some(slot) => {
                self.unlink(slot);
                true
            }
            None => false,
        }
    }

    /// Remove and return the tail (least recently unpinned).
    fn pop_back(&mut self) -> Option<FrameId> {
        let slot = self.tail?;
        let frame_id = self.nodes[slot].frame_id;
        self.index.remove(&frame_id);
        self.unlink(slot);
        Some(frame_id)
    }

    fn unlink(&mut self, slot: usize) {
        let Node { prev, next, .. } = self.nodes[slot];

        match prev {
            Some(prev) => self.nodes[prev].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.nodes[next].prev = prev,
            None => self.tail = prev,
        }

        self.free_slots.push(slot);
    }

    /// Frames from head (most recent) to tail (next victim).
    #[cfg(test)]
    fn order(&self) -> Vec<FrameId> {
        let mut out = Vec::with_capacity(self.len());
        let mut cursor = self.head;
        while let Some(slot) = cursor {
            out.push(self.nodes[slot].frame_id);
            cursor = self.nodes[slot].next;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fids(ids: &[usize]) -> Vec<FrameId> {
        ids.iter().copied().map(FrameId::new).collect()
    }

    #[test]
    fn test_lru_basic() {
        let replacer = LruReplacer::new(3);

        assert_eq!(replacer.size(), 0);
        assert_eq!(replacer.victim(), None);

        replacer.unpin(FrameId::new(1));
        replacer.unpin(FrameId::new(2));
        replacer.unpin(FrameId::new(3));
        assert_eq!(replacer.size(), 3);

        // First unpinned is first evicted
        assert_eq!(replacer.victim(), Some(FrameId::new(1)));
        assert_eq!(replacer.victim(), Some(FrameId::new(2)));
        assert_eq!(replacer.victim(), Some(FrameId::new(3)));
        assert_eq!(replacer.victim(), None);
        assert_eq!(replacer.size(), 0);
    }

    #[test]
    fn test_lru_pin_removes_from_middle() {
        let replacer = LruReplacer::new(3);
        for id in 1..=3 {
            replacer.unpin(FrameId::new(id));
        }

        replacer.pin(FrameId::new(2));
        assert_eq!(replacer.size(), 2);
        assert_eq!(replacer.inner.lock().order(), fids(&[3, 1]));

        assert_eq!(replacer.victim(), Some(FrameId::new(1)));
        assert_eq!(replacer.victim(), Some(FrameId::new(3)));
        assert_eq!(replacer.victim(), None);
    }

    #[test]
    fn test_lru_pin_head_and_tail() {
        let replacer = LruReplacer::new(4);
        for id in 0..4 {
            replacer.unpin(FrameId::new(id));
        }

        replacer.pin(FrameId::new(3)); // head
        replacer.pin(FrameId::new(0)); // tail
        assert_eq!(replacer.inner.lock().order(), fids(&[2, 1]));

        replacer.pin(FrameId::new(1));
        replacer.pin(FrameId::new(2));
        assert_eq!(replacer.size(), 0);
        assert_eq!(replacer.victim(), None);
    }

    #[test]
    fn test_lru_pin_then_unpin_moves_to_head() {
        let replacer = LruReplacer::new(3);
        for id in 1..=3 {
            replacer.unpin(FrameId::new(id));
        }

        replacer.pin(FrameId::new(1));
        replacer.unpin(FrameId::new(1));

        assert_eq!(replacer.inner.lock().order(), fids(&[1, 3, 2]));
        assert_eq!(replacer.victim(), Some(FrameId::new(2)));
    }

    #[test]
    fn test_lru_duplicate_unpin_keeps_position() {
        let replacer = LruReplacer::new(3);
        replacer.unpin(FrameId::new(1));
        replacer.unpin(FrameId::new(2));

        replacer.unpin(FrameId::new(1));

        assert_eq!(replacer.size(), 2);
        assert_eq!(replacer.victim(), Some(FrameId::new(1)));
    }

    #[test]
    fn test_lru_pin_unknown_is_noop() {
        let replacer = LruReplacer::new(2);
        replacer.pin(FrameId::new(999));
        assert_eq!(replacer.size(), 0);

        replacer.unpin(FrameId::new(1));
        replacer.pin(FrameId::new(999));
        assert_eq!(replacer.size(), 1);
    }

    #[test]
    fn test_lru_slots_are_recycled() {
        let replacer = LruReplacer::new(2);

        for round in 0..100 {
            replacer.unpin(FrameId::new(round % 2));
            replacer.unpin(FrameId::new(2 + round % 2));
            replacer.victim();
            replacer.victim();
        }

        let inner = replacer.inner.lock();
        assert!(inner.nodes.len() <= 2);
        assert_eq!(inner.len(), 0);
    }

    #[test]
    fn test_lru_capacity() {
        let replacer = LruReplacer::new(16);
        assert_eq!(replacer.capacity(), 16);
        assert_eq!(replacer.size(), 0);
    }

    #[test]
    fn test_lru_as_trait_object() {
        let replacer: Box<dyn Replacer> = Box::new(LruReplacer::new(2));
        replacer.unpin(FrameId::new(4));
        assert_eq!(replacer.victim(), Some(FrameId::new(4)));
    }

    #[test]
    fn test_lru_concurrent_unpin_victim() {
        use std::collections::HashSet;
        use std::sync::Arc;
        use std::thread;

        let replacer = Arc::new(LruReplacer::new(1000));
        for id in 0..1000 {
            replacer.unpin(FrameId::new(id));
        }

        let mut handles = vec![];
        for _ in 0..8 {
            let replacer = Arc::clone(&replacer);
            handles.push(thread::spawn(move || {
                let mut won = vec![];
                while let Some(frame_id) = replacer.victim() {
                    won.push(frame_id);
                }
                won
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            for frame_id in handle.join().unwrap() {
                assert!(seen.insert(frame_id), "{} handed out twice", frame_id);
            }
        }
        assert_eq!(seen.len(), 1000);
        assert_eq!(replacer.size(), 0);
    }
}
