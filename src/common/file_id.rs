//! File handle type.

use std::fmt;

/// Handle of a data file opened through the disk manager.
///
/// Handles are small integers in `0..max_open_files`, handed out lowest-free
/// first. A handle freed by `close_file` may be reused by a later
/// `open_file`, so callers must not cache handles across close/open cycles
/// or process restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub u32);

impl FileId {
    /// Create a new FileId.
    #[inline]
    pub fn new(id: u32) -> Self {
        FileId(id)
    }

    /// The handle as a slot index.
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "File({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_id_display() {
        assert_eq!(format!("{}", FileId::new(7)), "File(7)");
    }

    #[test]
    fn test_file_id_index() {
        assert_eq!(FileId::new(12).index(), 12);
    }
}
