//! Page identifier types.

use std::fmt;

use crate::common::config::PAGE_SIZE;
use crate::common::FileId;

/// Logical page number within one file.
///
/// Page numbers are handed out per file by
/// [`DiskManager::allocate_page`](crate::storage::DiskManager::allocate_page),
/// starting at 0 and increasing by one per call.
///
/// # Example
/// ```
/// use pagestore::PageNo;
///
/// let page_no = PageNo::new(3);
/// assert!(page_no.is_valid());
/// assert_eq!(page_no.offset(), 3 * 4096);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageNo(pub u32);

impl PageNo {
    /// Invalid/sentinel page number.
    pub const INVALID: PageNo = PageNo(u32::MAX);

    /// Create a new PageNo.
    #[inline]
    pub fn new(page_no: u32) -> Self {
        PageNo(page_no)
    }

    /// Check if this page number is valid (not the sentinel value).
    #[inline]
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }

    /// Byte offset of this page in its file.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.0 as u64 * PAGE_SIZE as u64
    }
}

impl fmt::Display for PageNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "INVALID")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Identifies a page on disk: a file handle plus a page number in that file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId {
    pub file: FileId,
    pub page_no: PageNo,
}

impl PageId {
    /// Create a new PageId.
    #[inline]
    pub fn new(file: FileId, page_no: PageNo) -> Self {
        Self { file, page_no }
    }

    /// Byte offset of this page in its file.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.page_no.offset()
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Page({}:{})", self.file.0, self.page_no)
    }
}
