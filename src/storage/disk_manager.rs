//! Disk Manager - page-addressed file I/O and the log channel.
//!
//! The [`DiskManager`] handles all direct file operations:
//! - Reading and writing pages of open data files
//! - Handing out page numbers per file
//! - Creating, opening, closing and destroying data files
//! - Appending to and reading back the log file

use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::common::config::DiskManagerConfig;
use crate::common::{Error, FileId, PageNo, Result};

/// Manages disk I/O for a set of data files and one log file.
///
/// # File Layout
/// Every data file is a plain sequence of pages with no header:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Page 0  │ Page 1  │ Page 2  │  ...    │ Page N  │
/// │ (4KB)   │ (4KB)   │ (4KB)   │         │ (4KB)   │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0      4096     8192    ...    N×4096
/// ```
///
/// # Handles
/// Open data files are tracked in a path ↔ [`FileId`] bijection. Each handle
/// slot also owns a page-number counter used by [`allocate_page`].
///
/// # Thread Safety
/// `DiskManager` is `Sync` and is meant to be shared through an `Arc`:
/// - the open-file table sits behind a `Mutex`, held only for bookkeeping
/// - page counters are atomics
/// - page I/O uses positioned reads/writes, so no lock is held during I/O and
///   callers never race on a shared file cursor
/// - the log file has its own `Mutex`
///
/// Serializing concurrent writers of the *same* page is the caller's job.
///
/// [`allocate_page`]: DiskManager::allocate_page
pub struct DiskManager {
    config: DiskManagerConfig,

    /// Open data files.
    files: Mutex<FileTable>,

    /// Next page number per handle slot.
    next_page_nos: Box<[AtomicU32]>,

    /// Log file, opened on first use.
    log: Mutex<Option<File>>,
}

#[derive(Default)]
struct FileTable {
    path_to_id: HashMap<PathBuf, FileId>,
    open: HashMap<FileId, OpenFile>,
}

struct OpenFile {
    path: PathBuf,
    file: Arc<File>,
}

impl FileTable {
    /// Lowest handle in `0..limit` not currently in use.
    fn free_id(&self, limit: usize) -> Result<FileId> {
        (0..limit)
            .map(|i| FileId::new(i as u32))
            .find(|id| !self.open.contains_key(id))
            .ok_or(Error::TooManyOpenFiles(limit))
    }

    /// Drop both directions of the mapping for `id`.
    fn remove(&mut self, id: FileId) -> Option<OpenFile> {
        let open = self.open.remove(&id)?;
        self.path_to_id.remove(&open.path);
        Some(open)
    }
}

impl DiskManager {
    /// Create a disk manager. No file is touched until it is asked for.
    pub fn new(config: DiskManagerConfig) -> Self {
        let slots = config.max_open_files.min(u32::MAX as usize);
        let next_page_nos = (0..slots).map(|_| AtomicU32::new(0)).collect();

        Self {
            config,
            files: Mutex::new(FileTable::default()),
            next_page_nos,
            log: Mutex::new(None),
        }
    }

    /// Settings this disk manager was built with.
    #[inline]
    pub fn config(&self) -> &DiskManagerConfig {
        &self.config
    }

    // ========================================================================
    // Page I/O
    // ========================================================================

    /// Write `buf` at the start of page `page_no` of `file`.
    ///
    /// The file grows as needed; pages skipped over read back as zeros on
    /// filesystems with sparse-file support.
    ///
    /// # Errors
    /// - `Error::FileNotOpen` if `file` is not open
    /// - `Error::ShortWrite` if fewer than `buf.len()` bytes were written.
    ///   The write is not retried.
    pub fn write_page(&self, file: FileId, page_no: PageNo, buf: &[u8]) -> Result<()> {
        let handle = self.handle(file)?;
        let written = write_at(&handle, buf, page_no.offset())?;

        if written != buf.len() {
            warn!(%file, %page_no, expected = buf.len(), written, "short page write");
            return Err(Error::ShortWrite {
                expected: buf.len(),
                actual: written,
            });
        }

        trace!(%file, %page_no, len = buf.len(), "wrote page");
        Ok(())
    }

    /// Fill `buf` from the start of page `page_no` of `file`.
    ///
    /// # Errors
    /// - `Error::FileNotOpen` if `file` is not open
    /// - `Error::ShortRead` if fewer than `buf.len()` bytes were available,
    ///   which includes reading past the end of the file
    pub fn read_page(&self, file: FileId, page_no: PageNo, buf: &mut [u8]) -> Result<()> {
        let handle = self.handle(file)?;
        let read = read_at(&handle, buf, page_no.offset())?;

        if read != buf.len() {
            warn!(%file, %page_no, expected = buf.len(), read, "short page read");
            return Err(Error::ShortRead {
                expected: buf.len(),
                actual: read,
            });
        }

        trace!(%file, %page_no, len = buf.len(), "read page");
        Ok(())
    }

    /// Hand out the next page number of `file`.
    ///
    /// Only the in-memory counter moves; the file itself is extended by the
    /// first `write_page` at that offset.
    ///
    /// # Errors
    /// - `Error::InvalidFileId` if `file` is outside the handle range
    /// - `Error::PageSpaceExhausted` once every page number below
    ///   `PageNo::INVALID` has been handed out. The counter never wraps.
    pub fn allocate_page(&self, file: FileId) -> Result<PageNo> {
        let next = self
            .counter(file)?
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
                (n != PageNo::INVALID.0).then(|| n + 1)
            })
            .map_err(|_| Error::PageSpaceExhausted(file))?;

        let page_no = PageNo::new(next);
        trace!(%file, %page_no, "allocated page");
        Ok(page_no)
    }

    /// Release a page number. Page numbers are never reused, so this does
    /// nothing.
    pub fn deallocate_page(&self, _page_no: PageNo) {}

    /// The page number the next `allocate_page(file)` will return.
    pub fn next_page_no(&self, file: FileId) -> Result<PageNo> {
        Ok(PageNo::new(self.counter(file)?.load(Ordering::Relaxed)))
    }

    /// Seed the page counter of `file`, e.g. with the page count of a file
    /// that was just reopened.
    ///
    /// # Errors
    /// Returns `Error::PageSpaceExhausted` for `PageNo::INVALID`, which is
    /// never a real page.
    pub fn set_next_page_no(&self, file: FileId, page_no: PageNo) -> Result<()> {
        let counter = self.counter(file)?;
        if !page_no.is_valid() {
            return Err(Error::PageSpaceExhausted(file));
        }
        counter.store(page_no.0, Ordering::Relaxed);
        Ok(())
    }

    // ========================================================================
    // File lifecycle
    // ========================================================================

    /// Create an empty data file. The file is not opened.
    ///
    /// # Errors
    /// Returns `Error::FileExists` if something already exists at `path`.
    pub fn create_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        set_mode(&mut options);

        match options.open(path) {
            Ok(_) => {
                debug!(path = %path.display(), "created file");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                Err(Error::FileExists(path.to_path_buf()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a data file.
    ///
    /// # Errors
    /// - `Error::FileNotClosed` if the file is still open
    /// - `Error::FileNotFound` if it could not be deleted
    pub fn destroy_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let files = self.files.lock();

        if files.path_to_id.contains_key(path) {
            return Err(Error::FileNotClosed(path.to_path_buf()));
        }

        if let Err(e) = fs::remove_file(path) {
            debug!(path = %path.display(), error = %e, "failed to remove file");
            return Err(Error::FileNotFound(path.to_path_buf()));
        }

        debug!(path = %path.display(), "destroyed file");
        Ok(())
    }

    /// Open a data file for reading and writing.
    ///
    /// Opening a file that is already open returns its existing handle. A
    /// fresh handle starts with its page counter at 0.
    ///
    /// # Errors
    /// - `Error::FileNotFound` if `path` is not a regular file
    /// - `Error::TooManyOpenFiles` if every handle slot is taken
    pub fn open_file<P: AsRef<Path>>(&self, path: P) -> Result<FileId> {
        let path = path.as_ref();
        if !self.is_file(path) {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }

        let mut files = self.files.lock();
        if let Some(&id) = files.path_to_id.get(path) {
            return Ok(id);
        }

        let id = files.free_id(self.next_page_nos.len())?;
        let file = open_data_file(path)?;

        self.next_page_nos[id.index()].store(0, Ordering::Relaxed);
        files.path_to_id.insert(path.to_path_buf(), id);
        files.open.insert(
            id,
            OpenFile {
                path: path.to_path_buf(),
                file: Arc::new(file),
            },
        );

        debug!(path = %path.display(), file = %id, "opened file");
        Ok(id)
    }

    /// Close a data file. Closing a handle that is not open does nothing.
    ///
    /// The handle and path are released at once. If another thread is still
    /// reading or writing through the handle, the OS file is closed when that
    /// I/O completes.
    pub fn close_file(&self, file: FileId) -> Result<()> {
        let Some(OpenFile { path, file: shared }) = self.files.lock().remove(file) else {
            return Ok(());
        };

        if Arc::strong_count(&shared) > 1 {
            debug!(path = %path.display(), %file, "closing file with I/O in flight");
        }
        drop(shared);

        debug!(path = %path.display(), %file, "closed file");
        Ok(())
    }

    /// Flush a data file's contents to durable storage.
    pub fn sync_file(&self, file: FileId) -> Result<()> {
        self.handle(file)?.sync_all()?;
        Ok(())
    }

    /// Size of the file at `path` in bytes, or `None` if it cannot be statted.
    pub fn get_file_size<P: AsRef<Path>>(&self, path: P) -> Option<u64> {
        fs::metadata(path).ok().map(|m| m.len())
    }

    /// Path of an open data file.
    ///
    /// # Errors
    /// Returns `Error::FileNotOpen` if `file` is not open.
    pub fn get_file_name(&self, file: FileId) -> Result<PathBuf> {
        self.files
            .lock()
            .open
            .get(&file)
            .map(|open| open.path.clone())
            .ok_or(Error::FileNotOpen(file))
    }

    /// Handle of the file at `path`, opening it if necessary.
    pub fn get_file_id<P: AsRef<Path>>(&self, path: P) -> Result<FileId> {
        let path = path.as_ref();
        if let Some(&id) = self.files.lock().path_to_id.get(path) {
            return Ok(id);
        }
        self.open_file(path)
    }

    /// Whether `path` is currently open.
    pub fn is_open<P: AsRef<Path>>(&self, path: P) -> bool {
        self.files.lock().path_to_id.contains_key(path.as_ref())
    }

    /// Number of open data files.
    pub fn open_file_count(&self) -> usize {
        self.files.lock().open.len()
    }

    /// Whether `path` exists and is a regular file.
    pub fn is_file<P: AsRef<Path>>(&self, path: P) -> bool {
        fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
    }

    /// Whether `path` exists and is a directory.
    pub fn is_dir<P: AsRef<Path>>(&self, path: P) -> bool {
        fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
    }

    /// Create a directory and any missing parents.
    pub fn create_dir<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::create_dir_all(path)?;
        debug!(path = %path.display(), "created directory");
        Ok(())
    }

    /// Remove a directory and everything below it.
    pub fn destroy_dir<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::remove_dir_all(path)?;
        debug!(path = %path.display(), "destroyed directory");
        Ok(())
    }

    // ========================================================================
    // Log channel
    // ========================================================================

    /// Append `buf` to the end of the log file.
    ///
    /// # Errors
    /// Returns `Error::ShortWrite` if fewer than `buf.len()` bytes were
    /// written.
    pub fn write_log(&self, buf: &[u8]) -> Result<()> {
        self.with_log(|log| {
            let offset = log.seek(SeekFrom::End(0))?;
            let written = log.write(buf)?;

            if written != buf.len() {
                warn!(offset, expected = buf.len(), written, "short log write");
                return Err(Error::ShortWrite {
                    expected: buf.len(),
                    actual: written,
                });
            }

            trace!(offset, len = buf.len(), "appended log");
            Ok(())
        })
    }

    /// Read log bytes starting at `offset` into `buf`.
    ///
    /// Returns `None` if `offset` lies beyond the end of the log. A request
    /// that runs past the end is cut short, so the returned count is
    /// `min(buf.len(), log_len - offset)`; it is 0 when `offset` is exactly
    /// the log length.
    pub fn read_log(&self, buf: &mut [u8], offset: u64) -> Result<Option<usize>> {
        self.with_log(|log| {
            let len = log.metadata()?.len();
            if offset > len {
                return Ok(None);
            }

            let want = buf
                .len()
                .min(usize::try_from(len - offset).unwrap_or(usize::MAX));
            if want == 0 {
                return Ok(Some(0));
            }

            log.seek(SeekFrom::Start(offset))?;
            let read = log.read(&mut buf[..want])?;

            if read != want {
                warn!(offset, expected = want, read, "short log read");
                return Err(Error::ShortRead {
                    expected: want,
                    actual: read,
                });
            }

            trace!(offset, len = read, "read log");
            Ok(Some(read))
        })
    }

    /// Flush the log file to durable storage. Does nothing if the log has
    /// not been opened yet.
    pub fn sync_log(&self) -> Result<()> {
        if let Some(log) = self.log.lock().as_ref() {
            log.sync_all()?;
        }
        Ok(())
    }

    /// Current length of the log file, 0 if it does not exist yet.
    pub fn log_size(&self) -> u64 {
        self.get_file_size(&self.config.log_path).unwrap_or(0)
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    /// Shared handle for I/O without holding the table lock.
    fn handle(&self, file: FileId) -> Result<Arc<File>> {
        self.files
            .lock()
            .open
            .get(&file)
            .map(|open| Arc::clone(&open.file))
            .ok_or(Error::FileNotOpen(file))
    }

    fn counter(&self, file: FileId) -> Result<&AtomicU32> {
        self.next_page_nos
            .get(file.index())
            .ok_or(Error::InvalidFileId(file))
    }

    /// Run `f` with the log file, opening it first if needed.
    fn with_log<T>(&self, f: impl FnOnce(&mut File) -> Result<T>) -> Result<T> {
        let mut guard = self.log.lock();
        let log = match guard.take() {
            Some(log) => log,
            None => self.open_log()?,
        };
        f(guard.insert(log))
    }

    fn open_log(&self) -> Result<File> {
        let path = &self.config.log_path;
        let mut options = OpenOptions::new();
        options.read(true).write(true).create(true);
        set_mode(&mut options);

        let log = options.open(path)?;
        debug!(path = %path.display(), "opened log file");
        Ok(log)
    }
}

impl Default for DiskManager {
    fn default() -> Self {
        Self::new(DiskManagerConfig::default())
    }
}

impl fmt::Debug for DiskManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiskManager")
            .field("config", &self.config)
            .field("open_files", &self.open_file_count())
            .field("log_open", &self.log.lock().is_some())
            .finish()
    }
}

/// Open a data file read/write. A file removed since the caller checked for
/// it is reported as `FileNotFound`, not as a raw I/O error.
fn open_data_file(path: &Path) -> Result<File> {
    match OpenOptions::new().read(true).write(true).open(path) {
        Ok(file) => Ok(file),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(Error::FileNotFound(path.to_path_buf()))
        }
        Err(e) => Err(e.into()),
    }
}

// ============================================================================
// Platform I/O
// ============================================================================

#[cfg(unix)]
fn set_mode(options: &mut OpenOptions) {
    use std::os::unix::fs::OpenOptionsExt;
    options.mode(0o644);
}

#[cfg(not(unix))]
fn set_mode(_options: &mut OpenOptions) {}

#[cfg(unix)]
fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::unix::fs::FileExt;
    file.read_at(buf, offset)
}

#[cfg(unix)]
fn write_at(file: &File, buf: &[u8], offset: u64) -> io::Result<usize> {
    use std::os::unix::fs::FileExt;
    file.write_at(buf, offset)
}

#[cfg(windows)]
fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::windows::fs::FileExt;
    file.seek_read(buf, offset)
}

#[cfg(windows)]
fn write_at(file: &File, buf: &[u8], offset: u64) -> io::Result<usize> {
    use std::os::windows::fs::FileExt;
    file.seek_write(buf, offset)
}
