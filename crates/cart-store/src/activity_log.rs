//! Append-only activity log, persisted as one JSON document:
//!
//! ```text
//! { "activities": [...], "version": "1.0", "created": "<timestamp>" }
//! ```
//!
//! The file is created on first append. Appends lock a sidecar
//! `<log>.lock`, read the document, push the entry and rename a fully
//! written temp file over the old one, so concurrent runs never lose an
//! entry and readers never see a half-written document.

use std::cell::RefCell;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use cart_core::{ActivityLogDocument, ActivityLogEntry, ActivitySink};
use tempfile::NamedTempFile;

use crate::error::{Result, StoreError};

const LOCK_ATTEMPTS: u32 = 250;
const LOCK_RETRY: Duration = Duration::from_millis(20);

enum Backend {
    File(PathBuf),
    Memory(RefCell<Option<String>>),
}

pub struct ActivityLog {
    backend: Backend,
}

impl ActivityLog {
    /// File-backed log at `path`. Nothing is touched until the first append.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: Backend::File(path.into()),
        }
    }

    pub fn open_in_memory() -> Self {
        Self {
            backend: Backend::Memory(RefCell::new(None)),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.backend {
            Backend::File(path) => Some(path),
            Backend::Memory(_) => None,
        }
    }

    /// Read the current document. An absent log is an empty document; a
    /// malformed one is an error.
    pub fn load(&self) -> Result<ActivityLogDocument> {
        match self.read_raw()? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(ActivityLogDocument::new()),
        }
    }

    fn read_raw(&self) -> Result<Option<String>> {
        match &self.backend {
            Backend::File(path) => match fs::read_to_string(path) {
                Ok(raw) => Ok(Some(raw)),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e.into()),
            },
            Backend::Memory(cell) => Ok(cell.borrow().clone()),
        }
    }

    fn write_raw(&self, raw: String) -> Result<()> {
        match &self.backend {
            Backend::File(path) => write_atomic(path, &raw),
            Backend::Memory(cell) => {
                *cell.borrow_mut() = Some(raw);
                Ok(())
            }
        }
    }

    /// Document to append to: the existing one, or a fresh one when the log is
    /// absent or unreadable as JSON.
    fn load_for_append(&self) -> Result<ActivityLogDocument> {
        let Some(raw) = self.read_raw()? else {
            return Ok(ActivityLogDocument::new());
        };
        match serde_json::from_str(&raw) {
            Ok(doc) => Ok(doc),
            Err(e) => {
                tracing::warn!("activity log is malformed ({e}), starting a new document");
                Ok(ActivityLogDocument::new())
            }
        }
    }

    fn append_unlocked(&self, entry: ActivityLogEntry) -> Result<()> {
        let mut doc = self.load_for_append()?;
        doc.activities.push(entry);
        let raw = serde_json::to_string_pretty(&doc)?;
        self.write_raw(raw)
    }
}

impl ActivitySink for ActivityLog {
    type Error = StoreError;

    fn append(&self, entry: ActivityLogEntry) -> Result<()> {
        match &self.backend {
            Backend::File(path) => {
                ensure_parent(path)?;
                let _lock = LogLock::acquire(path)?;
                self.append_unlocked(entry)?;
                tracing::info!("activity logged to {}", path.display());
                Ok(())
            }
            Backend::Memory(_) => self.append_unlocked(entry),
        }
    }
}

fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

fn ensure_parent(path: &Path) -> Result<()> {
    fs::create_dir_all(parent_dir(path))?;
    Ok(())
}

/// Write to a temp file beside `path`, then rename it into place.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let mut tmp = NamedTempFile::new_in(parent_dir(path))?;
    tmp.write_all(contents.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Advisory sidecar lock
// ---------------------------------------------------------------------------

fn lock_path_for(log: &Path) -> PathBuf {
    let mut name = log
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".lock");
    log.with_file_name(name)
}

/// Exclusive hold on a log, released when dropped.
///
/// On unix this is an `flock` on the sidecar file. The kernel drops it with
/// the holder's descriptors, so a crashed writer never leaves the log locked
/// and the sidecar itself is never removed. The holder's pid is written into
/// it for operators.
#[cfg(unix)]
struct LogLock {
    _file: fs::File,
}

#[cfg(unix)]
impl LogLock {
    fn acquire(log: &Path) -> Result<Self> {
        use std::fs::OpenOptions;
        use std::os::fd::AsRawFd;

        let path = lock_path_for(log);
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        for _ in 0..LOCK_ATTEMPTS {
            // SAFETY: the descriptor stays open for the duration of the call
            let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
            if rc == 0 {
                file.set_len(0)?;
                write!(file, "{}", std::process::id())?;
                return Ok(Self { _file: file });
            }
            let err = std::io::Error::last_os_error();
            match err.kind() {
                ErrorKind::WouldBlock | ErrorKind::Interrupted => thread::sleep(LOCK_RETRY),
                _ => return Err(err.into()),
            }
        }
        Err(StoreError::Locked(path))
    }
}

/// Exclusive hold on a log, released when dropped.
///
/// Without `flock` the lock is the sidecar's existence. It only ever appears
/// with the holder's pid already in it, and one untouched for longer than
/// [`STALE_AFTER`] is moved aside under a unique name before removal, so two
/// contenders never both reclaim the same file.
#[cfg(not(unix))]
struct LogLock {
    path: PathBuf,
}

#[cfg(not(unix))]
const STALE_AFTER: Duration = Duration::from_secs(30);

#[cfg(not(unix))]
impl LogLock {
    fn acquire(log: &Path) -> Result<Self> {
        let path = lock_path_for(log);
        let mut tmp = NamedTempFile::new_in(parent_dir(log))?;
        write!(tmp, "{}", std::process::id())?;
        tmp.as_file().sync_all()?;

        for attempt in 0..LOCK_ATTEMPTS {
            match tmp.persist_noclobber(&path) {
                Ok(_) => return Ok(Self { path }),
                Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
                    tmp = e.file;
                    if lock_is_abandoned(&path) {
                        reclaim(&path, attempt);
                        continue;
                    }
                    thread::sleep(LOCK_RETRY);
                }
                Err(e) => return Err(StoreError::Io(e.error)),
            }
        }
        Err(StoreError::Locked(path))
    }
}

#[cfg(not(unix))]
impl Drop for LogLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

#[cfg(not(unix))]
fn lock_is_abandoned(lock: &Path) -> bool {
    fs::metadata(lock)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.elapsed().ok())
        .is_some_and(|age| age > STALE_AFTER)
}

#[cfg(not(unix))]
fn reclaim(lock: &Path, attempt: u32) {
    let mut name = lock.as_os_str().to_os_string();
    name.push(format!(".stale-{}-{attempt}", std::process::id()));
    let grave = PathBuf::from(name);
    // losing the rename means another writer already moved it
    if fs::rename(lock, &grave).is_ok() {
        if lock_is_abandoned(&grave) {
            tracing::info!("reclaimed stale lock {}", lock.display());
            let _ = fs::remove_file(&grave);
        } else {
            // a fresh lock slipped in between the check and the rename
            let _ = fs::hard_link(&grave, lock);
            let _ = fs::remove_file(&grave);
        }
    }
}
