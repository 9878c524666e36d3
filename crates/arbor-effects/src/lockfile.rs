//! Advisory whole-file locks shared by the file-backed handlers
//!
//! `flock(LOCK_EX)` serializes every holder of the same lock file, whether it
//! lives in another thread with its own descriptor or in another process.
//! Dropping the guard closes the descriptor, which releases the lock.

use nix::errno::Errno;
use nix::fcntl::{flock, FlockArg};
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

/// Exclusive lock held until dropped
#[derive(Debug)]
pub(crate) struct FileLock {
    _file: File,
}

/// Block until the exclusive lock on `path` is held, creating the file if needed.
///
/// Lock files are never removed; unlinking one while another holder waits on
/// it would let a third party lock a fresh inode.
pub(crate) fn lock_exclusive(path: &Path) -> io::Result<FileLock> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)?;
    loop {
        match flock(file.as_raw_fd(), FlockArg::LockExclusive) {
            Ok(()) => return Ok(FileLock { _file: file }),
            Err(Errno::EINTR) => continue,
            Err(errno) => return Err(io::Error::from(errno)),
        }
    }
}

/// [`lock_exclusive`] on the blocking pool
pub(crate) async fn lock_exclusive_async(path: &Path) -> io::Result<FileLock> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || lock_exclusive(&path))
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
}

/// `path` with `suffix` appended to its file name.
pub(crate) fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("arbor"));
    name.push(suffix);
    path.with_file_name(name)
}

/// Unique scratch path next to `path` for write-then-rename updates.
pub(crate) fn temp_sibling(path: &Path) -> PathBuf {
    sibling(path, &format!(".{}.tmp", uuid::Uuid::new_v4().simple()))
}
