//! Advisory lock guarding the shared working and compiled artifacts.
//!
//! Two drivers started in the same directory would overwrite each other's
//! `temp.epsilon` and `program.evm`. The lock file sits next to the working
//! artifact, is held for a whole run, and is removed and released when the
//! guard drops.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LockError {
    #[error("cannot open lock file '{}': {source}", .path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("another pipeline run holds '{}'", .path.display())]
    Busy { path: PathBuf },
}

/// Lock file guarding a working artifact (`temp.epsilon` -> `temp.epsilon.lock`)
pub fn lock_path_for(working: &Path) -> PathBuf {
    let mut path = working.as_os_str().to_owned();
    path.push(".lock");
    PathBuf::from(path)
}

/// Held for the duration of one pipeline run
#[derive(Debug)]
pub struct PipelineLock {
    // Unlocked on drop
    _file: File,
    path: PathBuf,
}

impl PipelineLock {
    /// Take the lock without waiting
    pub fn acquire(path: &Path) -> Result<Self, LockError> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)
            .map_err(|source| LockError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        let busy = || LockError::Busy {
            path: path.to_path_buf(),
        };
        file.try_lock_exclusive().map_err(|_| busy())?;

        // The previous holder may have unlinked the file between our open and lock
        if !is_same_file(&file, path) {
            return Err(busy());
        }

        Ok(Self {
            _file: file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PipelineLock {
    fn drop(&mut self) {
        // Still locked here; the handle closes after this returns
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(unix)]
fn is_same_file(file: &File, path: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (file.metadata(), std::fs::metadata(path)) {
        (Ok(held), Ok(current)) => held.dev() == current.dev() && held.ino() == current.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn is_same_file(_file: &File, path: &Path) -> bool {
    path.exists()
}
