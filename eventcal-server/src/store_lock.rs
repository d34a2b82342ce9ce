//! Exclusive ownership of a participation store file.
//!
//! The server keeps the whole store in memory and rewrites the snapshot on
//! every change, so two processes on the same `data_file` would overwrite
//! each other. The lock sits next to the store as `<data_file>.lock`.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use fs2::FileExt;

/// Held for the lifetime of the server; dropping it releases the store.
#[derive(Debug)]
pub struct StoreLock {
    path: PathBuf,
    _file: File,
}

impl StoreLock {
    pub fn path_for(data_path: &Path) -> PathBuf {
        let mut path = data_path.to_path_buf().into_os_string();
        path.push(".lock");
        PathBuf::from(path)
    }

    /// Lock the store at `data_path`, failing if another process holds it.
    pub fn acquire(data_path: &Path) -> Result<Self> {
        let path = Self::path_for(data_path);

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Could not create {}", dir.display()))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .with_context(|| format!("Could not open lock file {}", path.display()))?;

        if file.try_lock_exclusive().is_err() {
            bail!(
                "Store {} is already in use by another eventcal-server.\n\
                If no other server is running, remove: {}",
                data_path.display(),
                path.display()
            );
        }

        Ok(StoreLock { path, _file: file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
