// src/fs/mod.rs

//! Minimal filesystem interface used by executable discovery.
//!
//! Discovery only needs two things from the filesystem: what the root path
//! is, and what sits directly inside it (with permission bits). Keeping that
//! behind a trait lets tests describe directory listings exactly, including
//! their order and failures that are hard to provoke on a real disk.

use std::fmt::Debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub mod mock;

/// What discovery needs to know about a filesystem object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryMeta {
    pub is_dir: bool,
    /// Permission bits (`0o777` mask applied).
    pub mode: u32,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    /// Full path (`dir.join(name)`).
    pub path: PathBuf,
    pub meta: EntryMeta,
}

/// Abstract filesystem interface.
pub trait FileSystem: Send + Sync + Debug {
    /// Stat `path`, following symlinks.
    fn metadata(&self, path: &Path) -> io::Result<EntryMeta>;

    /// Return the entries of a directory in listing order.
    ///
    /// Entry metadata does not follow symlinks.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntryInfo>>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn metadata(&self, path: &Path) -> io::Result<EntryMeta> {
        let meta = fs::metadata(path)?;
        Ok(entry_meta(&meta))
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntryInfo>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let meta = entry.metadata()?;
            entries.push(DirEntryInfo {
                path: entry.path(),
                meta: entry_meta(&meta),
            });
        }
        Ok(entries)
    }
}

fn entry_meta(meta: &fs::Metadata) -> EntryMeta {
    EntryMeta {
        is_dir: meta.is_dir(),
        mode: permission_bits(meta),
    }
}

#[cfg(unix)]
fn permission_bits(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o777
}

// No execute bits to read here; only the read-only flag is meaningful.
#[cfg(not(unix))]
fn permission_bits(meta: &fs::Metadata) -> u32 {
    if meta.permissions().readonly() {
        0o555
    } else {
        0o777
    }
}
