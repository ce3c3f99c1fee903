// src/discovery/mod.rs

//! Executable discovery.
//!
//! Scans one directory (no recursion) and keeps every entry whose permission
//! bits carry at least one execute bit. Directories are not special-cased:
//! a subdirectory with an execute bit ends up in the set and simply fails to
//! spawn later on.
//!
//! - [`executable_set`] holds the immutable, index-addressed result.

pub mod executable_set;

use std::io;
use std::path::Path;

use tracing::{debug, trace};

use crate::errors::{KeepaliveError, Result};
use crate::fs::{FileSystem, RealFileSystem};

pub use executable_set::ExecutableSet;

/// Owner, group and other execute bits.
pub const EXECUTE_MASK: u32 = 0o111;

/// Whether permission bits mark an entry as executable.
pub fn is_executable_mode(mode: u32) -> bool {
    mode & EXECUTE_MASK != 0
}

/// Discover executables in `dir` on the real filesystem.
pub fn discover_executables(dir: impl AsRef<Path>) -> Result<ExecutableSet> {
    discover_with(&RealFileSystem, dir.as_ref())
}

/// Discover executables in `dir` using the given filesystem.
///
/// Returned paths are `dir.join(name)` in directory listing order.
pub fn discover_with(fs: &dyn FileSystem, dir: &Path) -> Result<ExecutableSet> {
    let meta = fs.metadata(dir).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => KeepaliveError::NotADirectory(dir.to_path_buf()),
        _ => KeepaliveError::discovery_io(dir, e),
    })?;

    if !meta.is_dir {
        return Err(KeepaliveError::NotADirectory(dir.to_path_buf()));
    }

    let entries = fs
        .read_dir(dir)
        .map_err(|e| KeepaliveError::discovery_io(dir, e))?;

    let mut paths = Vec::with_capacity(entries.len());
    for entry in entries {
        if is_executable_mode(entry.meta.mode) {
            paths.push(entry.path);
        } else {
            let mode = format!("{:o}", entry.meta.mode);
            trace!(path = ?entry.path, mode = %mode, "skipping non-executable entry");
        }
    }

    debug!(dir = ?dir, count = paths.len(), "discovered executables");
    Ok(ExecutableSet::new(paths))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use std::path::PathBuf;

    fn bin_dir() -> MockFileSystem {
        let fs = MockFileSystem::new();
        fs.add_dir("/srv/bin", 0o755);
        fs
    }

    #[test]
    fn execute_bit_for_anyone_counts() {
        assert!(is_executable_mode(0o100));
        assert!(is_executable_mode(0o010));
        assert!(is_executable_mode(0o001));
        assert!(is_executable_mode(0o755));
        assert!(!is_executable_mode(0o644));
        assert!(!is_executable_mode(0o000));
        assert!(!is_executable_mode(0o666));
    }

    #[test]
    fn keeps_only_executable_entries_in_listing_order() {
        let fs = bin_dir();
        fs.add_file("/srv/bin/zeta", 0o755);
        fs.add_file("/srv/bin/readme.txt", 0o644);
        fs.add_file("/srv/bin/alpha", 0o700);
        fs.add_file("/srv/bin/other-only", 0o601);

        let set = discover_with(&fs, Path::new("/srv/bin")).unwrap();

        assert_eq!(
            set.as_slice(),
            &[
                PathBuf::from("/srv/bin/zeta"),
                PathBuf::from("/srv/bin/alpha"),
                PathBuf::from("/srv/bin/other-only"),
            ]
        );
    }

    #[test]
    fn subdirectories_pass_through_the_same_predicate() {
        let fs = bin_dir();
        fs.add_dir("/srv/bin/nested", 0o755);
        fs.add_dir("/srv/bin/locked", 0o600);
        fs.add_file("/srv/bin/nested/inner", 0o755);

        let set = discover_with(&fs, Path::new("/srv/bin")).unwrap();

        // No recursion, and the executable-looking directory is kept.
        assert_eq!(set.as_slice(), &[PathBuf::from("/srv/bin/nested")]);
    }

    #[test]
    fn empty_directory_yields_empty_set() {
        let fs = bin_dir();
        let set = discover_with(&fs, Path::new("/srv/bin")).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn file_path_is_not_a_directory() {
        let fs = bin_dir();
        fs.add_file("/srv/bin/tool", 0o755);

        match discover_with(&fs, Path::new("/srv/bin/tool")) {
            Err(KeepaliveError::NotADirectory(p)) => assert_eq!(p, PathBuf::from("/srv/bin/tool")),
            other => panic!("expected NotADirectory, got {other:?}"),
        }
    }

    #[test]
    fn missing_path_is_not_a_directory() {
        let fs = bin_dir();
        let result = discover_with(&fs, Path::new("/srv/nope"));
        assert!(matches!(result, Err(KeepaliveError::NotADirectory(_))));
    }

    #[test]
    fn unreadable_directory_is_an_io_error() {
        let fs = bin_dir();
        fs.add_file("/srv/bin/tool", 0o755);
        fs.fail_read_dir("/srv/bin", io::ErrorKind::PermissionDenied);

        match discover_with(&fs, Path::new("/srv/bin")) {
            Err(KeepaliveError::DiscoveryIo { path, source }) => {
                assert_eq!(path, PathBuf::from("/srv/bin"));
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
            }
            other => panic!("expected DiscoveryIo, got {other:?}"),
        }
    }
}
