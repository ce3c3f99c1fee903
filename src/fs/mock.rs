// src/fs/mock.rs

use super::{DirEntryInfo, EntryMeta, FileSystem};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File { mode: u32 },
    Dir { mode: u32, children: Vec<String> }, // child names, in listing order
}

impl MockEntry {
    fn meta(&self) -> EntryMeta {
        match self {
            MockEntry::File { mode } => EntryMeta {
                is_dir: false,
                mode: *mode,
            },
            MockEntry::Dir { mode, .. } => EntryMeta {
                is_dir: true,
                mode: *mode,
            },
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    entries: HashMap<PathBuf, MockEntry>,
    read_failures: HashMap<PathBuf, io::ErrorKind>,
}

/// In-memory filesystem. Directory listings come back in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>, mode: u32) {
        self.insert(path.as_ref(), MockEntry::File { mode });
    }

    /// Add a directory. Re-adding an existing directory only updates its mode.
    pub fn add_dir(&self, path: impl AsRef<Path>, mode: u32) {
        let path = path.as_ref();
        let mut state = self.state.lock().unwrap();
        if let Some(MockEntry::Dir { mode: existing, .. }) = state.entries.get_mut(path) {
            *existing = mode;
            return;
        }
        drop(state);
        self.insert(
            path,
            MockEntry::Dir {
                mode,
                children: Vec::new(),
            },
        );
    }

    /// Make `read_dir` on `path` fail with the given error kind.
    pub fn fail_read_dir(&self, path: impl AsRef<Path>, kind: io::ErrorKind) {
        let mut state = self.state.lock().unwrap();
        state
            .read_failures
            .insert(path.as_ref().to_path_buf(), kind);
    }

    fn insert(&self, path: &Path, entry: MockEntry) {
        let mut state = self.state.lock().unwrap();
        state.entries.insert(path.to_path_buf(), entry);

        let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
            return;
        };
        let name = name.to_string_lossy().into_owned();

        // Parents exist implicitly.
        let parent_entry = state
            .entries
            .entry(parent.to_path_buf())
            .or_insert_with(|| MockEntry::Dir {
                mode: 0o755,
                children: Vec::new(),
            });
        if let MockEntry::Dir { children, .. } = parent_entry {
            if !children.contains(&name) {
                children.push(name);
            }
        }
    }
}

impl FileSystem for MockFileSystem {
    fn metadata(&self, path: &Path) -> io::Result<EntryMeta> {
        let state = self.state.lock().unwrap();
        state
            .entries
            .get(path)
            .map(MockEntry::meta)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{path:?} not found")))
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntryInfo>> {
        let state = self.state.lock().unwrap();
        if let Some(kind) = state.read_failures.get(path) {
            return Err(io::Error::new(*kind, format!("reading {path:?} failed")));
        }

        match state.entries.get(path) {
            Some(MockEntry::Dir { children, .. }) => Ok(children
                .iter()
                .filter_map(|name| {
                    let child = path.join(name);
                    state.entries.get(&child).map(|entry| DirEntryInfo {
                        path: child.clone(),
                        meta: entry.meta(),
                    })
                })
                .collect()),
            Some(MockEntry::File { .. }) => Err(io::Error::other(format!("{path:?} is not a directory"))),
            None => Err(io::Error::new(io::ErrorKind::NotFound, format!("{path:?} not found"))),
        }
    }
}
