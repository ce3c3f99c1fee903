// src/discovery/executable_set.rs

use std::ops::Index;
use std::path::{Path, PathBuf};

/// Ordered, immutable list of executable paths.
///
/// The position of a path is its identity for restart dispatch, so the set
/// has no API that could reorder or change it after construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutableSet {
    paths: Vec<PathBuf>,
}

impl ExecutableSet {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }

    pub fn as_slice(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl Index<usize> for ExecutableSet {
    type Output = Path;

    fn index(&self, index: usize) -> &Path {
        &self.paths[index]
    }
}
