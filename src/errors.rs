// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeepaliveError {
    #[error("Provided path isn't a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Failed to read directory {path}: {source}")]
    DiscoveryIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Completion channel closed while supervising")]
    CompletionChannelClosed,
}

impl KeepaliveError {
    pub(crate) fn discovery_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        KeepaliveError::DiscoveryIo {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, KeepaliveError>;
