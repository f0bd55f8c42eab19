//! Directory existence and emptiness oracle.

use std::io::ErrorKind;
use std::path::Path;

use serde::Serialize;

use crate::error::{PublisherError, Result};

/// State of a directory on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectoryState {
    Empty,
    NonEmpty,
    Missing,
}

/// Inspect `path`, reading at most one entry.
///
/// A missing path is a state, not an error. Anything else that prevents
/// reading the directory (permissions, `path` is a file) is an error.
/// Nothing is cached; the filesystem is the source of truth.
pub fn probe(path: &Path) -> Result<DirectoryState> {
    let mut entries = match std::fs::read_dir(path) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(DirectoryState::Missing),
        Err(e) => return Err(PublisherError::io(path, e)),
    };

    match entries.next() {
        None => Ok(DirectoryState::Empty),
        Some(Ok(_)) => Ok(DirectoryState::NonEmpty),
        Some(Err(e)) => Err(PublisherError::io(path, e)),
    }
}
