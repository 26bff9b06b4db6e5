//! Content store - a flat directory of `{identifier}.{extension}` documents

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::StoreError;

/// Read-only access to the content directory
#[derive(Debug, Clone)]
pub struct ContentStore {
    dir: PathBuf,
    extension: String,
}

impl ContentStore {
    /// Create a store over `dir`, recognizing files ending in `.{extension}`
    pub fn new<P: AsRef<Path>>(dir: P, extension: &str) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    /// Directory this store reads from
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document for an identifier
    pub fn path_for(&self, identifier: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", identifier, self.extension))
    }

    /// List the identifiers of every document in the store.
    ///
    /// Never fails: an unreadable directory yields an empty set and an error log.
    pub fn list_identifiers(&self) -> BTreeSet<String> {
        let mut identifiers = BTreeSet::new();

        for entry in WalkDir::new(&self.dir)
            .follow_links(true)
            .min_depth(1)
            .max_depth(1)
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::error!("Error reading content directory {:?}: {}", self.dir, e);
                    continue;
                }
            };

            if !entry.path().is_file() {
                continue;
            }

            if let Some(identifier) = self.identifier_of(entry.path()) {
                identifiers.insert(identifier);
            }
        }

        identifiers
    }

    /// Read the raw text of one document
    pub fn read_raw(&self, identifier: &str) -> Result<String, StoreError> {
        if !is_valid_identifier(identifier) {
            return Err(StoreError::NotFound(identifier.to_string()));
        }

        fs::read_to_string(self.path_for(identifier)).map_err(|source| match source.kind() {
            ErrorKind::NotFound => StoreError::NotFound(identifier.to_string()),
            _ => StoreError::Io {
                identifier: identifier.to_string(),
                source,
            },
        })
    }

    fn identifier_of(&self, path: &Path) -> Option<String> {
        let ext = path.extension().and_then(|e| e.to_str())?;
        if ext != self.extension {
            return None;
        }
        let stem = path.file_stem().and_then(|s| s.to_str())?;
        is_valid_identifier(stem).then(|| stem.to_string())
    }
}

/// Identifiers address documents in URLs, so they must be a single
/// non-hidden path segment
fn is_valid_identifier(identifier: &str) -> bool {
    !identifier.is_empty()
        && !identifier.starts_with('.')
        && !identifier.contains(['/', '\\'])
        && !identifier.chars().any(char::is_control)
}
