//! Membership checks against the caller's saved library.
//!
//! The resolver only needs to know which merge keys the caller already
//! holds. Storage itself lives outside this crate.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use crate::models::MergeKey;

/// Source of the merge keys of already-saved books
pub trait LibraryStore: Send + Sync {
    /// Merge keys (as strings) of every saved book
    fn existing_merge_keys(&self) -> HashSet<String>;
}

impl LibraryStore for HashSet<String> {
    fn existing_merge_keys(&self) -> HashSet<String> {
        self.clone()
    }
}

/// Errors reading a library file
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct SavedBook {
    title: String,
    #[serde(default)]
    author: String,
}

/// A library exported as a JSON array of `{ "title", "author" }` records
#[derive(Debug, Clone, Default)]
pub struct JsonLibrary {
    keys: HashSet<String>,
}

impl JsonLibrary {
    /// Read a library file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LibraryError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse library JSON
    pub fn from_json(json: &str) -> Result<Self, LibraryError> {
        let saved: Vec<SavedBook> = serde_json::from_str(json)?;
        let keys = saved
            .iter()
            .map(|b| MergeKey::new(&b.title, &b.author).into_string())
            .collect();
        Ok(Self { keys })
    }

    /// Number of distinct saved books
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl LibraryStore for JsonLibrary {
    fn existing_merge_keys(&self) -> HashSet<String> {
        self.keys.clone()
    }
}
