//! File tagging
//!
//! Outcomes are recorded as tags modeled on macOS Finder labels: (name,
//! color) pairs attached to a path. Storage sits behind the [`TagStore`]
//! trait so the backend can vary; the default store persists tags in a JSON
//! sidecar next to the tagged path, and an in-memory store backs tests.
//! Outcome vocabularies are explicit structs handed to each operation rather
//! than process-wide tables.

mod sidecar;

pub use sidecar::SidecarStore;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::utils::error::{Result, TidyError};

/// Finder tag color vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagColor {
    None,
    Gray,
    Green,
    Purple,
    Blue,
    Yellow,
    Red,
    Orange,
}

/// A (name, color) label attached to a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub color: TagColor,
}

impl Tag {
    pub fn new(name: &str, color: TagColor) -> Self {
        Self {
            name: name.to_string(),
            color,
        }
    }
}

/// Storage backend for per-file tags
pub trait TagStore {
    fn all(&self, path: &Path) -> Result<Vec<Tag>>;
    fn add(&self, tag: &Tag, path: &Path) -> Result<()>;
    fn remove(&self, tag: &Tag, path: &Path) -> Result<()>;

    /// Keep tags attached when their file is renamed
    fn relocate(&self, from: &Path, to: &Path) -> Result<()>;

    /// Drop all tags for a path whose file no longer exists
    fn forget(&self, path: &Path) -> Result<()>;
}

/// Remove every tag of `vocabulary` currently attached to `path`
///
/// Clearing before re-deriving is what keeps at most one terminal tag per
/// vocabulary on a file across repeated runs.
pub fn clear_tags(store: &dyn TagStore, vocabulary: &[&Tag], path: &Path) -> Result<()> {
    for tag in store.all(path)? {
        if vocabulary.iter().any(|v| **v == tag) {
            store.remove(&tag, path)?;
        }
    }
    Ok(())
}

/// Terminal tags of the normalization pipeline
#[derive(Debug, Clone)]
pub struct ProcessTags {
    pub valid: Tag,
    pub corrupt: Tag,
    pub collision: Tag,
    pub repack_failed: Tag,
    pub cleanup_failed: Tag,
}

impl ProcessTags {
    pub fn vocabulary(&self) -> Vec<&Tag> {
        vec![
            &self.valid,
            &self.corrupt,
            &self.collision,
            &self.repack_failed,
            &self.cleanup_failed,
        ]
    }
}

impl Default for ProcessTags {
    fn default() -> Self {
        Self {
            valid: Tag::new("Valid Comic", TagColor::Green),
            corrupt: Tag::new("Corrupt Comic", TagColor::Red),
            collision: Tag::new("Collision", TagColor::Yellow),
            repack_failed: Tag::new("Failed Repack", TagColor::Red),
            cleanup_failed: Tag::new("Failed Cleanup", TagColor::Red),
        }
    }
}

/// Terminal tags of the create-from-folder operation
#[derive(Debug, Clone)]
pub struct CreateTags {
    pub valid: Tag,
    pub corrupt: Tag,
    pub collision: Tag,
    pub create_failed: Tag,
    pub cleanup_failed: Tag,
}

impl CreateTags {
    pub fn vocabulary(&self) -> Vec<&Tag> {
        vec![
            &self.valid,
            &self.corrupt,
            &self.collision,
            &self.create_failed,
            &self.cleanup_failed,
        ]
    }
}

impl Default for CreateTags {
    fn default() -> Self {
        Self {
            valid: Tag::new("Valid Comic", TagColor::Green),
            corrupt: Tag::new("Corrupt Comic", TagColor::Red),
            collision: Tag::new("Collision", TagColor::Yellow),
            create_failed: Tag::new("Failed Creation", TagColor::Red),
            cleanup_failed: Tag::new("Failed Cleanup", TagColor::Red),
        }
    }
}

/// In-memory tag store
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<HashMap<PathBuf, Vec<Tag>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_map<T>(&self, f: impl FnOnce(&mut HashMap<PathBuf, Vec<Tag>>) -> T) -> Result<T> {
        let mut map = self
            .inner
            .lock()
            .map_err(|_| TidyError::Tag("tag store mutex poisoned".to_string()))?;
        Ok(f(&mut map))
    }
}

impl TagStore for MemoryStore {
    fn all(&self, path: &Path) -> Result<Vec<Tag>> {
        self.with_map(|map| map.get(path).cloned().unwrap_or_default())
    }

    fn add(&self, tag: &Tag, path: &Path) -> Result<()> {
        self.with_map(|map| {
            let tags = map.entry(path.to_path_buf()).or_default();
            if !tags.contains(tag) {
                tags.push(tag.clone());
            }
        })
    }

    fn remove(&self, tag: &Tag, path: &Path) -> Result<()> {
        self.with_map(|map| {
            if let Some(tags) = map.get_mut(path) {
                tags.retain(|t| t != tag);
            }
        })
    }

    fn relocate(&self, from: &Path, to: &Path) -> Result<()> {
        self.with_map(|map| {
            if let Some(tags) = map.remove(from) {
                map.insert(to.to_path_buf(), tags);
            }
        })
    }

    fn forget(&self, path: &Path) -> Result<()> {
        self.with_map(|map| {
            map.remove(path);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_idempotent() {
        let store = MemoryStore::new();
        let tag = Tag::new("Valid Comic", TagColor::Green);
        let path = Path::new("/tmp/book.cbz");

        store.add(&tag, path).unwrap();
        store.add(&tag, path).unwrap();
        assert_eq!(store.all(path).unwrap(), vec![tag]);
    }

    #[test]
    fn test_clear_tags_only_touches_vocabulary() {
        let store = MemoryStore::new();
        let path = Path::new("/tmp/book.cbz");
        let tags = ProcessTags::default();
        let foreign = Tag::new("Favorite", TagColor::Blue);

        store.add(&tags.corrupt, path).unwrap();
        store.add(&foreign, path).unwrap();

        clear_tags(&store, &tags.vocabulary(), path).unwrap();
        assert_eq!(store.all(path).unwrap(), vec![foreign]);
    }

    #[test]
    fn test_relocate_moves_tags() {
        let store = MemoryStore::new();
        let tag = Tag::new("Valid Comic", TagColor::Green);
        let old = Path::new("/tmp/Book.CBZ");
        let new = Path::new("/tmp/Book.cbz");

        store.add(&tag, old).unwrap();
        store.relocate(old, new).unwrap();

        assert!(store.all(old).unwrap().is_empty());
        assert_eq!(store.all(new).unwrap(), vec![tag]);
    }
}
