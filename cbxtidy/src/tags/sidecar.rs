//! JSON sidecar tag store
//!
//! Tags for `book.cbz` live in `book.cbz.tags` in the same directory, as a
//! JSON array of `{name, color}` objects. The sidecar is removed once its
//! last tag is, so a clean run leaves no residue next to healthy files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::tags::{Tag, TagStore};
use crate::utils::error::{Result, TidyError};

const SIDECAR_SUFFIX: &str = ".tags";

/// Tag store backed by per-file JSON sidecars
#[derive(Debug, Clone, Default)]
pub struct SidecarStore;

impl SidecarStore {
    pub fn new() -> Self {
        Self
    }

    fn sidecar_path(path: &Path) -> Result<PathBuf> {
        let name = path.file_name().ok_or_else(|| {
            TidyError::Tag(format!("path has no file name: {}", path.display()))
        })?;
        let mut sidecar = name.to_os_string();
        sidecar.push(SIDECAR_SUFFIX);
        Ok(path.with_file_name(sidecar))
    }

    fn load(sidecar: &Path) -> Result<Vec<Tag>> {
        match fs::read(sidecar) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                TidyError::Tag(format!("malformed sidecar {}: {}", sidecar.display(), e))
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(TidyError::Tag(format!(
                "failed to read sidecar {}: {}",
                sidecar.display(),
                e
            ))),
        }
    }

    fn save(sidecar: &Path, tags: &[Tag]) -> Result<()> {
        if tags.is_empty() {
            return match fs::remove_file(sidecar) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(TidyError::Tag(format!(
                    "failed to remove sidecar {}: {}",
                    sidecar.display(),
                    e
                ))),
            };
        }

        let bytes = serde_json::to_vec_pretty(tags)
            .map_err(|e| TidyError::Tag(format!("failed to encode tags: {}", e)))?;
        fs::write(sidecar, bytes).map_err(|e| {
            TidyError::Tag(format!("failed to write sidecar {}: {}", sidecar.display(), e))
        })
    }
}

impl TagStore for SidecarStore {
    fn all(&self, path: &Path) -> Result<Vec<Tag>> {
        Self::load(&Self::sidecar_path(path)?)
    }

    fn add(&self, tag: &Tag, path: &Path) -> Result<()> {
        let sidecar = Self::sidecar_path(path)?;
        let mut tags = Self::load(&sidecar)?;
        if !tags.contains(tag) {
            tags.push(tag.clone());
        }
        Self::save(&sidecar, &tags)
    }

    fn remove(&self, tag: &Tag, path: &Path) -> Result<()> {
        let sidecar = Self::sidecar_path(path)?;
        let mut tags = Self::load(&sidecar)?;
        tags.retain(|t| t != tag);
        Self::save(&sidecar, &tags)
    }

    fn relocate(&self, from: &Path, to: &Path) -> Result<()> {
        let old = Self::sidecar_path(from)?;
        if !old.exists() {
            return Ok(());
        }
        let new = Self::sidecar_path(to)?;
        fs::rename(&old, &new).map_err(|e| {
            TidyError::Tag(format!(
                "failed to move sidecar {} -> {}: {}",
                old.display(),
                new.display(),
                e
            ))
        })
    }

    fn forget(&self, path: &Path) -> Result<()> {
        let sidecar = Self::sidecar_path(path)?;
        match fs::remove_file(&sidecar) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TidyError::Tag(format!(
                "failed to remove sidecar {}: {}",
                sidecar.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::TagColor;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("book.cbz");
        std::fs::write(&path, b"zip").unwrap();

        let store = SidecarStore::new();
        let valid = Tag::new("Valid Comic", TagColor::Green);
        let collision = Tag::new("Collision", TagColor::Yellow);

        store.add(&valid, &path).unwrap();
        store.add(&collision, &path).unwrap();
        assert_eq!(store.all(&path).unwrap(), vec![valid.clone(), collision.clone()]);

        store.remove(&collision, &path).unwrap();
        assert_eq!(store.all(&path).unwrap(), vec![valid]);
    }

    #[test]
    fn test_empty_store_removes_sidecar() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("book.cbz");
        let sidecar = dir.path().join("book.cbz.tags");

        let store = SidecarStore::new();
        let tag = Tag::new("Valid Comic", TagColor::Green);

        store.add(&tag, &path).unwrap();
        assert!(sidecar.exists());

        store.remove(&tag, &path).unwrap();
        assert!(!sidecar.exists());
    }

    #[test]
    fn test_relocate_follows_rename() {
        let dir = TempDir::new().unwrap();
        let old = dir.path().join("Book.CBR");
        let new = dir.path().join("Book.cbz");

        let store = SidecarStore::new();
        let tag = Tag::new("Valid Comic", TagColor::Green);
        store.add(&tag, &old).unwrap();

        store.relocate(&old, &new).unwrap();
        assert!(store.all(&old).unwrap().is_empty());
        assert_eq!(store.all(&new).unwrap(), vec![tag]);
    }

    #[test]
    fn test_missing_sidecar_reads_empty() {
        let dir = TempDir::new().unwrap();
        let store = SidecarStore::new();
        assert!(store.all(&dir.path().join("nothing.cbz")).unwrap().is_empty());
    }
}
