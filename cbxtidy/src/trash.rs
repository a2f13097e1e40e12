//! Recoverable deletion
//!
//! Superseded files are moved into a `.cbxtidy-trash` directory next to them
//! rather than unlinked, so a bad repack can be undone by hand. Names are
//! uniquified with a numeric suffix; nothing in the trash is ever
//! overwritten.

use std::fs;
use std::path::{Path, PathBuf};

use crate::utils::error::{Result, TidyError};

pub const TRASH_DIR_NAME: &str = ".cbxtidy-trash";

/// Move a file or directory into the sibling trash directory
///
/// Returns the path it now lives at.
pub fn send_to_trash(path: &Path) -> Result<PathBuf> {
    let name = path.file_name().ok_or_else(|| {
        TidyError::CleanupFailed(format!("no file name to trash: {}", path.display()))
    })?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let trash_dir = parent.join(TRASH_DIR_NAME);
    fs::create_dir_all(&trash_dir).map_err(|e| {
        TidyError::CleanupFailed(format!("failed to create {}: {}", trash_dir.display(), e))
    })?;

    let mut candidate = trash_dir.join(name);
    let mut counter = 1u32;
    while candidate.exists() {
        let mut unique = name.to_os_string();
        unique.push(format!(".{}", counter));
        candidate = trash_dir.join(unique);
        counter += 1;
    }

    fs::rename(path, &candidate).map_err(|e| {
        TidyError::CleanupFailed(format!(
            "failed to move {} to trash: {}",
            path.display(),
            e
        ))
    })?;

    tracing::debug!("Trashed {:?} -> {:?}", path, candidate);
    Ok(candidate)
}

/// Remove a path, recoverably or permanently
///
/// With `use_trash` the path is moved to the trash and its new location is
/// returned; otherwise it is deleted outright.
pub fn dispose(path: &Path, use_trash: bool) -> Result<Option<PathBuf>> {
    if use_trash {
        return send_to_trash(path).map(Some);
    }

    let metadata = fs::symlink_metadata(path)
        .map_err(|e| TidyError::CleanupFailed(format!("cannot stat {}: {}", path.display(), e)))?;
    let removal = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    removal.map_err(|e| {
        TidyError::CleanupFailed(format!("failed to remove {}: {}", path.display(), e))
    })?;
    Ok(None)
}
