//! Extension canonicalization and correction
//!
//! Two collision-safe rename stages: lowercasing the suffix (so every later
//! comparison can be case-sensitive) and swapping the suffix to match the
//! sniffed content format. Neither stage ever overwrites an existing file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::archive::ArchiveFormat;
use crate::utils::error::Result;

/// Result of a collision-checked rename stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameStep {
    /// Nothing to do; the path already satisfies the stage
    Unchanged,
    /// Renamed; continue the pipeline under the new path
    Renamed(PathBuf),
    /// The computed target already exists; the source was left untouched
    Collision(PathBuf),
}

/// Lowercase the file extension in place
///
/// `Book.CBZ` becomes `Book.cbz`. Idempotent. On case-insensitive
/// filesystems the target "exists" even though it is the same file, so the
/// collision check only fires when the target is a genuinely different file.
pub fn canonicalize_extension(path: &Path) -> Result<RenameStep> {
    let ext = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => ext,
        None => return Ok(RenameStep::Unchanged),
    };

    let lowered = ext.to_ascii_lowercase();
    if lowered == ext {
        return Ok(RenameStep::Unchanged);
    }

    let target = path.with_extension(&lowered);
    if target.exists() && !is_same_file(path, &target) {
        return Ok(RenameStep::Collision(target));
    }

    tracing::debug!("Downcasing suffix: {:?} -> {:?}", path, target);
    fs::rename(path, &target)?;
    Ok(RenameStep::Renamed(target))
}

/// Make the extension agree with the detected content format
///
/// `.cbr` with zip content becomes `.cbz` and vice versa. A path already
/// carrying the right suffix is left alone, as is anything with an
/// [`ArchiveFormat::Unknown`] format (the caller handles that case earlier).
pub fn correct_extension(path: &Path, format: ArchiveFormat) -> Result<RenameStep> {
    let wanted = match format.comic_extension() {
        Some(wanted) => wanted,
        None => return Ok(RenameStep::Unchanged),
    };

    let ext = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => ext,
        None => return Ok(RenameStep::Unchanged),
    };
    if ext == wanted {
        return Ok(RenameStep::Unchanged);
    }

    let target = path.with_extension(wanted);
    if target.exists() {
        return Ok(RenameStep::Collision(target));
    }

    tracing::debug!("Fixing extension: {:?} -> {:?}", path, target);
    fs::rename(path, &target)?;
    Ok(RenameStep::Renamed(target))
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        match (fs::metadata(a), fs::metadata(b)) {
            (Ok(ma), Ok(mb)) => ma.dev() == mb.dev() && ma.ino() == mb.ino(),
            _ => false,
        }
    }
    #[cfg(not(unix))]
    {
        a.parent() == b.parent()
            && match (a.file_name(), b.file_name()) {
                (Some(x), Some(y)) => x.eq_ignore_ascii_case(y),
                _ => false,
            }
    }
}
