//! CBR -> CBZ repacking
//!
//! Extraction goes through a process-exclusive staging directory created next
//! to the source archive (same volume, so nothing crosses filesystems). The
//! staging directory is removed on every exit path by `TempDir`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::archive::rar::RarArchive;
use crate::archive::zip::write_zip_from_dir;
use crate::utils::error::{Result, TidyError};

/// Rewrite a rar-format archive as a zip at `dest`
///
/// The source file is left in place; disposing of it after a successful
/// repack is the caller's decision. On failure any partially-written `dest`
/// is removed. Returns the number of entries carried over.
pub fn repack_rar_to_zip(src: &Path, dest: &Path) -> Result<usize> {
    if dest.exists() {
        return Err(TidyError::DestinationCollision(dest.to_path_buf()));
    }

    let staging_parent = parent_dir(src);
    let staging = tempfile::Builder::new()
        .prefix(".cbxtidy-repack-")
        .tempdir_in(&staging_parent)
        .map_err(|e| TidyError::RepackFailed(format!("failed to create staging dir: {}", e)))?;

    tracing::debug!("Repacking {:?} -> {:?} via {:?}", src, dest, staging.path());

    let archive = RarArchive::open(src).map_err(|e| TidyError::RepackFailed(e.to_string()))?;
    let extracted = archive
        .extract_to(staging.path())
        .map_err(|e| TidyError::RepackFailed(e.to_string()))?;
    if extracted == 0 {
        return Err(TidyError::RepackFailed(format!(
            "no entries extracted from {}",
            src.display()
        )));
    }

    // The repack must carry the exact entry set, hidden files included
    match write_zip_from_dir(staging.path(), dest, true) {
        Ok(written) => {
            tracing::info!("Repacked {:?}: {} entries", src, written);
            Ok(written)
        }
        Err(e) => {
            let _ = fs::remove_file(dest);
            Err(TidyError::RepackFailed(e.to_string()))
        }
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
