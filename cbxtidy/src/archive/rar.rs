//! RAR/CBR archive reading using the `unrar` crate
//!
//! Read-only: rar archives are only ever listed and extracted here; anything
//! we write back out is a zip.

use std::fs;
use std::path::{Component, Path, PathBuf};

use unrar::Archive as UnrarArchive;

use crate::utils::error::{Result, TidyError};

/// RAR archive handle
pub struct RarArchive {
    path: PathBuf,
}

impl RarArchive {
    /// Open a RAR archive, validating that it can be listed
    pub fn open(path: &Path) -> Result<Self> {
        tracing::debug!("Opening RAR archive: {:?}", path);

        let archive = UnrarArchive::new(path)
            .open_for_listing()
            .map_err(|e| TidyError::Archive(format!("failed to open rar archive: {:?}", e)))?;

        for entry_result in archive {
            if let Err(e) = entry_result {
                return Err(TidyError::Archive(format!("rar listing error: {:?}", e)));
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// List the relative entry paths of all file entries
    pub fn entry_names(&self) -> Result<Vec<String>> {
        let archive = UnrarArchive::new(&self.path)
            .open_for_listing()
            .map_err(|e| TidyError::Archive(format!("failed to open rar for listing: {:?}", e)))?;

        let mut names = Vec::new();
        for entry_result in archive {
            let entry =
                entry_result.map_err(|e| TidyError::Archive(format!("rar entry error: {:?}", e)))?;
            if entry.is_directory() {
                continue;
            }
            names.push(entry.filename.to_string_lossy().to_string());
        }

        Ok(names)
    }

    /// Extract every file entry into `dest`, preserving relative paths
    ///
    /// Entry paths are sanitized before use; an absolute or parent-escaping
    /// entry aborts the extraction. Returns the number of files written.
    pub fn extract_to(&self, dest: &Path) -> Result<usize> {
        tracing::debug!("Extracting RAR {:?} into {:?}", self.path, dest);

        let mut archive = UnrarArchive::new(&self.path)
            .open_for_processing()
            .map_err(|e| TidyError::Archive(format!("failed to open rar for processing: {:?}", e)))?;

        let mut extracted = 0;
        loop {
            match archive.read_header() {
                Ok(Some(header)) => {
                    let is_directory = header.entry().is_directory();
                    let rel = sanitize_entry_path(&header.entry().filename)?;

                    if is_directory {
                        archive = header.skip().map_err(|e| {
                            TidyError::Archive(format!("failed to skip rar entry: {:?}", e))
                        })?;
                        continue;
                    }

                    let target = dest.join(&rel);
                    if let Some(parent) = target.parent() {
                        fs::create_dir_all(parent)?;
                    }

                    let (data, next) = header.read().map_err(|e| {
                        TidyError::Archive(format!("failed to extract rar entry: {:?}", e))
                    })?;
                    fs::write(&target, &data)?;

                    extracted += 1;
                    archive = next;
                }
                Ok(None) => break,
                Err(e) => {
                    return Err(TidyError::Archive(format!("failed to read rar header: {:?}", e)));
                }
            }
        }

        tracing::debug!("Extracted {} entries", extracted);
        Ok(extracted)
    }
}

/// Reduce an archive entry path to a safe relative path
fn sanitize_entry_path(raw: &Path) -> Result<PathBuf> {
    let mut clean = PathBuf::new();
    for component in raw.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            _ => {
                return Err(TidyError::Archive(format!(
                    "unsafe entry path in archive: {}",
                    raw.display()
                )))
            }
        }
    }
    if clean.as_os_str().is_empty() {
        return Err(TidyError::Archive("empty entry path in archive".to_string()));
    }
    Ok(clean)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_plain_paths() {
        assert_eq!(sanitize_entry_path(Path::new("a.jpg")).unwrap(), PathBuf::from("a.jpg"));
        assert_eq!(
            sanitize_entry_path(Path::new("sub/b.jpg")).unwrap(),
            PathBuf::from("sub/b.jpg")
        );
        assert_eq!(
            sanitize_entry_path(Path::new("./sub/c.jpg")).unwrap(),
            PathBuf::from("sub/c.jpg")
        );
    }

    #[test]
    fn test_sanitize_rejects_escapes() {
        assert!(sanitize_entry_path(Path::new("../evil.jpg")).is_err());
        assert!(sanitize_entry_path(Path::new("/etc/passwd")).is_err());
        assert!(sanitize_entry_path(Path::new("sub/../../evil.jpg")).is_err());
        assert!(sanitize_entry_path(Path::new("")).is_err());
    }

    #[test]
    fn test_open_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.cbr");
        // Valid RAR 4.x magic followed by garbage
        std::fs::write(&path, b"Rar!\x1A\x07\x00garbage that is not an archive").unwrap();

        assert!(RarArchive::open(&path).is_err());
    }
}
