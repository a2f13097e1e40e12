//! ZIP/CBZ reading and writing
//!
//! Validation walks and decompresses every entry rather than trusting the
//! central directory, so truncated or bit-rotted members are caught. Writing
//! always stores forward-slash relative entry names for portable archives.

use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::{Component, Path};

use walkdir::WalkDir;
use zip::write::{FileOptions, ZipWriter};
use zip::ZipArchive as ZipReader;

use crate::utils::error::{Result, TidyError};

/// Decompress-test every entry of a zip archive
///
/// Returns the number of file entries on success. The CRC of each entry is
/// checked as a side effect of reading it to the end, which is what catches
/// corruption the central directory alone would hide.
pub fn validate_zip(path: &Path) -> Result<usize> {
    tracing::debug!("Validating zip archive: {:?}", path);

    let file = File::open(path)
        .map_err(|e| TidyError::CorruptArchive(format!("failed to open {}: {}", path.display(), e)))?;
    let mut archive = ZipReader::new(BufReader::new(file))
        .map_err(|e| TidyError::CorruptArchive(format!("invalid zip archive: {}", e)))?;

    let mut files = 0;
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| TidyError::CorruptArchive(format!("failed to read entry {}: {}", i, e)))?;

        if entry.is_dir() {
            continue;
        }

        let name = entry.name().to_string();
        io::copy(&mut entry, &mut io::sink()).map_err(|e| {
            TidyError::CorruptArchive(format!("entry '{}' failed decompression: {}", name, e))
        })?;
        files += 1;
    }

    tracing::debug!("Archive is sound: {} file entries", files);
    Ok(files)
}

/// Write a new zip archive from the contents of a directory
///
/// Every descendant file is stored under its relative path, components joined
/// with forward slashes. Entries are added in natural name order so the same
/// tree always produces the same archive layout. With `include_hidden` false,
/// dot-prefixed files and directories are left out.
///
/// On failure the partially-written archive at `dest` is the caller's to
/// remove; this function only reports the error.
pub fn write_zip_from_dir(src_dir: &Path, dest: &Path, include_hidden: bool) -> Result<usize> {
    tracing::debug!("Writing zip {:?} from directory {:?}", dest, src_dir);

    let file = File::create(dest)
        .map_err(|e| TidyError::Archive(format!("failed to create {}: {}", dest.display(), e)))?;
    let mut writer = ZipWriter::new(file);
    let options = FileOptions::default();

    let walker = WalkDir::new(src_dir)
        .sort_by(|a, b| natord::compare(&a.file_name().to_string_lossy(), &b.file_name().to_string_lossy()))
        .into_iter()
        .filter_entry(|e| include_hidden || e.depth() == 0 || !is_hidden(e.file_name()));

    let mut buffer = Vec::new();
    let mut written = 0;
    for entry in walker {
        let entry = entry
            .map_err(|e| TidyError::Archive(format!("failed to walk {}: {}", src_dir.display(), e)))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let rel = entry.path().strip_prefix(src_dir).map_err(|e| {
            TidyError::Archive(format!("entry {} escapes source dir: {}", entry.path().display(), e))
        })?;
        let name = zip_entry_name(rel)?;

        writer
            .start_file(name.as_str(), options)
            .map_err(|e| TidyError::Archive(format!("failed to start entry '{}': {}", name, e)))?;

        buffer.clear();
        File::open(entry.path())
            .and_then(|mut f| f.read_to_end(&mut buffer))
            .map_err(|e| TidyError::Archive(format!("failed to read {}: {}", entry.path().display(), e)))?;
        writer
            .write_all(&buffer)
            .map_err(|e| TidyError::Archive(format!("failed to write entry '{}': {}", name, e)))?;
        written += 1;
    }

    writer
        .finish()
        .map_err(|e| TidyError::Archive(format!("failed to finalize {}: {}", dest.display(), e)))?;

    tracing::debug!("Wrote {} entries to {:?}", written, dest);
    Ok(written)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

/// Convert a relative filesystem path into a portable zip entry name
fn zip_entry_name(rel: &Path) -> Result<String> {
    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            _ => {
                return Err(TidyError::Archive(format!(
                    "refusing non-relative entry path: {}",
                    rel.display()
                )))
            }
        }
    }
    if parts.is_empty() {
        return Err(TidyError::Archive("empty entry path".to_string()));
    }
    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_tree(root: &Path, files: &[(&str, &[u8])]) {
        for (rel, content) in files {
            let path = root.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
    }

    fn entry_names(path: &Path) -> Vec<String> {
        let mut archive = ZipReader::new(File::open(path).unwrap()).unwrap();
        (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn test_round_trip_relative_entry_names() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("book");
        write_tree(&src, &[("a.jpg", b"image a"), ("sub/b.jpg", b"image b")]);

        let dest = dir.path().join("book.cbz");
        let written = write_zip_from_dir(&src, &dest, true).unwrap();
        assert_eq!(written, 2);

        let mut names = entry_names(&dest);
        names.sort();
        assert_eq!(names, vec!["a.jpg".to_string(), "sub/b.jpg".to_string()]);

        // Byte-identical content survives the trip
        let mut archive = ZipReader::new(File::open(&dest).unwrap()).unwrap();
        let mut content = Vec::new();
        archive.by_name("sub/b.jpg").unwrap().read_to_end(&mut content).unwrap();
        assert_eq!(content, b"image b");
    }

    #[test]
    fn test_hidden_files_excluded() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("book");
        write_tree(
            &src,
            &[
                ("page1.jpg", b"1"),
                (".DS_Store", b"junk"),
                (".hidden/inner.jpg", b"2"),
            ],
        );

        let dest = dir.path().join("book.cbz");
        let written = write_zip_from_dir(&src, &dest, false).unwrap();
        assert_eq!(written, 1);
        assert_eq!(entry_names(&dest), vec!["page1.jpg".to_string()]);
    }

    #[test]
    fn test_hidden_files_included_for_repack() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("staging");
        write_tree(&src, &[("page1.jpg", b"1"), (".nomedia", b"")]);

        let dest = dir.path().join("out.cbz");
        assert_eq!(write_zip_from_dir(&src, &dest, true).unwrap(), 2);
    }

    #[test]
    fn test_validate_sound_archive() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("book");
        write_tree(&src, &[("page1.jpg", b"1"), ("page2.jpg", b"2")]);

        let dest = dir.path().join("book.cbz");
        write_zip_from_dir(&src, &dest, true).unwrap();
        assert_eq!(validate_zip(&dest).unwrap(), 2);
    }

    #[test]
    fn test_validate_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.cbz");
        fs::write(&path, b"PK\x03\x04 this is not really a zip").unwrap();

        let result = validate_zip(&path);
        assert!(matches!(result, Err(TidyError::CorruptArchive(_))));
    }

    #[test]
    fn test_validate_rejects_truncated_entry() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("book");
        write_tree(&src, &[("page1.jpg", &[0x42u8; 4096])]);

        let dest = dir.path().join("book.cbz");
        write_zip_from_dir(&src, &dest, true).unwrap();

        // Chop the tail off; the central directory is gone or the entry is short
        let bytes = fs::read(&dest).unwrap();
        fs::write(&dest, &bytes[..bytes.len() / 2]).unwrap();

        assert!(validate_zip(&dest).is_err());
    }

    #[test]
    fn test_zip_entry_name_rejects_traversal() {
        assert!(zip_entry_name(Path::new("../evil.jpg")).is_err());
        assert!(zip_entry_name(Path::new("/abs/evil.jpg")).is_err());
        assert_eq!(zip_entry_name(Path::new("sub/ok.jpg")).unwrap(), "sub/ok.jpg");
    }
}
