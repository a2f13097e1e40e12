//! Archive format detection using magic bytes (file signatures)
//!
//! The whole point of content sniffing is to catch extension/content
//! mismatches (a `.cbr` that is actually a zip), so nothing in this module
//! looks at the file name.
//!
//! ## Magic Bytes
//!
//! - ZIP: `50 4B 03 04`, `50 4B 05 06` (empty archive) or `50 4B 07 08`
//! - RAR 4.x: `52 61 72 21 1A 07 00` (`Rar!\x1A\x07\x00`)
//! - RAR 5.x: `52 61 72 21 1A 07 01 00` (`Rar!\x1A\x07\x01\x00`)

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::archive::ArchiveFormat;

/// Bytes read from the head of the file for sniffing
const SNIFF_LEN: usize = 16;

/// Detect archive format from the leading bytes of a file
///
/// Returns [`ArchiveFormat::Unknown`] for anything that is not a recognized
/// zip or rar signature, including data shorter than the shortest signature.
pub fn detect_format_from_bytes(data: &[u8]) -> ArchiveFormat {
    if data.len() >= 4 {
        let magic = &data[0..4];
        if magic == b"PK\x03\x04" || magic == b"PK\x05\x06" || magic == b"PK\x07\x08" {
            return ArchiveFormat::Zip;
        }
    }

    // RAR 4.x and 5.x share a prefix but differ in the version byte
    if data.len() >= 7 && &data[0..7] == b"Rar!\x1A\x07\x00" {
        return ArchiveFormat::Rar;
    }
    if data.len() >= 8 && &data[0..8] == b"Rar!\x1A\x07\x01\x00" {
        return ArchiveFormat::Rar;
    }

    ArchiveFormat::Unknown
}

/// Sniff the archive format of a file on disk
///
/// Reads at most [`SNIFF_LEN`] bytes. Any I/O failure (missing file,
/// permissions) is surfaced as `Unknown` so the pipeline can treat an
/// unreadable archive the same as an unrecognized one.
pub fn detect_format(path: &Path) -> ArchiveFormat {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            tracing::debug!("Failed to open {:?} for sniffing: {}", path, e);
            return ArchiveFormat::Unknown;
        }
    };

    let mut buf = [0u8; SNIFF_LEN];
    let mut filled = 0;
    loop {
        match file.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => {
                filled += n;
                if filled == buf.len() {
                    break;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::debug!("Failed to read head of {:?}: {}", path, e);
                return ArchiveFormat::Unknown;
            }
        }
    }

    let format = detect_format_from_bytes(&buf[..filled]);
    tracing::debug!("Sniffed {:?} as {}", path, format.as_str());
    format
}
