//! Volume-number normalization: `vNN` -> `0NN`
//!
//! Comic managers like Mylar want three-digit issue numbers where manga
//! releases carry `v12`-style volume tokens. The volume token wins when
//! present; otherwise the first bare number of two or more digits gets the
//! leading zero.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::archive::is_comic_extension;
use crate::rename::{rename_checked, RenameOutcome};
use crate::utils::error::Result;

static RE_VOL_NUM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bv(\d{2,})\b").expect("volume regex"));
static RE_BARE_NUM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{2,})\b").expect("bare number regex"));

/// Compute the normalized path, or `None` when there is nothing to do
pub fn volume_target(path: &Path) -> Option<PathBuf> {
    let stem = path.file_stem()?.to_str()?;
    let ext = path.extension()?.to_str()?;

    let renamed = if RE_VOL_NUM.is_match(stem) {
        RE_VOL_NUM.replace(stem, "0$1")
    } else if RE_BARE_NUM.is_match(stem) {
        RE_BARE_NUM.replace(stem, "0$1")
    } else {
        return None;
    };

    if renamed == stem {
        return None;
    }
    Some(path.with_file_name(format!("{}.{}", renamed, ext)))
}

/// Normalize the volume number in one comic file's name
pub fn rename_volume(path: &Path) -> Result<RenameOutcome> {
    if !path.is_file() {
        return Ok(RenameOutcome::Skipped {
            reason: "not a file".to_string(),
        });
    }

    let is_comic = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| is_comic_extension(&e.to_ascii_lowercase()))
        .unwrap_or(false);
    if !is_comic {
        return Ok(RenameOutcome::Skipped {
            reason: "not a comic".to_string(),
        });
    }

    match volume_target(path) {
        Some(target) => rename_checked(path, &target),
        None => Ok(RenameOutcome::Unchanged),
    }
}
