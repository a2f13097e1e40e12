//! Filename heuristics
//!
//! Collision-safe renaming operations on names only; file contents are never
//! read here.

pub mod title;
pub mod volume;

use std::fs;
use std::path::{Path, PathBuf};

use crate::utils::error::Result;

/// Terminal state of one rename run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    Renamed { to: PathBuf },
    Unchanged,
    Collision { target: PathBuf },
    Skipped { reason: String },
}

/// Rename `src` to `dst` unless something already lives at `dst`
pub(crate) fn rename_checked(src: &Path, dst: &Path) -> Result<RenameOutcome> {
    if src == dst {
        return Ok(RenameOutcome::Unchanged);
    }
    if dst.exists() {
        return Ok(RenameOutcome::Collision {
            target: dst.to_path_buf(),
        });
    }
    fs::rename(src, dst)?;
    tracing::debug!("Renamed {:?} -> {:?}", src, dst);
    Ok(RenameOutcome::Renamed {
        to: dst.to_path_buf(),
    })
}
