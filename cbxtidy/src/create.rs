//! Create a CBZ from a folder of images
//!
//! The inverse of unpacking: a directory `Book/` becomes a sibling
//! `Book.cbz`, validated with the same full decompression walk the pipeline
//! uses, and only then is the source directory moved to the trash. The
//! `.cbz` suffix is appended to the directory name as-is so names with dots
//! survive intact.

use std::path::{Path, PathBuf};

use crate::archive::{validate_zip, write_zip_from_dir};
use crate::tags::{clear_tags, CreateTags, TagStore};
use crate::trash;
use crate::utils::error::{Result, TidyError};

/// Terminal state of one create run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateVerdict {
    Created,
    Corrupt,
    Collision,
    CreateFailed,
    CleanupFailed,
    Skipped,
}

#[derive(Debug)]
pub struct CreateOutcome {
    pub verdict: CreateVerdict,
    /// The archive path when one was produced, otherwise the source dir
    pub final_path: PathBuf,
    pub detail: Option<String>,
}

impl CreateOutcome {
    fn new(verdict: CreateVerdict, path: &Path, detail: impl Into<Option<String>>) -> Self {
        Self {
            verdict,
            final_path: path.to_path_buf(),
            detail: detail.into(),
        }
    }
}

pub struct CreateContext<'a> {
    pub tags: &'a CreateTags,
    pub store: &'a dyn TagStore,
    pub use_trash: bool,
}

/// Pack one directory into a validated `.cbz`
pub fn create_from_dir(dir: &Path, ctx: &CreateContext<'_>) -> Result<CreateOutcome> {
    if !dir.is_dir() {
        return Ok(CreateOutcome::new(
            CreateVerdict::Skipped,
            dir,
            Some("not a directory".to_string()),
        ));
    }

    let dest = cbz_sibling(dir)?;
    if dest.exists() {
        ctx.store.add(&ctx.tags.collision, dir)?;
        return Ok(CreateOutcome::new(
            CreateVerdict::Collision,
            dir,
            Some(format!("{} already exists", dest.display())),
        ));
    }

    clear_tags(ctx.store, &ctx.tags.vocabulary(), dir)?;

    // Hidden files stay out of the archive, sidecars and trash included
    match write_zip_from_dir(dir, &dest, false) {
        Ok(0) => {
            let _ = std::fs::remove_file(&dest);
            ctx.store.add(&ctx.tags.create_failed, dir)?;
            return Ok(CreateOutcome::new(
                CreateVerdict::CreateFailed,
                dir,
                Some("directory contains no files".to_string()),
            ));
        }
        Ok(written) => {
            tracing::info!("Created {:?} with {} entries", dest, written);
        }
        Err(e) => {
            let _ = std::fs::remove_file(&dest);
            ctx.store.add(&ctx.tags.create_failed, dir)?;
            return Ok(CreateOutcome::new(
                CreateVerdict::CreateFailed,
                dir,
                Some(e.to_string()),
            ));
        }
    }

    match validate_zip(&dest) {
        Ok(_) => {
            ctx.store.add(&ctx.tags.valid, &dest)?;
        }
        Err(e) => {
            ctx.store.add(&ctx.tags.corrupt, &dest)?;
            return Ok(CreateOutcome::new(
                CreateVerdict::Corrupt,
                &dest,
                Some(e.to_string()),
            ));
        }
    }

    // Only a validated archive justifies removing the source
    match trash::dispose(dir, ctx.use_trash) {
        Ok(_) => {
            ctx.store.forget(dir)?;
            Ok(CreateOutcome::new(CreateVerdict::Created, &dest, None))
        }
        Err(e) => {
            tracing::warn!("Could not remove source dir {:?}: {}", dir, e);
            ctx.store.add(&ctx.tags.cleanup_failed, dir)?;
            Ok(CreateOutcome::new(
                CreateVerdict::CleanupFailed,
                &dest,
                Some(format!("source directory left behind: {}", e)),
            ))
        }
    }
}

/// `Book.2020/` -> `Book.2020.cbz` (suffix appended, not swapped)
fn cbz_sibling(dir: &Path) -> Result<PathBuf> {
    let name = dir.file_name().ok_or_else(|| {
        TidyError::NotADirectory(dir.to_path_buf())
    })?;
    let mut with_ext = name.to_os_string();
    with_ext.push(".cbz");
    Ok(dir.with_file_name(with_ext))
}
