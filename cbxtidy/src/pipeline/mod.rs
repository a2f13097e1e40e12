//! Comic archive normalization pipeline
//!
//! Single pass per file, no retries:
//!
//! ```text
//! canonicalize ext -> detect format -> correct ext -> (rar) repack -> validate
//! ```
//!
//! Every stage consumes the path the previous stage produced. Each run ends
//! in exactly one terminal state, recorded as a tag from the pipeline's
//! vocabulary; stale tags from earlier runs are cleared first.

mod canonical;

pub use canonical::{canonicalize_extension, correct_extension, RenameStep};

use std::path::{Path, PathBuf};

use crate::archive::{self, ArchiveFormat};
use crate::tags::{clear_tags, ProcessTags, TagStore};
use crate::trash;
use crate::utils::error::{Result, TidyError};

/// Terminal state of one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Corrupt,
    Collision,
    RepackFailed,
    Skipped,
}

/// What happened to one input path
#[derive(Debug)]
pub struct ProcessOutcome {
    pub verdict: Verdict,
    /// Where the file ended up (renames and repacks move it)
    pub final_path: PathBuf,
    pub detail: Option<String>,
}

impl ProcessOutcome {
    fn new(verdict: Verdict, path: &Path, detail: impl Into<Option<String>>) -> Self {
        Self {
            verdict,
            final_path: path.to_path_buf(),
            detail: detail.into(),
        }
    }
}

/// Everything a pipeline run needs besides the path
pub struct ProcessContext<'a> {
    pub tags: &'a ProcessTags,
    pub store: &'a dyn TagStore,
    /// Move superseded originals to the recoverable trash instead of deleting
    pub use_trash: bool,
}

/// Run the normalization pipeline over one path
///
/// Returns `Ok` with the terminal outcome for every case the pipeline knows
/// how to classify; `Err` only for failures outside the taxonomy (a rename
/// or tag write failing mid-flight), which the batch loop records and moves
/// past.
pub fn process_path(input: &Path, ctx: &ProcessContext<'_>) -> Result<ProcessOutcome> {
    if !input.is_file() {
        return Ok(ProcessOutcome::new(
            Verdict::Skipped,
            input,
            Some("not a file".to_string()),
        ));
    }

    match input.extension().and_then(|e| e.to_str()) {
        Some(ext) if archive::is_comic_extension(&ext.to_ascii_lowercase()) => {}
        Some(ext) => {
            return Ok(ProcessOutcome::new(
                Verdict::Skipped,
                input,
                Some(format!("unrecognized suffix (.{})", ext)),
            ));
        }
        None => {
            return Ok(ProcessOutcome::new(
                Verdict::Skipped,
                input,
                Some("unrecognized suffix".to_string()),
            ));
        }
    }

    clear_tags(ctx.store, &ctx.tags.vocabulary(), input)?;

    let mut current = input.to_path_buf();

    // Stage 1: lowercase the suffix before anything compares suffixes
    match canonicalize_extension(&current)? {
        RenameStep::Renamed(renamed) => {
            ctx.store.relocate(&current, &renamed)?;
            current = renamed;
        }
        RenameStep::Collision(existing) => {
            ctx.store.add(&ctx.tags.collision, &current)?;
            return Ok(ProcessOutcome::new(
                Verdict::Collision,
                &current,
                Some(format!("lowercased name collides with {}", existing.display())),
            ));
        }
        RenameStep::Unchanged => {}
    }

    // Stage 2: the content decides the format, not the name
    let format = archive::detect_format(&current);
    if format == ArchiveFormat::Unknown {
        ctx.store.add(&ctx.tags.corrupt, &current)?;
        return Ok(ProcessOutcome::new(
            Verdict::Corrupt,
            &current,
            Some("unrecognized or unreadable archive content".to_string()),
        ));
    }

    // Stage 3: make the name agree with the content
    match correct_extension(&current, format)? {
        RenameStep::Renamed(renamed) => {
            tracing::info!("Fixed extension: {:?} -> {:?}", current, renamed);
            ctx.store.relocate(&current, &renamed)?;
            current = renamed;
        }
        RenameStep::Collision(existing) => {
            ctx.store.add(&ctx.tags.collision, &current)?;
            return Ok(ProcessOutcome::new(
                Verdict::Collision,
                &current,
                Some(format!("corrected name collides with {}", existing.display())),
            ));
        }
        RenameStep::Unchanged => {}
    }

    // Stage 4: rar archives get rebuilt as zip
    let mut cleanup_note = None;
    if format == ArchiveFormat::Rar {
        let dest = current.with_extension("cbz");
        match archive::repack_rar_to_zip(&current, &dest) {
            Ok(entries) => {
                tracing::info!("Repacked {:?} -> {:?} ({} entries)", current, dest, entries);
                match trash::dispose(&current, ctx.use_trash) {
                    Ok(_) => ctx.store.forget(&current)?,
                    Err(e) => {
                        tracing::warn!("Could not remove superseded {:?}: {}", current, e);
                        ctx.store.add(&ctx.tags.cleanup_failed, &current)?;
                        cleanup_note =
                            Some(format!("superseded original left behind: {}", current.display()));
                    }
                }
                current = dest;
            }
            Err(TidyError::DestinationCollision(existing)) => {
                ctx.store.add(&ctx.tags.collision, &current)?;
                return Ok(ProcessOutcome::new(
                    Verdict::Collision,
                    &current,
                    Some(format!("repack target {} already exists", existing.display())),
                ));
            }
            Err(e) => {
                ctx.store.add(&ctx.tags.repack_failed, &current)?;
                return Ok(ProcessOutcome::new(
                    Verdict::RepackFailed,
                    &current,
                    Some(e.to_string()),
                ));
            }
        }
    }

    // Stage 5: the terminal verdict comes from a full decompression walk
    match archive::validate_zip(&current) {
        Ok(entries) => {
            tracing::debug!("{:?} is valid ({} entries)", current, entries);
            ctx.store.add(&ctx.tags.valid, &current)?;
            Ok(ProcessOutcome::new(Verdict::Valid, &current, cleanup_note))
        }
        Err(e) => {
            ctx.store.add(&ctx.tags.corrupt, &current)?;
            Ok(ProcessOutcome::new(
                Verdict::Corrupt,
                &current,
                Some(e.to_string()),
            ))
        }
    }
}
