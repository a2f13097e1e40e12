//! Error types for cbxtidy
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TidyError {
    #[error("not a file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("unrecognized extension: {}", .0.display())]
    UnrecognizedExtension(PathBuf),

    #[error("destination already exists: {}", .0.display())]
    DestinationCollision(PathBuf),

    #[error("corrupt archive: {0}")]
    CorruptArchive(String),

    #[error("repack failed: {0}")]
    RepackFailed(String),

    #[error("archive creation failed: {0}")]
    CreateFailed(String),

    #[error("cleanup failed: {0}")]
    CleanupFailed(String),

    #[error("archive error: {0}")]
    Archive(String),

    #[error("tag store error: {0}")]
    Tag(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TidyError>;
