//! Command-line surface

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "cbxtidy",
    version,
    about = "Tidy comic book archives: fix extensions, repack CBR to CBZ, validate, tag, rename"
)]
pub struct Cli {
    /// Emit one JSON object per path instead of human-readable lines
    #[arg(long, global = true)]
    pub json: bool,

    /// Permanently delete superseded files instead of moving them to trash
    #[arg(long, global = true)]
    pub no_trash: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Normalize comic archives: canonicalize and fix extensions, repack
    /// CBR to CBZ, validate, and tag the outcome
    Process {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Pack each directory into a validated .cbz archive, then trash the
    /// source directory
    Create {
        #[arg(required = true)]
        dirs: Vec<PathBuf>,
    },

    /// Rewrite vNN volume tokens as zero-padded issue numbers (v12 -> 012)
    RenameVolume {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Rename files and directories to English title case
    TitleCase {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}
