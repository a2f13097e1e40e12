//! cbxtidy - batch tidying for comic book archives
//!
//! A command-line batch tool in the spirit of Finder Quick Actions: every
//! operation takes a list of paths, handles each one independently to a
//! terminal state, and records the result both as an output line and as a
//! durable per-file tag.
//!
//! The core is the normalization pipeline ([`pipeline::process_path`]):
//! lowercase the extension, sniff the real archive format from magic bytes,
//! fix mislabeled extensions, repack CBR to CBZ, and validate the result by
//! decompressing every entry.

pub mod archive;
pub mod create;
pub mod pipeline;
pub mod rename;
pub mod report;
pub mod tags;
pub mod trash;
pub mod utils;

pub use utils::error::{Result, TidyError};
