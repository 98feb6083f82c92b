//! crates/timber/src/error.rs
//! Errors surfaced by log calls and by forest maintenance.

use std::io;

use thiserror::Error;

use super::format::FormatError;
use super::tree::TreeId;

/// Failure of a single log call.
///
/// Formatting and tagging failures indicate programmer error and are always
/// returned to the caller. Sink failures are returned by [`Tree`](crate::Tree)
/// but isolated per tree when broadcasting through a [`Forest`](crate::Forest).
#[derive(Debug, Error)]
pub enum LogError {
    /// The message template and its arguments do not fit together.
    #[error(transparent)]
    Format(#[from] FormatError),
    /// No explicit tag was set and none could be derived from the call site.
    #[error("cannot derive a tag for the call at {file}:{line}; set one with tag() first")]
    UntaggableCaller {
        /// Source file of the call.
        file: &'static str,
        /// Line of the call.
        line: u32,
    },
    /// The sink failed while writing the record.
    #[error("sink failed to write record: {0}")]
    Sink(#[from] io::Error),
}

/// Failure to change the set of planted trees.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PlantError {
    /// The tree passed to `uproot` is not currently planted.
    #[error("cannot uproot tree {0} which is not planted")]
    NotPlanted(TreeId),
}
