//! Shared error taxonomy
//!
//! Every fallible operation in the crate returns `anyhow::Result`; domain
//! failures are `RepoError` values wrapped in anyhow so the command
//! dispatcher can print exactly one human-readable line and exit cleanly.
//! Merge conflicts are deliberately not part of this taxonomy: a conflicted
//! merge still completes, so conflicts are reported as data, not errors.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    /// Malformed command operands; reported before any state change.
    #[error("{0}")]
    UserInput(String),
    /// Operating on a path the staging index does not track.
    #[error("No reason to remove the file: {}", .0.display())]
    NotTracked(PathBuf),
    /// Self-merge, dirty index before merge, and similar guard failures.
    #[error("{0}")]
    ConflictingState(String),
    /// Unknown branch, tag, remote, or commit.
    #[error("{0}")]
    ReferenceNotFound(String),
    /// An abbreviated hash matched more than one stored object.
    #[error("Ambiguous object prefix: {0}")]
    AmbiguousReference(String),
    /// A symbolic reference chain that cycles or dangles.
    #[error("Broken reference chain at {0}")]
    BrokenReference(String),
    #[error("No object with hash {0} exists")]
    ObjectNotFound(String),
    #[error("File does not exist in that commit: {}", .0.display())]
    FileNotInCommit(PathBuf),
    #[error("No changes added to the commit")]
    NothingToCommit,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
