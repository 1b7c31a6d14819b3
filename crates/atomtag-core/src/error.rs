//! Error types for tagged object operations.

use std::fmt;

use atomtag_exec::{ExecError, Status};
use thiserror::Error;

/// The suboperation of a read batch that failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// The byte-range read.
    Read,
    /// The attribute listing.
    ListAttributes,
    /// Advancing the attribute iterator.
    IterateAttributes,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Read => write!(f, "read"),
            Step::ListAttributes => write!(f, "list-attributes"),
            Step::IterateAttributes => write!(f, "iterate-attributes"),
        }
    }
}

/// Errors from tagged reads and writes.
#[derive(Debug, Error)]
pub enum TagError {
    /// The batch as a whole failed to execute.
    #[error("batch on {oid} failed: {source}")]
    Transport { oid: String, source: ExecError },

    /// The batch ran but one of its suboperations failed.
    #[error("{step} on {oid} failed: {source}")]
    Suboperation {
        oid: String,
        step: Step,
        source: ExecError,
    },

    /// The guarded write lost: the tag moved, the object already exists,
    /// or the object holding the expected tag is gone.
    #[error("version conflict on {oid}: {source}")]
    VersionConflict { oid: String, source: ExecError },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl TagError {
    /// Returns `true` when re-reading the tag and retrying may succeed.
    pub fn is_conflict(&self) -> bool {
        matches!(self, TagError::VersionConflict { .. })
    }

    /// The backend error behind this failure, if any.
    pub fn exec_error(&self) -> Option<ExecError> {
        match self {
            TagError::Transport { source, .. }
            | TagError::Suboperation { source, .. }
            | TagError::VersionConflict { source, .. } => Some(*source),
            TagError::Config(_) => None,
        }
    }

    /// The raw backend status behind this failure, if any.
    pub fn status(&self) -> Option<Status> {
        self.exec_error().map(|e| e.status())
    }
}

/// Convenience type alias for tagged operations.
pub type Result<T> = std::result::Result<T, TagError>;
