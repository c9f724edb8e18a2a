//! Errors raised by path-editing operations.

use thiserror::Error;

/// Precondition violations reported by the path store, history and controller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error("Path index {index} out of range ({len} committed paths)")]
    PathIndexOutOfRange { index: usize, len: usize },
    #[error("Point index {index} out of range (path {path} has {len} points)")]
    PointIndexOutOfRange { path: usize, index: usize, len: usize },
    #[error("Nothing to undo")]
    NothingToUndo,
    #[error("Nothing to redo")]
    NothingToRedo,
    #[error("Snap distance must be greater than 1, got {0}")]
    InvalidSnapDistance(f64),
    #[error("Paths must have similar styles to be combined")]
    IncompatibleStyles,
}

/// Result type for editing operations.
pub type EditResult<T> = Result<T, EditError>;
