//! Error types for handle transform operations.
//!
//! Most variants describe conditions the engine recovers from on its own
//! (skip a mesh, skip a group, fall back to another basis). They are still
//! typed so they can be logged and counted consistently.

use thiserror::Error;

use crate::mesh::MeshId;

/// Result type for handle transform operations.
pub type HandleResult<T> = Result<T, HandleError>;

/// Errors that can occur while building groups, applying deltas or loading
/// configuration.
#[derive(Debug, Error)]
pub enum HandleError {
    /// Nothing selected; callers treat this as a no-op.
    #[error("selection is empty")]
    EmptySelection,

    /// A pivot frame could not be built as requested and fell back.
    #[error("degenerate frame: {reason}")]
    DegenerateFrame {
        /// What made the frame degenerate.
        reason: String,
    },

    /// A mesh referenced by the edit no longer exists.
    #[error("mesh {0} is no longer available")]
    StaleMeshReference(MeshId),

    /// The element array changed length since the snapshot was taken.
    #[error("mesh {mesh} has {actual} elements, snapshot has {expected}")]
    SnapshotMismatch {
        /// Mesh whose array changed.
        mesh: MeshId,
        /// Length captured at edit begin.
        expected: usize,
        /// Length now.
        actual: usize,
    },

    /// A delta produced non-finite values.
    #[error("invalid delta: {reason}")]
    InvalidDelta {
        /// What was wrong with the delta.
        reason: String,
    },

    /// Config file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid RON.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),

    /// Config could not be serialized.
    #[error("config write error: {0}")]
    ConfigWrite(#[from] ron::Error),
}
