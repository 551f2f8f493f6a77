//! HANDLEKIT: selection-grouped transform handles for mesh editors
//!
//! Moves, rotates and scales selected vertices or UVs across many meshes at
//! once, the way a modeler's gizmo does:
//! - Welded (coincident) vertices always move together
//! - Pivot per selection, per mesh, or per welded vertex
//! - Global, local or normal-aligned handle axes
//! - Every tick recomputed from a snapshot taken when the drag began
//!
//! Typical use, once per UI tick:
//!
//! ```no_run
//! use handlekit::{ActiveTool, CheckpointLog, EditSession, InputSample, MeshScene, SelectionState};
//!
//! # fn tick(scene: &mut MeshScene, selection: &SelectionState, sample: InputSample, released: bool) {
//! # let mut session = EditSession::new(ActiveTool::translate());
//! # let mut undo = CheckpointLog::new();
//! session.update(&sample, selection, scene, &mut undo);
//! if released {
//!     session.finish(scene);
//! }
//! # }
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

pub mod apply;
pub mod coincident;
pub mod config;
pub mod error;
pub mod group;
pub mod math;
pub mod mesh;
pub mod selection;
pub mod session;
pub mod tools;
pub mod undo;

pub use apply::{ApplyReport, Delta, DeltaFrame, MeshSnapshot, TransformApplier};
pub use coincident::{resolve_coincident, CoincidentIndex};
pub use config::TransformConfig;
pub use error::{HandleError, HandleResult};
pub use group::{
    build_element_groups, build_selection_groups, handle_frame, ElementGroup, HandleFrame,
    HandleOrientation, MeshGroups, PivotPoint,
};
pub use mesh::{EditFace, EditableMesh, ElementSpace, MeshHandle, MeshId, MeshScene, MeshSource, MeshTransform};
pub use selection::{Selection, SelectionProvider, SelectionState};
pub use session::{EditEvent, EditSession, InputSample, SessionState, SessionUpdate};
pub use tools::{ActiveTool, RotationPivot, ToolContext};
pub use undo::{CheckpointLog, NoUndo, UndoRecorder};

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
