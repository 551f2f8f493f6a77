//! Edit session controller
//!
//! Drives one tool through the `Idle -> Editing -> Idle` lifecycle, one call
//! per UI tick:
//!
//! - Idle, sample unchanged: remember the handle pose as the edit origin
//! - Idle, sample changed: snapshot the grouped meshes, open an undo
//!   checkpoint, notify listeners, then apply
//! - Editing: recompute every mesh from the snapshot with the tool's delta
//! - `finish` / `cancel`: refresh and optimize every edited mesh, notify
//!   listeners, drop the snapshot
//!
//! Element groups are cached and rebuilt only when the selection revision or
//! the tool's element space changes.

use crate::apply::{ApplyReport, TransformApplier};
use crate::group::{build_selection_groups, handle_frame, HandleFrame, MeshGroups};
use crate::math::{Quat, Vec3};
use crate::mesh::{ElementSpace, MeshId, MeshSource};
use crate::selection::SelectionProvider;
use crate::tools::{ActiveTool, ToolContext};
use crate::undo::UndoRecorder;

/// One tick of handle input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputSample {
    pub handle_position: Vec3,
    pub handle_rotation: Quat,
    pub handle_scale: Vec3,
    /// The handle moved this tick
    pub changed: bool,
    /// World point under the cursor, for vertex snapping
    pub snap_target: Option<Vec3>,
}

impl Default for InputSample {
    fn default() -> Self {
        Self {
            handle_position: Vec3::ZERO,
            handle_rotation: Quat::IDENTITY,
            handle_scale: Vec3::ONE,
            changed: false,
            snap_target: None,
        }
    }
}

impl InputSample {
    /// Unchanged sample at a pose
    pub fn at(position: Vec3, rotation: Quat) -> Self {
        Self {
            handle_position: position,
            handle_rotation: rotation,
            ..Self::default()
        }
    }

    /// Changed sample with the handle moved to `position`
    pub fn moved_to(position: Vec3) -> Self {
        Self {
            handle_position: position,
            changed: true,
            ..Self::default()
        }
    }

    /// Unchanged sample at a handle frame
    pub fn from_frame(frame: HandleFrame) -> Self {
        Self::at(frame.position, frame.rotation)
    }

    /// Set rotation and mark changed (builder pattern)
    pub fn rotated(mut self, rotation: Quat) -> Self {
        self.handle_rotation = rotation;
        self.changed = true;
        self
    }

    /// Set scale and mark changed (builder pattern)
    pub fn scaled(mut self, scale: Vec3) -> Self {
        self.handle_scale = scale;
        self.changed = true;
        self
    }

    /// Set position and mark changed (builder pattern)
    pub fn translated(mut self, position: Vec3) -> Self {
        self.handle_position = position;
        self.changed = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Editing,
}

/// Notifications sent to listeners registered with `on_event`
#[derive(Debug)]
pub enum EditEvent<'a> {
    /// An edit is about to modify these meshes
    BeforeModification(&'a [MeshId]),
    /// A tick was applied
    Applied(&'a ApplyReport),
    /// An edit ended and these meshes were refreshed
    AfterModification(&'a [MeshId]),
}

/// Result of one `update` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionUpdate {
    /// Something was written this tick
    pub changed: bool,
    /// This tick opened the edit
    pub began: bool,
    pub report: Option<ApplyReport>,
}

type Listener = Box<dyn FnMut(&EditEvent<'_>)>;

/// Per-edit state, alive only while editing
struct ActiveEdit {
    applier: TransformApplier,
    context: ToolContext,
}

pub struct EditSession {
    tool: ActiveTool,
    state: SessionState,
    /// Last unchanged sample seen while idle
    origin: Option<InputSample>,
    groups: Vec<MeshGroups>,
    /// Selection revision and space the cached groups were built for
    groups_key: Option<(u64, ElementSpace)>,
    edit: Option<ActiveEdit>,
    listeners: Vec<Listener>,
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new(ActiveTool::default())
    }
}

impl std::fmt::Debug for EditSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("tool", &self.tool)
            .field("state", &self.state)
            .field("groups", &self.groups.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EditSession {
    pub fn new(tool: ActiveTool) -> Self {
        Self {
            tool,
            state: SessionState::Idle,
            origin: None,
            groups: Vec::new(),
            groups_key: None,
            edit: None,
            listeners: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_editing(&self) -> bool {
        self.state == SessionState::Editing
    }

    pub fn tool(&self) -> &ActiveTool {
        &self.tool
    }

    /// Switch tools. Ignored while editing; returns whether the tool changed.
    pub fn set_tool(&mut self, tool: ActiveTool) -> bool {
        if self.is_editing() {
            log::warn!("cannot switch tool to '{}' during an edit", tool.label());
            return false;
        }
        self.tool = tool;
        self.origin = None;
        true
    }

    /// Register a listener for edit events
    pub fn on_event(&mut self, listener: impl FnMut(&EditEvent<'_>) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn emit(&mut self, event: EditEvent<'_>) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    /// Current element groups, rebuilt if the selection changed
    pub fn groups(&mut self, provider: &dyn SelectionProvider, meshes: &dyn MeshSource) -> &[MeshGroups] {
        let key = (provider.revision(), self.tool.element_space());
        if self.groups_key != Some(key) {
            self.groups = build_selection_groups(
                provider.selection(),
                meshes,
                &provider.config(),
                key.1,
            );
            self.groups_key = Some(key);
        }
        &self.groups
    }

    /// Where the handle should be drawn for the current selection
    pub fn handle_frame(
        &mut self,
        provider: &dyn SelectionProvider,
        meshes: &dyn MeshSource,
    ) -> Option<HandleFrame> {
        handle_frame(self.groups(provider, meshes))
    }

    /// Feed one tick of input
    pub fn update(
        &mut self,
        sample: &InputSample,
        provider: &dyn SelectionProvider,
        meshes: &mut dyn MeshSource,
        undo: &mut dyn UndoRecorder,
    ) -> SessionUpdate {
        let mut began = false;

        if self.state == SessionState::Idle {
            if !sample.changed {
                self.origin = Some(*sample);
                return SessionUpdate::default();
            }
            if !self.begin(provider, meshes, undo) {
                return SessionUpdate::default();
            }
            began = true;
        } else if !sample.changed {
            return SessionUpdate::default();
        }

        let Some(edit) = self.edit.as_ref() else {
            return SessionUpdate::default();
        };
        let delta = self.tool.compute_delta(sample, &edit.context);
        let report = edit.applier.apply(&delta, meshes);

        self.emit(EditEvent::Applied(&report));
        SessionUpdate {
            changed: report.elements_written > 0,
            began,
            report: Some(report),
        }
    }

    /// Open an edit: snapshot, checkpoint, notify. False if nothing to edit.
    fn begin(
        &mut self,
        provider: &dyn SelectionProvider,
        meshes: &mut dyn MeshSource,
        undo: &mut dyn UndoRecorder,
    ) -> bool {
        let space = self.tool.element_space();
        self.groups(provider, meshes);

        let applier = match TransformApplier::capture(&self.groups, meshes, space) {
            Ok(applier) => applier,
            Err(err) => {
                log::debug!("edit not started: {}", err);
                return false;
            }
        };

        let origin = match self.origin.take() {
            Some(origin) => origin,
            None => handle_frame(&self.groups)
                .map(InputSample::from_frame)
                .unwrap_or_default(),
        };

        let mesh_ids = applier.meshes();
        let mesh_scale = mesh_ids
            .first()
            .and_then(|&id| meshes.mesh(id))
            .map(|mesh| mesh.lossy_scale())
            .unwrap_or(Vec3::ONE);

        let context = ToolContext {
            origin,
            config: provider.config(),
            mesh_scale,
        };

        undo.begin_checkpoint(&mesh_ids, self.tool.label());
        self.emit(EditEvent::BeforeModification(&mesh_ids));

        self.tool.reset();
        self.edit = Some(ActiveEdit { applier, context });
        self.state = SessionState::Editing;

        log::debug!(
            "began '{}' on {} mesh(es) from {:?}",
            self.tool.label(),
            mesh_ids.len(),
            origin.handle_position
        );
        true
    }

    /// End the edit: refresh and optimize every edited mesh. Returns false if
    /// no edit was active.
    pub fn finish(&mut self, meshes: &mut dyn MeshSource) -> bool {
        let Some(edit) = self.edit.take() else {
            return false;
        };

        let mesh_ids = edit.applier.meshes();
        for &id in &mesh_ids {
            match meshes.mesh_mut(id) {
                Some(mesh) => {
                    mesh.refresh();
                    mesh.optimize();
                }
                None => log::warn!("mesh {} vanished before the edit finished", id),
            }
        }

        self.emit(EditEvent::AfterModification(&mesh_ids));

        // Pivots moved with the geometry
        self.groups_key = None;
        self.origin = None;
        self.state = SessionState::Idle;

        log::debug!("finished '{}' on {} mesh(es)", self.tool.label(), mesh_ids.len());
        true
    }

    /// Abandon the edit. Geometry keeps its last applied state; reverting
    /// is the undo recorder's job.
    pub fn cancel(&mut self, meshes: &mut dyn MeshSource) -> bool {
        if self.is_editing() {
            log::debug!("cancelling '{}'", self.tool.label());
        }
        self.finish(meshes)
    }
}
