//! Transform applier
//!
//! Captures the original element values of every grouped mesh when an edit
//! begins, then rebuilds the live arrays from those originals on every tick:
//!
//! ```text
//! world' = post_apply * D * pre_apply * original_world
//! local' = world_to_local * world'
//! ```
//!
//! Nothing is accumulated between ticks, so any number of deltas applied in a
//! row leave the mesh exactly where the last one alone would.

use crate::error::HandleError;
use crate::group::{ElementGroup, MeshGroups};
use crate::math::{Mat4, Quat, Vec3};
use crate::mesh::{element_values, ElementSpace, MeshId, MeshSource};

/// Space a delta matrix is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeltaFrame {
    /// Group-local: pivot at the origin, axes along the group basis
    #[default]
    Group,
    /// Pivot at the origin, world axes (the group basis is ignored)
    PivotOnly,
}

/// A per-tick transform produced by a tool
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Delta {
    pub matrix: Mat4,
    pub frame: DeltaFrame,
}

impl Default for Delta {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Delta {
    pub const IDENTITY: Delta = Delta { matrix: Mat4::IDENTITY, frame: DeltaFrame::Group };

    pub fn translation(offset: Vec3) -> Self {
        Self { matrix: Mat4::from_translation(offset), frame: DeltaFrame::Group }
    }

    pub fn rotation(rotation: Quat) -> Self {
        Self { matrix: Mat4::from_quat(rotation), frame: DeltaFrame::Group }
    }

    pub fn scale(scale: Vec3) -> Self {
        Self { matrix: Mat4::from_scale(scale), frame: DeltaFrame::Group }
    }

    /// Change the frame (builder pattern)
    pub fn in_frame(mut self, frame: DeltaFrame) -> Self {
        self.frame = frame;
        self
    }

    pub fn is_finite(&self) -> bool {
        self.matrix.is_finite()
    }

    /// Full world-space matrix for one group
    pub fn for_group(&self, group: &ElementGroup) -> Mat4 {
        match self.frame {
            DeltaFrame::Group => group.post_apply_matrix() * self.matrix * group.pre_apply_matrix(),
            DeltaFrame::PivotOnly => {
                Mat4::from_translation(group.pivot)
                    * self.matrix
                    * Mat4::from_translation(-group.pivot)
            }
        }
    }
}

/// Original values of one mesh, captured at edit begin
#[derive(Debug, Clone)]
pub struct MeshSnapshot {
    mesh: MeshId,
    space: ElementSpace,
    groups: Vec<ElementGroup>,
    /// Edit-space value of every element (world positions or `(u, v, 0)`)
    origins: Vec<Vec3>,
}

impl MeshSnapshot {
    /// Capture the current values of a grouped mesh. `None` if the mesh no
    /// longer resolves.
    pub fn capture(groups: &MeshGroups, meshes: &dyn MeshSource, space: ElementSpace) -> Option<Self> {
        let mesh = meshes.mesh(groups.mesh)?;
        Some(Self {
            mesh: groups.mesh,
            space,
            groups: groups.groups.clone(),
            origins: element_values(mesh, space),
        })
    }

    pub fn mesh(&self) -> MeshId {
        self.mesh
    }

    pub fn space(&self) -> ElementSpace {
        self.space
    }

    pub fn groups(&self) -> &[ElementGroup] {
        &self.groups
    }

    pub fn origins(&self) -> &[Vec3] {
        &self.origins
    }

    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }
}

/// Outcome of one apply pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub meshes_updated: usize,
    /// Meshes that no longer resolve or whose arrays changed length
    pub meshes_skipped: usize,
    /// Groups whose composed matrix produced non-finite values
    pub groups_skipped: usize,
    pub elements_written: usize,
}

impl ApplyReport {
    /// True when every mesh and group was written
    pub fn is_complete(&self) -> bool {
        self.meshes_skipped == 0 && self.groups_skipped == 0
    }
}

/// Applies deltas to a captured set of meshes
#[derive(Debug, Clone, Default)]
pub struct TransformApplier {
    snapshots: Vec<MeshSnapshot>,
}

impl TransformApplier {
    /// Snapshot every mesh in `groups`. Meshes that no longer resolve are
    /// left out; an empty selection yields `EmptySelection`.
    pub fn capture(
        groups: &[MeshGroups],
        meshes: &dyn MeshSource,
        space: ElementSpace,
    ) -> Result<Self, HandleError> {
        let mut snapshots = Vec::with_capacity(groups.len());
        for mesh_groups in groups {
            if mesh_groups.groups.is_empty() {
                continue;
            }
            match MeshSnapshot::capture(mesh_groups, meshes, space) {
                Some(snapshot) => snapshots.push(snapshot),
                None => log::warn!("{}", HandleError::StaleMeshReference(mesh_groups.mesh)),
            }
        }

        if snapshots.is_empty() {
            return Err(HandleError::EmptySelection);
        }

        log::debug!(
            "captured {} mesh snapshot(s) in {} space",
            snapshots.len(),
            space.label()
        );
        Ok(Self { snapshots })
    }

    pub fn snapshots(&self) -> &[MeshSnapshot] {
        &self.snapshots
    }

    pub fn meshes(&self) -> Vec<MeshId> {
        self.snapshots.iter().map(|s| s.mesh).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Rebuild every captured mesh from its snapshot with `delta` applied
    pub fn apply(&self, delta: &Delta, meshes: &mut dyn MeshSource) -> ApplyReport {
        let mut report = ApplyReport::default();

        for snapshot in &self.snapshots {
            match apply_snapshot(snapshot, delta, meshes, &mut report) {
                Ok(()) => report.meshes_updated += 1,
                Err(err) => {
                    log::warn!("skipping mesh {}: {}", snapshot.mesh, err);
                    report.meshes_skipped += 1;
                }
            }
        }

        log::trace!(
            "apply: {} mesh(es), {} element(s), {} group(s) skipped",
            report.meshes_updated,
            report.elements_written,
            report.groups_skipped
        );
        report
    }

    /// Write the original values back
    pub fn restore(&self, meshes: &mut dyn MeshSource) -> ApplyReport {
        self.apply(&Delta::IDENTITY, meshes)
    }
}

fn apply_snapshot(
    snapshot: &MeshSnapshot,
    delta: &Delta,
    meshes: &mut dyn MeshSource,
    report: &mut ApplyReport,
) -> Result<(), HandleError> {
    let mesh = meshes
        .mesh_mut(snapshot.mesh)
        .ok_or(HandleError::StaleMeshReference(snapshot.mesh))?;

    let actual = mesh.element_count(snapshot.space);
    if actual != snapshot.origins.len() {
        return Err(HandleError::SnapshotMismatch {
            mesh: snapshot.mesh,
            expected: snapshot.origins.len(),
            actual,
        });
    }

    // Compute every group first so a bad group leaves its elements untouched
    let mut writes: Vec<(usize, Vec3)> = Vec::new();
    for group in &snapshot.groups {
        let matrix = delta.for_group(group);
        let values: Vec<(usize, Vec3)> = group
            .indices
            .iter()
            .filter_map(|&i| snapshot.origins.get(i).map(|&o| (i, matrix.transform_point3(o))))
            .collect();

        if !matrix.is_finite() || values.iter().any(|(_, v)| !v.is_finite()) {
            let err = HandleError::InvalidDelta {
                reason: format!("non-finite result for group at {:?}", group.pivot),
            };
            log::warn!("mesh {}: {}", snapshot.mesh, err);
            report.groups_skipped += 1;
            continue;
        }
        writes.extend(values);
    }

    if writes.is_empty() {
        return Ok(());
    }

    match snapshot.space {
        ElementSpace::Position => {
            let world_to_local = mesh.world_to_local();
            let positions = mesh.positions_mut();
            for &(i, world) in &writes {
                positions[i] = world_to_local.transform_point3(world);
            }
            mesh.refresh_uvs();
            mesh.refresh_normals();
        }
        ElementSpace::Uv => {
            let uvs = mesh.uvs_mut();
            for &(i, value) in &writes {
                uvs[i] = value.truncate();
            }
        }
    }

    report.elements_written += writes.len();
    Ok(())
}
