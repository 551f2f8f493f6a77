//! Element groups
//!
//! An element group is the unit a delta is applied to: a set of
//! coincidence-expanded element indices sharing one pivot and one orientation
//! basis. The pivot policy decides how many groups a selection produces, the
//! orientation policy decides each group's basis.
//!
//! Each group carries two matrices:
//! - `post_apply` - group-local to world (`translate(pivot) * rotate(basis)`)
//! - `pre_apply` - world to group-local (inverse of `post_apply`)
//!
//! A delta `D` moves an edit-space value `p` to `post_apply * D * pre_apply * p`.

use serde::{Deserialize, Serialize};

use crate::coincident::{resolve_coincident, split_into_clusters};
use crate::config::TransformConfig;
use crate::error::HandleError;
use crate::math::{average, look_rotation, Aabb, Mat4, Quat, Vec3};
use crate::mesh::{element_values, ElementSpace, MeshHandle, MeshId, MeshSource};
use crate::selection::Selection;

/// Where the pivot of a group sits and how many groups a selection makes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PivotPoint {
    /// One group for the whole multi-mesh selection, pivot at its world bounds center
    #[default]
    WorldBoundingBoxCenter,
    /// One group per mesh, pivot at the center of the selection's local bounds
    ModelBoundingBoxCenter,
    /// One group per welded vertex cluster, pivot at the cluster's average
    IndividualOrigins,
}

impl PivotPoint {
    pub fn label(&self) -> &'static str {
        match self {
            PivotPoint::WorldBoundingBoxCenter => "Center",
            PivotPoint::ModelBoundingBoxCenter => "Model Center",
            PivotPoint::IndividualOrigins => "Individual Origins",
        }
    }
}

/// Basis used to orient a group's frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HandleOrientation {
    /// World axes
    #[default]
    Global,
    /// The mesh's own rotation
    Local,
    /// Averaged surface normal of the group, falling back to `Local`
    Normal,
}

impl HandleOrientation {
    pub fn label(&self) -> &'static str {
        match self {
            HandleOrientation::Global => "Global",
            HandleOrientation::Local => "Local",
            HandleOrientation::Normal => "Normal",
        }
    }
}

/// Selected elements sharing one pivot frame
#[derive(Debug, Clone, PartialEq)]
pub struct ElementGroup {
    pub indices: Vec<usize>,
    pub pivot: Vec3,
    pub rotation: Quat,
    pre_apply: Mat4,
    post_apply: Mat4,
}

impl ElementGroup {
    pub fn new(indices: Vec<usize>, pivot: Vec3, rotation: Quat) -> Self {
        let post_apply = Mat4::from_rotation_translation(rotation, pivot);
        Self {
            indices,
            pivot,
            rotation,
            pre_apply: post_apply.inverse(),
            post_apply,
        }
    }

    /// World (edit space) to group-local
    pub fn pre_apply_matrix(&self) -> Mat4 {
        self.pre_apply
    }

    /// Group-local to world (edit space)
    pub fn post_apply_matrix(&self) -> Mat4 {
        self.post_apply
    }

    /// Re-home this group onto another frame, keeping its indices
    fn with_frame(self, pivot: Vec3, rotation: Quat) -> Self {
        Self::new(self.indices, pivot, rotation)
    }
}

/// The element groups of one mesh
#[derive(Debug, Clone, PartialEq)]
pub struct MeshGroups {
    pub mesh: MeshId,
    pub groups: Vec<ElementGroup>,
}

impl MeshGroups {
    pub fn element_count(&self) -> usize {
        self.groups.iter().map(|g| g.indices.len()).sum()
    }
}

/// Position and rotation a handle is drawn with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleFrame {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for HandleFrame {
    fn default() -> Self {
        Self { position: Vec3::ZERO, rotation: Quat::IDENTITY }
    }
}

/// Resolve the selection, dropping indices outside the element array
fn resolve_indices(mesh: &dyn MeshHandle, selected: &[usize], space: ElementSpace) -> Vec<usize> {
    let count = mesh.element_count(space);
    let mut resolved = resolve_coincident(mesh.coincident(), selected, space.collects_coincident());
    resolved.retain(|&i| i < count);
    resolved
}

/// Sum of world-space normals over the given vertices
fn world_normal_sum(mesh: &dyn MeshHandle, indices: &[usize]) -> Vec3 {
    // Normals transform by the inverse transpose
    let normal_matrix = mesh.world_to_local().transpose();
    let normals = mesh.normals();
    indices
        .iter()
        .filter_map(|&i| normals.get(i))
        .map(|&n| normal_matrix.transform_vector3(n).normalize_or_zero())
        .fold(Vec3::ZERO, |acc, n| acc + n)
}

/// Rotation for a normal-aligned frame, or `None` when the normals cancel out
fn normal_rotation(normal_sum: Vec3, mesh_rotation: Quat) -> Option<Quat> {
    if normal_sum.length_squared() < crate::math::DEGENERATE_EPSILON {
        return None;
    }
    look_rotation(normal_sum, mesh_rotation * Vec3::Y)
}

/// Orientation basis for a set of elements in one mesh
pub fn orientation_basis(
    mesh: &dyn MeshHandle,
    indices: &[usize],
    orientation: HandleOrientation,
    space: ElementSpace,
) -> Quat {
    // UV space has no mesh rotation to follow
    if space == ElementSpace::Uv {
        return Quat::IDENTITY;
    }

    match orientation {
        HandleOrientation::Global => Quat::IDENTITY,
        HandleOrientation::Local => mesh.world_rotation(),
        HandleOrientation::Normal => {
            let rotation = mesh.world_rotation();
            match normal_rotation(world_normal_sum(mesh, indices), rotation) {
                Some(basis) => basis,
                None => {
                    let err = HandleError::DegenerateFrame {
                        reason: format!("zero-length normal on mesh {}", mesh.id()),
                    };
                    log::debug!("{}, using local orientation", err);
                    rotation
                }
            }
        }
    }
}

/// Partition one mesh's selection into element groups
///
/// With `WorldBoundingBoxCenter` the single group's pivot is this mesh's world
/// bounds center; `build_selection_groups` widens it to the whole selection.
/// An empty selection produces no groups.
pub fn build_element_groups(
    mesh: &dyn MeshHandle,
    selected: &[usize],
    pivot_point: PivotPoint,
    orientation: HandleOrientation,
    space: ElementSpace,
) -> Vec<ElementGroup> {
    let resolved = resolve_indices(mesh, selected, space);
    if resolved.is_empty() {
        return Vec::new();
    }

    let values = element_values(mesh, space);
    let value_at = |i: usize| values[i];

    match pivot_point {
        PivotPoint::IndividualOrigins => {
            let clusters = if space.collects_coincident() {
                split_into_clusters(mesh.coincident(), &resolved)
            } else {
                resolved.iter().map(|&i| vec![i]).collect()
            };

            clusters
                .into_iter()
                .filter_map(|cluster| {
                    let pivot = average(cluster.iter().map(|&i| value_at(i)))?;
                    let rotation = orientation_basis(mesh, &cluster, orientation, space);
                    Some(ElementGroup::new(cluster, pivot, rotation))
                })
                .collect()
        }

        PivotPoint::ModelBoundingBoxCenter => {
            let pivot = match space {
                ElementSpace::Position => {
                    let positions = mesh.positions();
                    let local = Aabb::from_points(resolved.iter().map(|&i| positions[i]));
                    local.map(|b| mesh.local_to_world().transform_point3(b.center()))
                }
                ElementSpace::Uv => {
                    Aabb::from_points(resolved.iter().map(|&i| value_at(i))).map(|b| b.center())
                }
            };
            let Some(pivot) = pivot else {
                return Vec::new();
            };
            let rotation = orientation_basis(mesh, &resolved, orientation, space);
            vec![ElementGroup::new(resolved, pivot, rotation)]
        }

        PivotPoint::WorldBoundingBoxCenter => {
            let Some(bounds) = Aabb::from_points(resolved.iter().map(|&i| value_at(i))) else {
                return Vec::new();
            };
            let rotation = orientation_basis(mesh, &resolved, orientation, space);
            vec![ElementGroup::new(resolved, bounds.center(), rotation)]
        }
    }
}

/// Build element groups for every mesh in a selection
///
/// Meshes that no longer resolve are skipped. With `WorldBoundingBoxCenter`
/// every mesh's group is re-homed onto one shared frame: pivot at the world
/// bounds center of the entire selection, basis from the first mesh (or the
/// selection-wide average normal for `Normal`).
pub fn build_selection_groups(
    selection: &Selection,
    meshes: &dyn MeshSource,
    config: &TransformConfig,
    space: ElementSpace,
) -> Vec<MeshGroups> {
    let mut result = Vec::new();

    for entry in selection.entries() {
        let Some(mesh) = meshes.mesh(entry.mesh) else {
            log::warn!("{}", HandleError::StaleMeshReference(entry.mesh));
            continue;
        };
        let groups = build_element_groups(
            mesh,
            &entry.indices,
            config.pivot_point,
            config.orientation,
            space,
        );
        if !groups.is_empty() {
            result.push(MeshGroups { mesh: entry.mesh, groups });
        }
    }

    if config.pivot_point == PivotPoint::WorldBoundingBoxCenter && result.len() > 1 {
        if let Some((pivot, rotation)) = shared_world_frame(&result, meshes, config.orientation, space) {
            for mesh_groups in &mut result {
                mesh_groups.groups = std::mem::take(&mut mesh_groups.groups)
                    .into_iter()
                    .map(|g| g.with_frame(pivot, rotation))
                    .collect();
            }
        }
    }

    log::debug!(
        "built {} element group(s) over {} mesh(es) ({:?}, {:?})",
        result.iter().map(|m| m.groups.len()).sum::<usize>(),
        result.len(),
        config.pivot_point,
        config.orientation,
    );

    result
}

/// Pivot and basis shared by all meshes under `WorldBoundingBoxCenter`
fn shared_world_frame(
    groups: &[MeshGroups],
    meshes: &dyn MeshSource,
    orientation: HandleOrientation,
    space: ElementSpace,
) -> Option<(Vec3, Quat)> {
    let mut bounds: Option<Aabb> = None;
    let mut normal_sum = Vec3::ZERO;
    let mut first_rotation: Option<Quat> = None;

    for mesh_groups in groups {
        let Some(mesh) = meshes.mesh(mesh_groups.mesh) else {
            continue;
        };
        let values = element_values(mesh, space);
        for group in &mesh_groups.groups {
            if let Some(b) = Aabb::from_points(group.indices.iter().map(|&i| values[i])) {
                bounds = Some(match bounds {
                    Some(acc) => acc.merge(&b),
                    None => b,
                });
            }
            if space == ElementSpace::Position && orientation == HandleOrientation::Normal {
                normal_sum += world_normal_sum(mesh, &group.indices);
            }
        }
        first_rotation.get_or_insert_with(|| mesh.world_rotation());
    }

    let pivot = bounds?.center();
    let local = first_rotation.unwrap_or(Quat::IDENTITY);
    let rotation = match (space, orientation) {
        (ElementSpace::Uv, _) | (_, HandleOrientation::Global) => Quat::IDENTITY,
        (_, HandleOrientation::Local) => local,
        (_, HandleOrientation::Normal) => normal_rotation(normal_sum, local).unwrap_or(local),
    };
    Some((pivot, rotation))
}

/// Pose a handle should take for these groups before an edit starts
pub fn handle_frame(groups: &[MeshGroups]) -> Option<HandleFrame> {
    let mut pivots = groups.iter().flat_map(|m| m.groups.iter().map(|g| g.pivot));
    let first = pivots.next()?;
    let mut bounds = Aabb::from_point(first);
    for p in pivots {
        bounds.extend(p);
    }

    let rotation = groups
        .iter()
        .flat_map(|m| m.groups.first())
        .map(|g| g.rotation)
        .next()
        .unwrap_or(Quat::IDENTITY);

    Some(HandleFrame { position: bounds.center(), rotation })
}
