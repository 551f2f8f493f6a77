//! Mesh access for the transform engine
//!
//! The engine never owns meshes. It sees them through `MeshHandle` (element
//! arrays, matrices, welds, refresh hooks) and looks them up by `MeshId`
//! through a `MeshSource` on every tick, so a mesh deleted mid-edit simply
//! stops resolving.
//!
//! - `editable` - `EditableMesh`, a complete in-memory `MeshHandle`
//! - `scene` - `MeshScene`, an id-keyed collection implementing `MeshSource`

mod editable;
mod scene;

pub use editable::{EditFace, EditableMesh, MeshTransform, UvProjection};
pub use scene::MeshScene;

use serde::{Deserialize, Serialize};

use crate::coincident::CoincidentIndex;
use crate::math::{matrix_lossy_scale, matrix_rotation, Mat4, Quat, Vec2, Vec3};

/// Stable identity of a mesh across ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MeshId(pub u64);

impl std::fmt::Display for MeshId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which element array a tool edits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementSpace {
    /// Vertex positions, edited in world space
    Position,
    /// Texture coordinates, edited in UV space
    Uv,
}

impl ElementSpace {
    pub fn label(&self) -> &'static str {
        match self {
            ElementSpace::Position => "Position",
            ElementSpace::Uv => "UV",
        }
    }

    /// Whether selections are expanded to welded neighbours in this space
    pub fn collects_coincident(&self) -> bool {
        matches!(self, ElementSpace::Position)
    }
}

/// A mesh the engine can read and write
///
/// Positions and normals are in mesh-local space. The engine assumes it is the
/// only writer while an edit is active.
pub trait MeshHandle {
    fn id(&self) -> MeshId;

    fn positions(&self) -> &[Vec3];
    fn positions_mut(&mut self) -> &mut [Vec3];

    fn uvs(&self) -> &[Vec2];
    fn uvs_mut(&mut self) -> &mut [Vec2];

    /// Per-vertex normals in local space (may be zero-length where undefined)
    fn normals(&self) -> &[Vec3];

    /// Mesh-local to world transform
    fn local_to_world(&self) -> Mat4;

    fn world_to_local(&self) -> Mat4 {
        self.local_to_world().inverse()
    }

    /// World rotation of the mesh with scale removed
    fn world_rotation(&self) -> Quat {
        matrix_rotation(&self.local_to_world())
    }

    /// Absolute world scale of the mesh
    fn lossy_scale(&self) -> Vec3 {
        matrix_lossy_scale(&self.local_to_world())
    }

    /// Welded vertex clusters
    fn coincident(&self) -> &CoincidentIndex;

    /// Recompute automatically projected UVs after positions moved
    fn refresh_uvs(&mut self);

    /// Recompute per-vertex normals
    fn refresh_normals(&mut self);

    /// Full refresh at the end of an edit (normals and bounds)
    fn refresh(&mut self);

    /// Rebuild lazily computed caches
    fn optimize(&mut self);

    /// Length of the element array for a space
    fn element_count(&self, space: ElementSpace) -> usize {
        match space {
            ElementSpace::Position => self.positions().len(),
            ElementSpace::Uv => self.uvs().len(),
        }
    }
}

/// Every element of a mesh in edit space: world positions, or UVs as `(u, v, 0)`
pub fn element_values(mesh: &dyn MeshHandle, space: ElementSpace) -> Vec<Vec3> {
    match space {
        ElementSpace::Position => {
            let l2w = mesh.local_to_world();
            mesh.positions().iter().map(|&p| l2w.transform_point3(p)).collect()
        }
        ElementSpace::Uv => mesh.uvs().iter().map(|uv| uv.extend(0.0)).collect(),
    }
}

/// Id-based mesh lookup
///
/// Returning `None` is how a stale reference is reported.
pub trait MeshSource {
    fn mesh(&self, id: MeshId) -> Option<&dyn MeshHandle>;
    fn mesh_mut(&mut self, id: MeshId) -> Option<&mut dyn MeshHandle>;
}
