//! In-memory editable mesh
//!
//! N-gon faces over split vertex arrays (positions, UVs, normals), a local
//! transform, and a weld table. Implements `MeshHandle` so it can be edited by
//! the transform tools directly.

use serde::{Deserialize, Serialize};

use crate::coincident::CoincidentIndex;
use crate::math::{look_rotation, Aabb, Mat4, Quat, Vec2, Vec3};

use super::{MeshHandle, MeshId};

/// Weld tolerance used by the primitive constructors
pub const DEFAULT_WELD_EPSILON: f32 = 0.0001;

/// How a face gets its texture coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum UvProjection {
    /// UVs are authored; geometry edits leave them alone
    #[default]
    Manual,
    /// UVs are projected onto the face plane and follow the geometry
    Planar { scale: f32 },
}

/// N-gon face (3+ vertex indices, CW winding)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EditFace {
    pub vertices: Vec<usize>,
    #[serde(default)]
    pub uv: UvProjection,
}

impl EditFace {
    pub fn tri(v0: usize, v1: usize, v2: usize) -> Self {
        Self { vertices: vec![v0, v1, v2], uv: UvProjection::Manual }
    }

    pub fn quad(v0: usize, v1: usize, v2: usize, v3: usize) -> Self {
        Self { vertices: vec![v0, v1, v2, v3], uv: UvProjection::Manual }
    }

    pub fn ngon(vertices: &[usize]) -> Self {
        Self { vertices: vertices.to_vec(), uv: UvProjection::Manual }
    }

    /// Set UV projection (builder pattern)
    pub fn with_uv(mut self, uv: UvProjection) -> Self {
        self.uv = uv;
        self
    }

    /// Fan triangulation from the first vertex
    pub fn triangulate(&self) -> Vec<[usize; 3]> {
        let n = self.vertices.len();
        if n < 3 {
            return vec![];
        }
        (1..n - 1)
            .map(|i| [self.vertices[0], self.vertices[i], self.vertices[i + 1]])
            .collect()
    }
}

/// Local-to-world placement of a mesh
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for MeshTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl MeshTransform {
    pub fn from_translation(translation: Vec3) -> Self {
        Self { translation, ..Self::default() }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// Editable mesh with n-gon faces and a weld table
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EditableMesh {
    id: MeshId,
    positions: Vec<Vec3>,
    uvs: Vec<Vec2>,
    normals: Vec<Vec3>,
    pub faces: Vec<EditFace>,
    pub transform: MeshTransform,
    coincident: CoincidentIndex,
    /// Local bounds, rebuilt on demand
    #[serde(skip)]
    bounds: Option<Aabb>,
}

impl EditableMesh {
    /// Build a mesh, welding coincident positions and computing normals.
    /// Missing UVs are filled with zero.
    pub fn new(id: MeshId, positions: Vec<Vec3>, mut uvs: Vec<Vec2>, faces: Vec<EditFace>) -> Self {
        uvs.resize(positions.len(), Vec2::ZERO);
        let coincident = CoincidentIndex::from_positions(&positions, DEFAULT_WELD_EPSILON);
        let mut mesh = Self {
            id,
            normals: vec![Vec3::ZERO; positions.len()],
            positions,
            uvs,
            faces,
            transform: MeshTransform::default(),
            coincident,
            bounds: None,
        };
        mesh.refresh_normals();
        mesh
    }

    /// Replace the weld table (builder pattern)
    pub fn with_coincident(mut self, coincident: CoincidentIndex) -> Self {
        self.coincident = coincident;
        self
    }

    /// Rebuild the weld table with another tolerance (builder pattern)
    pub fn with_weld_epsilon(mut self, epsilon: f32) -> Self {
        self.reweld(epsilon);
        self
    }

    /// Rebuild the weld table from current positions
    pub fn reweld(&mut self, epsilon: f32) {
        self.coincident = CoincidentIndex::from_positions(&self.positions, epsilon);
    }

    /// Set the local-to-world transform (builder pattern)
    pub fn with_transform(mut self, transform: MeshTransform) -> Self {
        self.transform = transform;
        self
    }

    /// Single quad on the XZ plane, centered at origin
    pub fn plane(id: MeshId, size: f32) -> Self {
        let half = size / 2.0;
        let positions = vec![
            Vec3::new(-half, 0.0, -half),
            Vec3::new( half, 0.0, -half),
            Vec3::new( half, 0.0,  half),
            Vec3::new(-half, 0.0,  half),
        ];
        let uvs = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        Self::new(id, positions, uvs, vec![EditFace::quad(0, 1, 2, 3)])
    }

    /// Cube centered at origin with split faces (24 vertices, 8 welded corners)
    pub fn cube(id: MeshId, size: f32) -> Self {
        let half = size / 2.0;
        let positions = vec![
            // Front
            Vec3::new(-half, -half,  half), Vec3::new( half, -half,  half),
            Vec3::new( half,  half,  half), Vec3::new(-half,  half,  half),
            // Back
            Vec3::new( half, -half, -half), Vec3::new(-half, -half, -half),
            Vec3::new(-half,  half, -half), Vec3::new( half,  half, -half),
            // Top
            Vec3::new(-half,  half,  half), Vec3::new( half,  half,  half),
            Vec3::new( half,  half, -half), Vec3::new(-half,  half, -half),
            // Bottom
            Vec3::new(-half, -half, -half), Vec3::new( half, -half, -half),
            Vec3::new( half, -half,  half), Vec3::new(-half, -half,  half),
            // Right
            Vec3::new( half, -half,  half), Vec3::new( half, -half, -half),
            Vec3::new( half,  half, -half), Vec3::new( half,  half,  half),
            // Left
            Vec3::new(-half, -half, -half), Vec3::new(-half, -half,  half),
            Vec3::new(-half,  half,  half), Vec3::new(-half,  half, -half),
        ];
        let face_uvs = [
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 0.0),
        ];
        let uvs = (0..24).map(|i| face_uvs[i % 4]).collect();

        let faces = vec![
            EditFace::quad(0, 3, 2, 1),
            EditFace::quad(4, 7, 6, 5),
            EditFace::quad(8, 11, 10, 9),
            EditFace::quad(12, 15, 14, 13),
            EditFace::quad(16, 19, 18, 17),
            EditFace::quad(20, 23, 22, 21),
        ];

        Self::new(id, positions, uvs, faces)
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Face normal for CW-wound faces, area weighted (not normalized)
    fn face_area_normal(&self, face: &EditFace) -> Vec3 {
        let mut sum = Vec3::ZERO;
        for [a, b, c] in face.triangulate() {
            let (Some(&v0), Some(&v1), Some(&v2)) =
                (self.positions.get(a), self.positions.get(b), self.positions.get(c))
            else {
                continue;
            };
            // e2 x e1 gives the outward normal for CW winding
            sum += (v2 - v0).cross(v1 - v0);
        }
        sum
    }

    /// Unit face normal, `None` for degenerate faces
    pub fn face_normal(&self, face_idx: usize) -> Option<Vec3> {
        let face = self.faces.get(face_idx)?;
        let n = self.face_area_normal(face).normalize_or_zero();
        if n == Vec3::ZERO {
            None
        } else {
            Some(n)
        }
    }

    /// Local-space bounds of all vertices (cached until positions change)
    pub fn local_bounds(&mut self) -> Option<Aabb> {
        if self.bounds.is_none() {
            self.bounds = Aabb::from_points(self.positions.iter().copied());
        }
        self.bounds
    }

    /// Cached bounds without recomputing
    pub fn cached_bounds(&self) -> Option<Aabb> {
        self.bounds
    }

    fn project_planar_uvs(&mut self, face_idx: usize, scale: f32) {
        let Some(normal) = self.face_normal(face_idx) else {
            return;
        };
        let Some(basis) = look_rotation(normal, Vec3::Y) else {
            return;
        };
        let u_axis = basis * Vec3::X;
        let v_axis = basis * Vec3::Y;

        for &vi in &self.faces[face_idx].vertices {
            let Some(&p) = self.positions.get(vi) else {
                continue;
            };
            if let Some(uv) = self.uvs.get_mut(vi) {
                *uv = Vec2::new(p.dot(u_axis), p.dot(v_axis)) * scale;
            }
        }
    }
}

impl MeshHandle for EditableMesh {
    fn id(&self) -> MeshId {
        self.id
    }

    fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    fn positions_mut(&mut self) -> &mut [Vec3] {
        self.bounds = None;
        &mut self.positions
    }

    fn uvs(&self) -> &[Vec2] {
        &self.uvs
    }

    fn uvs_mut(&mut self) -> &mut [Vec2] {
        &mut self.uvs
    }

    fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    fn local_to_world(&self) -> Mat4 {
        self.transform.matrix()
    }

    fn coincident(&self) -> &CoincidentIndex {
        &self.coincident
    }

    fn refresh_uvs(&mut self) {
        for face_idx in 0..self.faces.len() {
            if let UvProjection::Planar { scale } = self.faces[face_idx].uv {
                self.project_planar_uvs(face_idx, scale);
            }
        }
    }

    fn refresh_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for face in &self.faces {
            let n = self.face_area_normal(face);
            for &vi in &face.vertices {
                if let Some(slot) = normals.get_mut(vi) {
                    *slot += n;
                }
            }
        }
        for n in &mut normals {
            *n = n.normalize_or_zero();
        }
        self.normals = normals;
    }

    fn refresh(&mut self) {
        self.refresh_normals();
        self.bounds = Aabb::from_points(self.positions.iter().copied());
    }

    fn optimize(&mut self) {
        self.local_bounds();
    }
}
