//! Id-keyed mesh collection

use std::collections::BTreeMap;

use crate::config::TransformConfig;

use super::{EditableMesh, MeshHandle, MeshId, MeshSource};

/// A set of editable meshes addressed by `MeshId`
#[derive(Debug, Clone, Default)]
pub struct MeshScene {
    meshes: BTreeMap<MeshId, EditableMesh>,
}

impl MeshScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a mesh; returns its id
    pub fn insert(&mut self, mesh: EditableMesh) -> MeshId {
        let id = mesh.id();
        self.meshes.insert(id, mesh);
        id
    }

    pub fn remove(&mut self, id: MeshId) -> Option<EditableMesh> {
        self.meshes.remove(&id)
    }

    pub fn get(&self, id: MeshId) -> Option<&EditableMesh> {
        self.meshes.get(&id)
    }

    pub fn get_mut(&mut self, id: MeshId) -> Option<&mut EditableMesh> {
        self.meshes.get_mut(&id)
    }

    /// Rebuild every mesh's weld table with the config's tolerance
    pub fn reweld(&mut self, config: &TransformConfig) {
        for mesh in self.meshes.values_mut() {
            mesh.reweld(config.coincident_epsilon);
        }
        log::debug!(
            "rewelded {} mesh(es) at epsilon {}",
            self.meshes.len(),
            config.coincident_epsilon
        );
    }

    pub fn ids(&self) -> impl Iterator<Item = MeshId> + '_ {
        self.meshes.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

impl MeshSource for MeshScene {
    fn mesh(&self, id: MeshId) -> Option<&dyn MeshHandle> {
        self.meshes.get(&id).map(|m| m as &dyn MeshHandle)
    }

    fn mesh_mut(&mut self, id: MeshId) -> Option<&mut dyn MeshHandle> {
        self.meshes.get_mut(&id).map(|m| m as &mut dyn MeshHandle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;

    #[test]
    fn test_lookup_and_remove() {
        let mut scene = MeshScene::new();
        let id = scene.insert(EditableMesh::plane(MeshId(5), 1.0));
        assert!(scene.mesh(id).is_some());
        assert_eq!(scene.len(), 1);

        scene.remove(id);
        assert!(scene.mesh(id).is_none());
        assert!(scene.mesh_mut(id).is_none());
    }

    #[test]
    fn test_reweld_uses_config_epsilon() {
        let mut scene = MeshScene::new();
        let positions = vec![Vec3::ZERO, Vec3::new(0.01, 0.0, 0.0)];
        let id = scene.insert(EditableMesh::new(MeshId(1), positions, vec![], vec![]));

        let mut config = TransformConfig::default();
        config.coincident_epsilon = 0.1;
        scene.reweld(&config);

        let mesh = scene.mesh(id).unwrap();
        assert_eq!(mesh.coincident().coincident_with(0), &[0, 1]);
    }
}
