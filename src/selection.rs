//! Element selection supplied by the host
//!
//! The engine never decides what is selected. A `SelectionProvider` hands it
//! the current `(mesh, indices)` list together with the transform config, and
//! bumps a revision number whenever either changes so cached element groups
//! can be rebuilt.

use serde::{Deserialize, Serialize};

use crate::config::TransformConfig;
use crate::mesh::MeshId;

/// Selected element indices of one mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshSelection {
    pub mesh: MeshId,
    pub indices: Vec<usize>,
}

impl MeshSelection {
    pub fn new(mesh: MeshId, indices: impl Into<Vec<usize>>) -> Self {
        Self { mesh, indices: indices.into() }
    }
}

/// Ordered set of per-mesh selections
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    entries: Vec<MeshSelection>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add indices for a mesh, merging with an existing entry for it
    pub fn add(&mut self, mesh: MeshId, indices: &[usize]) {
        match self.entries.iter_mut().find(|e| e.mesh == mesh) {
            Some(entry) => {
                for &i in indices {
                    if !entry.indices.contains(&i) {
                        entry.indices.push(i);
                    }
                }
            }
            None => self.entries.push(MeshSelection::new(mesh, indices.to_vec())),
        }
    }

    /// Add indices (builder pattern)
    pub fn with(mut self, mesh: MeshId, indices: &[usize]) -> Self {
        self.add(mesh, indices);
        self
    }

    pub fn entries(&self) -> &[MeshSelection] {
        &self.entries
    }

    pub fn meshes(&self) -> impl Iterator<Item = MeshId> + '_ {
        self.entries.iter().map(|e| e.mesh)
    }

    /// Total number of selected indices across meshes
    pub fn element_count(&self) -> usize {
        self.entries.iter().map(|e| e.indices.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.element_count() == 0
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Source of the current selection and configuration
pub trait SelectionProvider {
    fn selection(&self) -> &Selection;

    fn config(&self) -> TransformConfig;

    /// Changes whenever the selection or config changes
    fn revision(&self) -> u64;
}

/// A plain `SelectionProvider` that tracks its own revision
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    selection: Selection,
    config: TransformConfig,
    revision: u64,
}

impl SelectionState {
    pub fn new(selection: Selection, config: TransformConfig) -> Self {
        Self { selection, config, revision: 0 }
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
        self.revision += 1;
    }

    pub fn set_config(&mut self, config: TransformConfig) {
        if config != self.config {
            self.config = config;
            self.revision += 1;
        }
    }

    /// Mutate the selection in place; always bumps the revision
    pub fn update_selection(&mut self, f: impl FnOnce(&mut Selection)) {
        f(&mut self.selection);
        self.revision += 1;
    }
}

impl SelectionProvider for SelectionState {
    fn selection(&self) -> &Selection {
        &self.selection
    }

    fn config(&self) -> TransformConfig {
        self.config
    }

    fn revision(&self) -> u64 {
        self.revision
    }
}
