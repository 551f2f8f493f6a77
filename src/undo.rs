//! Undo checkpoints
//!
//! The engine only opens a checkpoint when an edit begins. Storing and
//! replaying state is the recorder's business.

use crate::mesh::MeshId;

/// Receives one checkpoint per edit, before any mesh is modified
pub trait UndoRecorder {
    fn begin_checkpoint(&mut self, meshes: &[MeshId], label: &str);
}

/// Recorder that drops every checkpoint
#[derive(Debug, Clone, Copy, Default)]
pub struct NoUndo;

impl UndoRecorder for NoUndo {
    fn begin_checkpoint(&mut self, _meshes: &[MeshId], _label: &str) {}
}

/// One recorded checkpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    pub label: String,
    pub meshes: Vec<MeshId>,
}

/// In-memory list of checkpoints, oldest dropped past `max_entries`
#[derive(Debug, Clone)]
pub struct CheckpointLog {
    entries: Vec<Checkpoint>,
    pub max_entries: usize,
}

impl Default for CheckpointLog {
    fn default() -> Self {
        Self { entries: Vec::new(), max_entries: 100 }
    }
}

impl CheckpointLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Checkpoint] {
        &self.entries
    }

    pub fn last(&self) -> Option<&Checkpoint> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl UndoRecorder for CheckpointLog {
    fn begin_checkpoint(&mut self, meshes: &[MeshId], label: &str) {
        self.entries.push(Checkpoint {
            label: label.to_string(),
            meshes: meshes.to_vec(),
        });

        while self.entries.len() > self.max_entries {
            self.entries.remove(0);
        }
    }
}
