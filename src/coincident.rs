//! Coincident vertex index
//!
//! Meshes split vertices along seams (one corner of a cube is three vertices
//! with different normals and UVs). For editing, every vertex sharing a
//! position is one weldable point. `CoincidentIndex` records those clusters
//! so a transform can never tear a seam open.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::math::Vec3;

/// Clusters of welded vertex indices plus a reverse lookup
///
/// Every index in `0..len` belongs to exactly one cluster; unwelded vertices
/// form singleton clusters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoincidentIndex {
    clusters: Vec<Vec<usize>>,
    lookup: Vec<usize>,
}

impl CoincidentIndex {
    /// Weld vertices whose positions lie within `epsilon` of each other
    pub fn from_positions(positions: &[Vec3], epsilon: f32) -> Self {
        let mut lookup = vec![usize::MAX; positions.len()];
        let mut clusters: Vec<Vec<usize>> = Vec::new();

        for i in 0..positions.len() {
            if lookup[i] != usize::MAX {
                continue;
            }
            let cluster_id = clusters.len();
            let mut cluster = vec![i];
            lookup[i] = cluster_id;

            for j in (i + 1)..positions.len() {
                if lookup[j] == usize::MAX && positions[i].distance(positions[j]) < epsilon {
                    lookup[j] = cluster_id;
                    cluster.push(j);
                }
            }
            clusters.push(cluster);
        }

        Self { clusters, lookup }
    }

    /// Build from an explicit shared-vertex table
    ///
    /// Indices `>= len` are dropped, an index listed twice stays in the first
    /// cluster that claims it, and any index not mentioned becomes a singleton.
    pub fn from_groups(groups: &[Vec<usize>], len: usize) -> Self {
        let mut lookup = vec![usize::MAX; len];
        let mut clusters: Vec<Vec<usize>> = Vec::new();

        for group in groups {
            let cluster_id = clusters.len();
            let members: Vec<usize> = group
                .iter()
                .copied()
                .filter(|&i| i < len && lookup[i] == usize::MAX)
                .collect();
            if members.is_empty() {
                continue;
            }
            for &i in &members {
                lookup[i] = cluster_id;
            }
            clusters.push(members);
        }

        for i in 0..len {
            if lookup[i] == usize::MAX {
                lookup[i] = clusters.len();
                clusters.push(vec![i]);
            }
        }

        Self { clusters, lookup }
    }

    /// Every vertex is its own cluster
    pub fn unwelded(len: usize) -> Self {
        Self::from_groups(&[], len)
    }

    /// Number of vertices covered
    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    /// Cluster id of a vertex
    pub fn cluster_of(&self, index: usize) -> Option<usize> {
        self.lookup.get(index).copied()
    }

    /// Vertices in a cluster
    pub fn cluster(&self, cluster_id: usize) -> &[usize] {
        self.clusters.get(cluster_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn clusters(&self) -> &[Vec<usize>] {
        &self.clusters
    }

    /// All vertices welded to `index`, including itself
    pub fn coincident_with(&self, index: usize) -> &[usize] {
        match self.cluster_of(index) {
            Some(c) => self.cluster(c),
            None => &[],
        }
    }
}

/// Expand selected indices to their full coincident sets
///
/// With `collect_coincident` off the selection is only deduplicated (texture
/// tools edit each UV independently). Indices outside the mesh are dropped.
/// The result is sorted, so it is stable for unchanged topology.
pub fn resolve_coincident(
    index: &CoincidentIndex,
    selected: &[usize],
    collect_coincident: bool,
) -> Vec<usize> {
    let mut result = BTreeSet::new();
    for &i in selected {
        if i >= index.len() {
            continue;
        }
        if collect_coincident {
            result.extend(index.coincident_with(i).iter().copied());
        } else {
            result.insert(i);
        }
    }
    result.into_iter().collect()
}

/// Split resolved indices into their coincident clusters, preserving the
/// order in which clusters first appear
pub fn split_into_clusters(index: &CoincidentIndex, resolved: &[usize]) -> Vec<Vec<usize>> {
    let mut order: Vec<usize> = Vec::new();
    let mut members: std::collections::HashMap<usize, Vec<usize>> = std::collections::HashMap::new();

    for &i in resolved {
        let Some(cluster) = index.cluster_of(i) else {
            continue;
        };
        let entry = members.entry(cluster).or_insert_with(|| {
            order.push(cluster);
            Vec::new()
        });
        entry.push(i);
    }

    order
        .into_iter()
        .filter_map(|c| members.remove(&c))
        .collect()
}
