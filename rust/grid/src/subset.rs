// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subset classification of grid elements.
//!
//! Every element may be assigned to at most one subset, identified by its
//! index in the handler's ordered subset list. Unassigned elements report
//! `None`.

use serde::{Deserialize, Serialize};
use slotmap::SecondaryMap;

use crate::error::{Error, Result};
use crate::keys::*;

/// Display properties of one subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsetInfo {
    pub name: String,
    /// RGBA, components in `0.0..=1.0`.
    pub color: [f32; 4],
    pub visible: bool,
}

impl SubsetInfo {
    pub fn new(name: impl Into<String>, color: [f32; 4]) -> Self {
        Self {
            name: name.into(),
            color,
            visible: true,
        }
    }
}

// Cycled through for subsets created without an explicit color.
const PALETTE: [[f32; 4]; 6] = [
    [0.8, 0.8, 0.8, 1.0],
    [0.9, 0.4, 0.3, 1.0],
    [0.3, 0.7, 0.4, 1.0],
    [0.3, 0.5, 0.9, 1.0],
    [0.9, 0.8, 0.3, 1.0],
    [0.7, 0.4, 0.8, 1.0],
];

/// Assigns grid elements to subsets.
#[derive(Debug, Clone, Default)]
pub struct SubsetHandler {
    infos: Vec<SubsetInfo>,
    vertices: SecondaryMap<VertexKey, usize>,
    edges: SecondaryMap<EdgeKey, usize>,
    faces: SecondaryMap<FaceKey, usize>,
    volumes: SecondaryMap<VolumeKey, usize>,
}

impl SubsetHandler {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Subset list ---

    /// Appends a subset and returns its index.
    pub fn add_subset(&mut self, info: SubsetInfo) -> usize {
        self.infos.push(info);
        self.infos.len() - 1
    }

    pub fn num_subsets(&self) -> usize {
        self.infos.len()
    }

    pub fn subset(&self, index: usize) -> Option<&SubsetInfo> {
        self.infos.get(index)
    }

    pub fn subset_mut(&mut self, index: usize) -> Result<&mut SubsetInfo> {
        let count = self.infos.len();
        self.infos
            .get_mut(index)
            .ok_or(Error::SubsetOutOfRange { index, count })
    }

    pub fn subsets(&self) -> &[SubsetInfo] {
        &self.infos
    }

    /// Returns `false` for indices without a subset.
    pub fn is_visible(&self, index: usize) -> bool {
        self.infos.get(index).is_some_and(|s| s.visible)
    }

    pub fn set_visible(&mut self, index: usize, visible: bool) -> Result<()> {
        self.subset_mut(index)?.visible = visible;
        Ok(())
    }

    /// Grows the subset list so that `index` exists, naming new subsets
    /// after their index.
    fn ensure_subset(&mut self, index: usize) {
        while self.infos.len() <= index {
            let i = self.infos.len();
            self.infos
                .push(SubsetInfo::new(format!("subset {i}"), PALETTE[i % PALETTE.len()]));
        }
    }

    // --- Element assignment ---

    /// Assigns an element to a subset, creating missing subsets up to `index`.
    pub fn assign(&mut self, key: ElementKey, index: usize) {
        self.ensure_subset(index);
        match key {
            ElementKey::Vertex(k) => {
                self.vertices.insert(k, index);
            }
            ElementKey::Edge(k) => {
                self.edges.insert(k, index);
            }
            ElementKey::Face(k) => {
                self.faces.insert(k, index);
            }
            ElementKey::Volume(k) => {
                self.volumes.insert(k, index);
            }
        }
    }

    pub fn unassign(&mut self, key: ElementKey) {
        match key {
            ElementKey::Vertex(k) => {
                self.vertices.remove(k);
            }
            ElementKey::Edge(k) => {
                self.edges.remove(k);
            }
            ElementKey::Face(k) => {
                self.faces.remove(k);
            }
            ElementKey::Volume(k) => {
                self.volumes.remove(k);
            }
        }
    }

    /// Subset index of an element, `None` if unassigned.
    pub fn subset_of(&self, key: ElementKey) -> Option<usize> {
        match key {
            ElementKey::Vertex(k) => self.vertices.get(k).copied(),
            ElementKey::Edge(k) => self.edges.get(k).copied(),
            ElementKey::Face(k) => self.faces.get(k).copied(),
            ElementKey::Volume(k) => self.volumes.get(k).copied(),
        }
    }

    #[inline]
    pub fn vertex_subset(&self, key: VertexKey) -> Option<usize> {
        self.vertices.get(key).copied()
    }

    #[inline]
    pub fn edge_subset(&self, key: EdgeKey) -> Option<usize> {
        self.edges.get(key).copied()
    }

    #[inline]
    pub fn face_subset(&self, key: FaceKey) -> Option<usize> {
        self.faces.get(key).copied()
    }

    #[inline]
    pub fn volume_subset(&self, key: VolumeKey) -> Option<usize> {
        self.volumes.get(key).copied()
    }

    // --- Iteration by subset (slot order) ---

    pub fn vertices_in(&self, index: usize) -> impl Iterator<Item = VertexKey> + '_ {
        self.vertices
            .iter()
            .filter(move |&(_, &s)| s == index)
            .map(|(k, _)| k)
    }

    pub fn edges_in(&self, index: usize) -> impl Iterator<Item = EdgeKey> + '_ {
        self.edges
            .iter()
            .filter(move |&(_, &s)| s == index)
            .map(|(k, _)| k)
    }

    pub fn faces_in(&self, index: usize) -> impl Iterator<Item = FaceKey> + '_ {
        self.faces
            .iter()
            .filter(move |&(_, &s)| s == index)
            .map(|(k, _)| k)
    }

    pub fn volumes_in(&self, index: usize) -> impl Iterator<Item = VolumeKey> + '_ {
        self.volumes
            .iter()
            .filter(move |&(_, &s)| s == index)
            .map(|(k, _)| k)
    }

    /// Number of elements of `kind` assigned to subset `index`.
    pub fn count_in(&self, kind: ElementKind, index: usize) -> usize {
        match kind {
            ElementKind::Vertex => self.vertices_in(index).count(),
            ElementKind::Edge => self.edges_in(index).count(),
            ElementKind::Face => self.faces_in(index).count(),
            ElementKind::Volume => self.volumes_in(index).count(),
        }
    }
}
