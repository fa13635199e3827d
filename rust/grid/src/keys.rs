// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element key types for arena-based storage.
//!
//! Each grid element gets a unique, type-safe key for O(1) lookup in the
//! arena. Keys are created by `slotmap::SlotMap` and remain valid even after
//! other elements are removed (generational indices).

use slotmap::new_key_type;

new_key_type! {
    /// Key for a vertex (point in 3D space).
    pub struct VertexKey;

    /// Key for an edge (line segment between two vertices).
    pub struct EdgeKey;

    /// Key for a face (triangle or quadrilateral).
    pub struct FaceKey;

    /// Key for a volume (tetrahedron, pyramid, prism or hexahedron).
    pub struct VolumeKey;
}

/// A key that can reference any grid element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementKey {
    Vertex(VertexKey),
    Edge(EdgeKey),
    Face(FaceKey),
    Volume(VolumeKey),
}

impl ElementKey {
    /// Returns the element kind of this key.
    pub fn kind(&self) -> ElementKind {
        match self {
            ElementKey::Vertex(_) => ElementKind::Vertex,
            ElementKey::Edge(_) => ElementKind::Edge,
            ElementKey::Face(_) => ElementKind::Face,
            ElementKey::Volume(_) => ElementKind::Volume,
        }
    }
}

/// Discriminant for grid element kinds, ordered by dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementKind {
    Vertex = 0,
    Edge = 1,
    Face = 2,
    Volume = 3,
}

impl ElementKind {
    /// All kinds, lowest dimension first.
    pub const ALL: [ElementKind; 4] = [
        ElementKind::Vertex,
        ElementKind::Edge,
        ElementKind::Face,
        ElementKind::Volume,
    ];

    /// Returns the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Vertex => "Vertex",
            ElementKind::Edge => "Edge",
            ElementKind::Face => "Face",
            ElementKind::Volume => "Volume",
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<VertexKey> for ElementKey {
    fn from(k: VertexKey) -> Self {
        ElementKey::Vertex(k)
    }
}

impl From<EdgeKey> for ElementKey {
    fn from(k: EdgeKey) -> Self {
        ElementKey::Edge(k)
    }
}

impl From<FaceKey> for ElementKey {
    fn from(k: FaceKey) -> Self {
        ElementKey::Face(k)
    }
}

impl From<VolumeKey> for ElementKey {
    fn from(k: VolumeKey) -> Self {
        ElementKey::Volume(k)
    }
}
