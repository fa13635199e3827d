// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena-based storage for grid elements.
//!
//! The [`Grid`] is the central owner of all element data. Every element
//! (vertex, edge, face, volume) lives inside a slot map with stable,
//! generational keys. Upward adjacency indices enable traversal from a vertex
//! to the edges that use it, from an edge to its faces, and from a face to the
//! volumes it bounds.
//!
//! ## Non-manifold adjacency
//!
//! A face normally bounds zero, one or two volumes. Nothing prevents a third
//! volume from sharing it, so every consumer treats `volumes_of_face` as a
//! list of arbitrary length.

use nalgebra::Point3;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::keys::*;

/// Data stored for a vertex: a point in 3D space.
#[derive(Debug, Clone)]
pub struct VertexData {
    pub position: Point3<f64>,
}

/// Data stored for an edge: a line segment between two vertices.
#[derive(Debug, Clone)]
pub struct EdgeData {
    pub start: VertexKey,
    pub end: VertexKey,
}

impl EdgeData {
    /// Returns both endpoints in storage order.
    #[inline]
    pub fn vertices(&self) -> [VertexKey; 2] {
        [self.start, self.end]
    }
}

/// Data stored for a face: a triangle or quadrilateral.
///
/// `edges[i]` connects `vertices[i]` and `vertices[(i + 1) % n]`.
#[derive(Debug, Clone)]
pub struct FaceData {
    pub vertices: SmallVec<[VertexKey; 4]>,
    pub edges: SmallVec<[EdgeKey; 4]>,
}

impl FaceData {
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_triangle(&self) -> bool {
        self.vertices.len() == 3
    }

    #[inline]
    pub fn is_quadrilateral(&self) -> bool {
        self.vertices.len() == 4
    }
}

/// Supported volume element shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolumeShape {
    Tetrahedron,
    Pyramid,
    Prism,
    Hexahedron,
}

// Local face tables. Windings are outward for the reference orderings:
// base polygon counter-clockwise seen from above, apex/top above the base.
const TETRAHEDRON_FACES: &[&[usize]] = &[&[0, 2, 1], &[1, 2, 3], &[0, 3, 2], &[0, 1, 3]];
const PYRAMID_FACES: &[&[usize]] = &[&[0, 3, 2, 1], &[0, 1, 4], &[1, 2, 4], &[2, 3, 4], &[3, 0, 4]];
const PRISM_FACES: &[&[usize]] = &[
    &[0, 2, 1],
    &[3, 4, 5],
    &[0, 1, 4, 3],
    &[1, 2, 5, 4],
    &[2, 0, 3, 5],
];
const HEXAHEDRON_FACES: &[&[usize]] = &[
    &[0, 3, 2, 1],
    &[4, 5, 6, 7],
    &[0, 1, 5, 4],
    &[1, 2, 6, 5],
    &[2, 3, 7, 6],
    &[3, 0, 4, 7],
];

impl VolumeShape {
    /// Picks the shape from the number of corner vertices.
    pub fn from_vertex_count(count: usize) -> Option<Self> {
        match count {
            4 => Some(VolumeShape::Tetrahedron),
            5 => Some(VolumeShape::Pyramid),
            6 => Some(VolumeShape::Prism),
            8 => Some(VolumeShape::Hexahedron),
            _ => None,
        }
    }

    pub fn num_vertices(&self) -> usize {
        match self {
            VolumeShape::Tetrahedron => 4,
            VolumeShape::Pyramid => 5,
            VolumeShape::Prism => 6,
            VolumeShape::Hexahedron => 8,
        }
    }

    /// Local vertex indices of every side face.
    pub fn local_faces(&self) -> &'static [&'static [usize]] {
        match self {
            VolumeShape::Tetrahedron => TETRAHEDRON_FACES,
            VolumeShape::Pyramid => PYRAMID_FACES,
            VolumeShape::Prism => PRISM_FACES,
            VolumeShape::Hexahedron => HEXAHEDRON_FACES,
        }
    }
}

/// Data stored for a volume: its shape, corner vertices and side faces.
#[derive(Debug, Clone)]
pub struct VolumeData {
    pub shape: VolumeShape,
    pub vertices: SmallVec<[VertexKey; 8]>,
    pub faces: SmallVec<[FaceKey; 6]>,
}

/// The central arena that owns all grid elements and their adjacency indices.
///
/// # Example
///
/// ```
/// use meshview_grid::Grid;
///
/// let mut grid = Grid::new();
/// let v0 = grid.add_vertex(0.0, 0.0, 0.0);
/// let v1 = grid.add_vertex(1.0, 0.0, 0.0);
/// let v2 = grid.add_vertex(0.0, 1.0, 0.0);
/// grid.add_triangle(v0, v1, v2).unwrap();
///
/// assert_eq!(grid.vertex_count(), 3);
/// assert_eq!(grid.edge_count(), 3);
/// assert_eq!(grid.face_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Grid {
    // Element storage
    pub(crate) vertices: SlotMap<VertexKey, VertexData>,
    pub(crate) edges: SlotMap<EdgeKey, EdgeData>,
    pub(crate) faces: SlotMap<FaceKey, FaceData>,
    pub(crate) volumes: SlotMap<VolumeKey, VolumeData>,

    // Upward adjacency: child → parents, in insertion order
    pub(crate) vertex_to_edges: FxHashMap<VertexKey, SmallVec<[EdgeKey; 8]>>,
    pub(crate) edge_to_faces: FxHashMap<EdgeKey, SmallVec<[FaceKey; 4]>>,
    pub(crate) face_to_volumes: FxHashMap<FaceKey, SmallVec<[VolumeKey; 2]>>,

    // Sharing lookups keyed by sorted vertex keys
    pub(crate) edge_lookup: FxHashMap<(VertexKey, VertexKey), EdgeKey>,
    pub(crate) face_lookup: FxHashMap<SmallVec<[VertexKey; 4]>, FaceKey>,
}

impl Grid {
    /// Creates a new, empty grid.
    pub fn new() -> Self {
        Self {
            vertices: SlotMap::with_key(),
            edges: SlotMap::with_key(),
            faces: SlotMap::with_key(),
            volumes: SlotMap::with_key(),

            vertex_to_edges: FxHashMap::default(),
            edge_to_faces: FxHashMap::default(),
            face_to_volumes: FxHashMap::default(),

            edge_lookup: FxHashMap::default(),
            face_lookup: FxHashMap::default(),
        }
    }

    // --- Vertex access ---

    /// Returns the vertex data for the given key, or `None` if not found.
    pub fn vertex(&self, key: VertexKey) -> Option<&VertexData> {
        self.vertices.get(key)
    }

    /// Returns the number of vertices in the grid.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    // --- Edge access ---

    /// Returns the edge data for the given key, or `None` if not found.
    pub fn edge(&self, key: EdgeKey) -> Option<&EdgeData> {
        self.edges.get(key)
    }

    /// Returns the number of edges in the grid.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    // --- Face access ---

    /// Returns the face data for the given key, or `None` if not found.
    pub fn face(&self, key: FaceKey) -> Option<&FaceData> {
        self.faces.get(key)
    }

    /// Returns the number of faces in the grid.
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    // --- Volume access ---

    /// Returns the volume data for the given key, or `None` if not found.
    pub fn volume(&self, key: VolumeKey) -> Option<&VolumeData> {
        self.volumes.get(key)
    }

    /// Returns the number of volumes in the grid.
    pub fn volume_count(&self) -> usize {
        self.volumes.len()
    }

    /// Returns the number of elements of the given kind.
    pub fn count(&self, kind: ElementKind) -> usize {
        match kind {
            ElementKind::Vertex => self.vertices.len(),
            ElementKind::Edge => self.edges.len(),
            ElementKind::Face => self.faces.len(),
            ElementKind::Volume => self.volumes.len(),
        }
    }

    /// Returns `true` if the grid holds no element at all.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
            && self.edges.is_empty()
            && self.faces.is_empty()
            && self.volumes.is_empty()
    }

    // --- Element existence checks ---

    /// Returns `true` if the given key references a live element.
    pub fn contains(&self, key: ElementKey) -> bool {
        match key {
            ElementKey::Vertex(k) => self.vertices.contains_key(k),
            ElementKey::Edge(k) => self.edges.contains_key(k),
            ElementKey::Face(k) => self.faces.contains_key(k),
            ElementKey::Volume(k) => self.volumes.contains_key(k),
        }
    }

    // --- Adjacency index helpers ---

    /// Register that an edge uses a vertex (upward adjacency).
    pub(crate) fn link_vertex_edge(&mut self, vertex: VertexKey, edge: EdgeKey) {
        self.vertex_to_edges.entry(vertex).or_default().push(edge);
    }

    /// Register that a face uses an edge (upward adjacency).
    pub(crate) fn link_edge_face(&mut self, edge: EdgeKey, face: FaceKey) {
        let faces = self.edge_to_faces.entry(edge).or_default();
        if !faces.contains(&face) {
            faces.push(face);
        }
    }

    /// Register that a volume uses a face (upward adjacency).
    pub(crate) fn link_face_volume(&mut self, face: FaceKey, volume: VolumeKey) {
        let volumes = self.face_to_volumes.entry(face).or_default();
        if !volumes.contains(&volume) {
            volumes.push(volume);
        }
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}
