// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Adjacency traversal between grid elements.
//!
//! Downward traversal (volume → faces → edges → vertices) reads the element
//! data directly. Upward traversal (vertex → edges → faces → volumes) uses
//! the adjacency index maintained during construction.

use smallvec::SmallVec;

use crate::arena::Grid;
use crate::keys::*;

impl Grid {
    // --- Downward traversal ---

    /// Returns both endpoints of an edge.
    pub fn edge_vertices(&self, edge: EdgeKey) -> Option<[VertexKey; 2]> {
        self.edges.get(edge).map(|e| e.vertices())
    }

    /// Returns the corners of a face in winding order.
    pub fn face_vertices(&self, face: FaceKey) -> &[VertexKey] {
        self.faces.get(face).map_or(&[], |f| f.vertices.as_slice())
    }

    /// Returns the boundary edges of a face.
    pub fn face_edges(&self, face: FaceKey) -> &[EdgeKey] {
        self.faces.get(face).map_or(&[], |f| f.edges.as_slice())
    }

    /// Returns the corners of a volume.
    pub fn volume_vertices(&self, volume: VolumeKey) -> &[VertexKey] {
        self.volumes.get(volume).map_or(&[], |v| v.vertices.as_slice())
    }

    /// Returns the side faces of a volume.
    pub fn volume_faces(&self, volume: VolumeKey) -> &[FaceKey] {
        self.volumes.get(volume).map_or(&[], |v| v.faces.as_slice())
    }

    /// Returns the distinct edges of a volume, collected from its faces.
    pub fn volume_edges(&self, volume: VolumeKey) -> SmallVec<[EdgeKey; 12]> {
        let mut edges: SmallVec<[EdgeKey; 12]> = SmallVec::new();
        for &fk in self.volume_faces(volume) {
            for &ek in self.face_edges(fk) {
                if !edges.contains(&ek) {
                    edges.push(ek);
                }
            }
        }
        edges
    }

    /// Returns the vertices of any element. A vertex yields itself.
    pub fn element_vertices(&self, key: ElementKey) -> SmallVec<[VertexKey; 8]> {
        match key {
            ElementKey::Vertex(v) if self.vertices.contains_key(v) => SmallVec::from_slice(&[v]),
            ElementKey::Vertex(_) => SmallVec::new(),
            ElementKey::Edge(e) => self
                .edge_vertices(e)
                .map(|vs| SmallVec::from_slice(&vs))
                .unwrap_or_default(),
            ElementKey::Face(f) => SmallVec::from_slice(self.face_vertices(f)),
            ElementKey::Volume(v) => SmallVec::from_slice(self.volume_vertices(v)),
        }
    }

    // --- Upward traversal ---

    /// Returns the edges that use a vertex.
    pub fn edges_of_vertex(&self, vertex: VertexKey) -> &[EdgeKey] {
        self.vertex_to_edges
            .get(&vertex)
            .map_or(&[], |edges| edges.as_slice())
    }

    /// Returns the faces bounded by an edge.
    pub fn faces_of_edge(&self, edge: EdgeKey) -> &[FaceKey] {
        self.edge_to_faces
            .get(&edge)
            .map_or(&[], |faces| faces.as_slice())
    }

    /// Returns the volumes bounded by a face, in insertion order.
    pub fn volumes_of_face(&self, face: FaceKey) -> &[VolumeKey] {
        self.face_to_volumes
            .get(&face)
            .map_or(&[], |volumes| volumes.as_slice())
    }

    // --- Lookup ---

    /// Finds the edge between two vertices regardless of direction.
    pub fn find_edge(&self, a: VertexKey, b: VertexKey) -> Option<EdgeKey> {
        let key = if a <= b { (a, b) } else { (b, a) };
        self.edge_lookup.get(&key).copied()
    }

    /// Finds the face spanned by exactly the given vertex set.
    pub fn find_face(&self, vertices: &[VertexKey]) -> Option<FaceKey> {
        let mut key: SmallVec<[VertexKey; 4]> = vertices.iter().copied().collect();
        key.sort_unstable();
        self.face_lookup.get(&key).copied()
    }

    // --- Iteration ---

    pub fn vertex_keys(&self) -> impl Iterator<Item = VertexKey> + '_ {
        self.vertices.keys()
    }

    pub fn edge_keys(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        self.edges.keys()
    }

    pub fn face_keys(&self) -> impl Iterator<Item = FaceKey> + '_ {
        self.faces.keys()
    }

    pub fn volume_keys(&self) -> impl Iterator<Item = VolumeKey> + '_ {
        self.volumes.keys()
    }

    /// Iterates all keys of one kind as [`ElementKey`]s.
    pub fn element_keys(&self, kind: ElementKind) -> Box<dyn Iterator<Item = ElementKey> + '_> {
        match kind {
            ElementKind::Vertex => Box::new(self.vertices.keys().map(ElementKey::Vertex)),
            ElementKind::Edge => Box::new(self.edges.keys().map(ElementKey::Edge)),
            ElementKind::Face => Box::new(self.faces.keys().map(ElementKey::Face)),
            ElementKind::Volume => Box::new(self.volumes.keys().map(ElementKey::Volume)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_edge_face_chain() {
        let mut grid = Grid::new();
        let v0 = grid.add_vertex(0.0, 0.0, 0.0);
        let v1 = grid.add_vertex(1.0, 0.0, 0.0);
        let v2 = grid.add_vertex(0.0, 1.0, 0.0);
        let f = grid.add_triangle(v0, v1, v2).unwrap();

        assert_eq!(grid.edges_of_vertex(v0).len(), 2);
        let e = grid.find_edge(v1, v0).unwrap();
        assert_eq!(grid.faces_of_edge(e), &[f]);
        assert_eq!(grid.face_vertices(f), &[v0, v1, v2]);
        assert!(grid.volumes_of_face(f).is_empty());
    }

    #[test]
    fn volume_edges_are_distinct() {
        let mut grid = Grid::new();
        let v: Vec<_> = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]
            .iter()
            .map(|p| grid.add_vertex(p[0], p[1], p[2]))
            .collect();
        let t = grid.add_tetrahedron([v[0], v[1], v[2], v[3]]).unwrap();

        assert_eq!(grid.volume_faces(t).len(), 4);
        assert_eq!(grid.volume_edges(t).len(), 6);
        assert_eq!(grid.element_vertices(ElementKey::Volume(t)).len(), 4);
    }

    #[test]
    fn element_keys_by_kind() {
        let mut grid = Grid::new();
        let v0 = grid.add_vertex(0.0, 0.0, 0.0);
        let v1 = grid.add_vertex(1.0, 0.0, 0.0);
        grid.add_edge(v0, v1).unwrap();

        assert_eq!(grid.element_keys(ElementKind::Vertex).count(), 2);
        assert_eq!(grid.element_keys(ElementKind::Edge).count(), 1);
        assert_eq!(grid.element_keys(ElementKind::Face).count(), 0);
    }
}
