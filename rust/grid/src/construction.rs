// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Construction methods for grid elements.
//!
//! Every element is created through the grid, which ensures referential
//! integrity (all referenced vertices must exist), shares edges and faces
//! between neighbors, and maintains the upward adjacency index.

use nalgebra::Point3;
use smallvec::SmallVec;

use crate::arena::*;
use crate::error::{Error, Result};
use crate::keys::*;

#[inline]
fn sorted_pair(a: VertexKey, b: VertexKey) -> (VertexKey, VertexKey) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[inline]
fn sorted_face_key(vertices: &[VertexKey]) -> SmallVec<[VertexKey; 4]> {
    let mut key: SmallVec<[VertexKey; 4]> = vertices.iter().copied().collect();
    key.sort_unstable();
    key
}

/// First vertex that appears more than once.
fn repeated_vertex(vertices: &[VertexKey]) -> Option<VertexKey> {
    vertices
        .iter()
        .enumerate()
        .find(|&(i, v)| vertices[..i].contains(v))
        .map(|(_, &v)| v)
}

impl Grid {
    /// Adds a vertex at the given 3D coordinates.
    pub fn add_vertex(&mut self, x: f64, y: f64, z: f64) -> VertexKey {
        self.vertices.insert(VertexData {
            position: Point3::new(x, y, z),
        })
    }

    /// Moves a vertex. Cached data derived from positions (bounding spheres,
    /// normals) becomes stale and must be recomputed by the owner.
    pub fn set_position(&mut self, key: VertexKey, position: Point3<f64>) -> Result<()> {
        let vertex = self
            .vertices
            .get_mut(key)
            .ok_or(Error::VertexNotFound(key))?;
        vertex.position = position;
        Ok(())
    }

    /// Returns the edge between two vertices, creating it if necessary.
    ///
    /// Returns an error if either vertex does not exist or both are the same.
    pub fn add_edge(&mut self, start: VertexKey, end: VertexKey) -> Result<EdgeKey> {
        if !self.vertices.contains_key(start) {
            return Err(Error::VertexNotFound(start));
        }
        if !self.vertices.contains_key(end) {
            return Err(Error::VertexNotFound(end));
        }
        if start == end {
            return Err(Error::DegenerateEdge(start));
        }

        let lookup = sorted_pair(start, end);
        if let Some(&existing) = self.edge_lookup.get(&lookup) {
            return Ok(existing);
        }

        let key = self.edges.insert(EdgeData { start, end });
        self.edge_lookup.insert(lookup, key);
        self.link_vertex_edge(start, key);
        self.link_vertex_edge(end, key);
        Ok(key)
    }

    /// Returns the face spanned by the given vertices, creating it (and its
    /// edges) if no face with the same vertex set exists yet.
    ///
    /// The winding of a newly created face follows the vertex order. An
    /// existing face keeps the winding it was created with.
    pub fn add_face(&mut self, vertices: &[VertexKey]) -> Result<FaceKey> {
        if vertices.len() != 3 && vertices.len() != 4 {
            return Err(Error::UnsupportedFace(vertices.len()));
        }
        for &vk in vertices {
            if !self.vertices.contains_key(vk) {
                return Err(Error::VertexNotFound(vk));
            }
        }
        // checked before any edge is inserted so a failure leaves no trace
        if let Some(vk) = repeated_vertex(vertices) {
            return Err(Error::DegenerateFace(vk));
        }

        let lookup = sorted_face_key(vertices);
        if let Some(&existing) = self.face_lookup.get(&lookup) {
            return Ok(existing);
        }

        let n = vertices.len();
        let mut edges: SmallVec<[EdgeKey; 4]> = SmallVec::with_capacity(n);
        for i in 0..n {
            edges.push(self.add_edge(vertices[i], vertices[(i + 1) % n])?);
        }

        let key = self.faces.insert(FaceData {
            vertices: vertices.iter().copied().collect(),
            edges: edges.clone(),
        });
        self.face_lookup.insert(lookup, key);

        for ek in edges {
            self.link_edge_face(ek, key);
        }

        Ok(key)
    }

    /// Creates (or reuses) a triangle.
    pub fn add_triangle(&mut self, a: VertexKey, b: VertexKey, c: VertexKey) -> Result<FaceKey> {
        self.add_face(&[a, b, c])
    }

    /// Creates (or reuses) a quadrilateral.
    pub fn add_quadrilateral(
        &mut self,
        a: VertexKey,
        b: VertexKey,
        c: VertexKey,
        d: VertexKey,
    ) -> Result<FaceKey> {
        self.add_face(&[a, b, c, d])
    }

    /// Creates a volume from its corner vertices. The shape is derived from
    /// the vertex count; side faces are shared with neighboring volumes.
    pub fn add_volume(&mut self, vertices: &[VertexKey]) -> Result<VolumeKey> {
        let shape = VolumeShape::from_vertex_count(vertices.len())
            .ok_or(Error::UnsupportedVolume(vertices.len()))?;
        for &vk in vertices {
            if !self.vertices.contains_key(vk) {
                return Err(Error::VertexNotFound(vk));
            }
        }
        // distinct corners give every side face distinct corners as well
        if let Some(vk) = repeated_vertex(vertices) {
            return Err(Error::DegenerateVolume(vk));
        }

        let mut faces: SmallVec<[FaceKey; 6]> = SmallVec::new();
        for local in shape.local_faces() {
            let corners: SmallVec<[VertexKey; 4]> = local.iter().map(|&i| vertices[i]).collect();
            faces.push(self.add_face(&corners)?);
        }

        let key = self.volumes.insert(VolumeData {
            shape,
            vertices: vertices.iter().copied().collect(),
            faces: faces.clone(),
        });

        for fk in faces {
            self.link_face_volume(fk, key);
        }

        Ok(key)
    }

    /// Creates a tetrahedron.
    pub fn add_tetrahedron(&mut self, corners: [VertexKey; 4]) -> Result<VolumeKey> {
        self.add_volume(&corners)
    }

    /// Creates a hexahedron.
    pub fn add_hexahedron(&mut self, corners: [VertexKey; 8]) -> Result<VolumeKey> {
        self.add_volume(&corners)
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        *self = Grid::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_edge_between_vertices() {
        let mut grid = Grid::new();
        let v0 = grid.add_vertex(0.0, 0.0, 0.0);
        let v1 = grid.add_vertex(1.0, 0.0, 0.0);

        let e = grid.add_edge(v0, v1).unwrap();
        let edge = grid.edge(e).unwrap();
        assert_eq!(edge.start, v0);
        assert_eq!(edge.end, v1);
    }

    #[test]
    fn add_edge_is_shared() {
        let mut grid = Grid::new();
        let v0 = grid.add_vertex(0.0, 0.0, 0.0);
        let v1 = grid.add_vertex(1.0, 0.0, 0.0);

        let e0 = grid.add_edge(v0, v1).unwrap();
        let e1 = grid.add_edge(v1, v0).unwrap();
        assert_eq!(e0, e1);
        assert_eq!(grid.edge_count(), 1);
    }

    #[test]
    fn add_edge_rejects_degenerate() {
        let mut grid = Grid::new();
        let v0 = grid.add_vertex(0.0, 0.0, 0.0);
        assert!(matches!(grid.add_edge(v0, v0), Err(Error::DegenerateEdge(_))));
    }

    #[test]
    fn add_edge_invalid_vertex() {
        let mut grid = Grid::new();
        let v0 = grid.add_vertex(0.0, 0.0, 0.0);
        let mut other = Grid::new();
        let _ = other.add_vertex(5.0, 5.0, 5.0);
        let foreign = other.add_vertex(6.0, 6.0, 6.0);
        assert!(grid.add_edge(v0, foreign).is_err());
    }

    #[test]
    fn adjacent_triangles_share_an_edge() {
        let mut grid = Grid::new();
        let v0 = grid.add_vertex(0.0, 0.0, 0.0);
        let v1 = grid.add_vertex(1.0, 0.0, 0.0);
        let v2 = grid.add_vertex(1.0, 1.0, 0.0);
        let v3 = grid.add_vertex(0.0, 1.0, 0.0);

        grid.add_triangle(v0, v1, v2).unwrap();
        grid.add_triangle(v0, v2, v3).unwrap();

        assert_eq!(grid.face_count(), 2);
        assert_eq!(grid.edge_count(), 5);
        let diagonal = grid.find_edge(v0, v2).unwrap();
        assert_eq!(grid.faces_of_edge(diagonal).len(), 2);
    }

    #[test]
    fn unsupported_face_sizes() {
        let mut grid = Grid::new();
        let v: Vec<_> = (0..5).map(|i| grid.add_vertex(i as f64, 0.0, 0.0)).collect();
        assert!(matches!(grid.add_face(&v[..2]), Err(Error::UnsupportedFace(2))));
        assert!(matches!(grid.add_face(&v), Err(Error::UnsupportedFace(5))));
    }

    #[test]
    fn tetrahedra_share_a_face() {
        let mut grid = Grid::new();
        let a = grid.add_vertex(0.0, 0.0, 0.0);
        let b = grid.add_vertex(1.0, 0.0, 0.0);
        let c = grid.add_vertex(0.0, 1.0, 0.0);
        let top = grid.add_vertex(0.0, 0.0, 1.0);
        let bottom = grid.add_vertex(0.0, 0.0, -1.0);

        let t0 = grid.add_tetrahedron([a, b, c, top]).unwrap();
        let t1 = grid.add_tetrahedron([a, c, b, bottom]).unwrap();

        assert_eq!(grid.volume_count(), 2);
        assert_eq!(grid.face_count(), 7);
        let shared = grid.find_face(&[a, b, c]).unwrap();
        assert_eq!(grid.volumes_of_face(shared), &[t0, t1]);
    }

    #[test]
    fn unsupported_volume_size() {
        let mut grid = Grid::new();
        let v: Vec<_> = (0..7).map(|i| grid.add_vertex(i as f64, 0.0, 0.0)).collect();
        assert!(matches!(grid.add_volume(&v), Err(Error::UnsupportedVolume(7))));
    }

    #[test]
    fn repeated_face_vertex_leaves_grid_untouched() {
        let mut grid = Grid::new();
        let a = grid.add_vertex(0.0, 0.0, 0.0);
        let b = grid.add_vertex(1.0, 0.0, 0.0);
        let c = grid.add_vertex(0.0, 1.0, 0.0);

        assert!(matches!(grid.add_face(&[a, b, b]), Err(Error::DegenerateFace(k)) if k == b));
        assert!(matches!(grid.add_face(&[a, b, c, a]), Err(Error::DegenerateFace(k)) if k == a));
        assert_eq!(grid.edge_count(), 0);
        assert_eq!(grid.face_count(), 0);
        assert!(grid.edges_of_vertex(a).is_empty());
        assert!(grid.find_edge(a, b).is_none());
    }

    #[test]
    fn repeated_volume_corner_leaves_grid_untouched() {
        let mut grid = Grid::new();
        let a = grid.add_vertex(0.0, 0.0, 0.0);
        let b = grid.add_vertex(1.0, 0.0, 0.0);
        let c = grid.add_vertex(0.0, 1.0, 0.0);

        assert!(matches!(
            grid.add_tetrahedron([a, b, c, a]),
            Err(Error::DegenerateVolume(k)) if k == a
        ));
        assert_eq!(grid.edge_count(), 0);
        assert_eq!(grid.face_count(), 0);
        assert_eq!(grid.volume_count(), 0);
    }

    #[test]
    fn set_position_moves_vertex() {
        let mut grid = Grid::new();
        let v = grid.add_vertex(0.0, 0.0, 0.0);
        grid.set_position(v, Point3::new(2.0, 0.0, 0.0)).unwrap();
        assert_eq!(grid.position(v), Some(Point3::new(2.0, 0.0, 0.0)));
    }
}
