// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Builders for common primitive grids.
//!
//! Corner ordering follows the local face tables of [`VolumeShape`], so every
//! face produced here has an outward winding.
//!
//! [`VolumeShape`]: crate::VolumeShape

use crate::arena::{Grid, VolumeShape};
use crate::error::Result;
use crate::keys::*;

/// Corners of an axis-aligned box: bottom ring counter-clockwise seen from
/// +z, then the top ring.
fn box_corners(min: [f64; 3], max: [f64; 3]) -> [[f64; 3]; 8] {
    [
        [min[0], min[1], min[2]],
        [max[0], min[1], min[2]],
        [max[0], max[1], min[2]],
        [min[0], max[1], min[2]],
        [min[0], min[1], max[2]],
        [max[0], min[1], max[2]],
        [max[0], max[1], max[2]],
        [min[0], max[1], max[2]],
    ]
}

impl Grid {
    /// Adds one vertex per coordinate triple.
    pub fn add_vertices_by_coords(&mut self, coords: &[[f64; 3]]) -> Vec<VertexKey> {
        coords
            .iter()
            .map(|c| self.add_vertex(c[0], c[1], c[2]))
            .collect()
    }

    /// Adds the surface of an axis-aligned box as 12 outward triangles.
    pub fn add_box_surface(&mut self, min: [f64; 3], max: [f64; 3]) -> Result<Vec<FaceKey>> {
        let v = self.add_vertices_by_coords(&box_corners(min, max));
        let mut faces = Vec::with_capacity(12);
        for quad in VolumeShape::Hexahedron.local_faces() {
            let (a, b, c, d) = (v[quad[0]], v[quad[1]], v[quad[2]], v[quad[3]]);
            faces.push(self.add_triangle(a, b, c)?);
            faces.push(self.add_triangle(a, c, d)?);
        }
        Ok(faces)
    }

    /// Adds an axis-aligned box as a single hexahedral volume.
    pub fn add_box_volume(&mut self, min: [f64; 3], max: [f64; 3]) -> Result<VolumeKey> {
        let v = self.add_vertices_by_coords(&box_corners(min, max));
        self.add_volume(&v)
    }
}

/// Unit cube surface: 8 vertices, 18 edges, 12 triangles, no volumes.
pub fn unit_cube() -> Result<Grid> {
    let mut grid = Grid::new();
    grid.add_box_surface([0.0; 3], [1.0; 3])?;
    Ok(grid)
}

/// The unit tetrahedron spanned by the origin and the three axis points.
pub fn tetrahedron() -> Result<Grid> {
    let mut grid = Grid::new();
    let v = grid.add_vertices_by_coords(&[
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
    ]);
    grid.add_tetrahedron([v[0], v[1], v[2], v[3]])?;
    Ok(grid)
}

/// Two tetrahedra glued along the triangle in the z = 0 plane, one above
/// and one below it. Yields 7 faces, one of them interior.
pub fn tetrahedron_pair() -> Result<Grid> {
    let mut grid = Grid::new();
    let v = grid.add_vertices_by_coords(&[
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
    ]);
    grid.add_tetrahedron([v[0], v[1], v[2], v[3]])?;
    grid.add_tetrahedron([v[0], v[2], v[1], v[4]])?;
    Ok(grid)
}

/// The unit cube as a single hexahedron.
pub fn hexahedron() -> Result<Grid> {
    let mut grid = Grid::new();
    grid.add_box_volume([0.0; 3], [1.0; 3])?;
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    #[test]
    fn unit_cube_counts() {
        let grid = unit_cube().unwrap();
        assert_eq!(grid.vertex_count(), 8);
        assert_eq!(grid.edge_count(), 18);
        assert_eq!(grid.face_count(), 12);
        assert_eq!(grid.volume_count(), 0);
    }

    #[test]
    fn unit_cube_normals_point_outward() {
        let grid = unit_cube().unwrap();
        let center = nalgebra::Point3::new(0.5, 0.5, 0.5);
        for f in grid.face_keys() {
            let n = grid.face_normal(f).unwrap();
            let c = grid.element_centroid(ElementKey::Face(f)).unwrap();
            assert!(n.dot(&(c - center)) > 0.0);
        }
    }

    #[test]
    fn tetrahedron_faces_point_outward() {
        let grid = tetrahedron().unwrap();
        let t = grid.volume_keys().next().unwrap();
        let center = grid.element_centroid(ElementKey::Volume(t)).unwrap();
        for &f in grid.volume_faces(t) {
            let n = grid.face_normal(f).unwrap();
            let c = grid.element_centroid(ElementKey::Face(f)).unwrap();
            assert!(n.dot(&(c - center)) > 0.0);
        }
    }

    #[test]
    fn tetrahedron_pair_shares_one_face() {
        let grid = tetrahedron_pair().unwrap();
        assert_eq!(grid.volume_count(), 2);
        assert_eq!(grid.face_count(), 7);
        let shared: Vec<_> = grid
            .face_keys()
            .filter(|&f| grid.volumes_of_face(f).len() == 2)
            .collect();
        assert_eq!(shared.len(), 1);
        let n = grid.face_normal(shared[0]).unwrap();
        assert_relative_eq!(n.dot(&Vector3::z()).abs(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn hexahedron_counts() {
        let grid = hexahedron().unwrap();
        assert_eq!(grid.volume_count(), 1);
        assert_eq!(grid.face_count(), 6);
        assert_eq!(grid.edge_count(), 12);
    }
}
