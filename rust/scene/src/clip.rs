// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The clip-plane set: up to three independently enabled half-space cuts.
//!
//! An element is clipped when any of its vertices lies strictly on the
//! positive side of any enabled plane. Bounding spheres only short-circuit
//! that test when their classification is conclusive.

use meshview_grid::{EdgeKey, FaceKey, Grid, Sphere, VertexKey, VolumeKey};
use nalgebra::{Point3, Vector3};

use crate::error::{Error, Result};
use crate::predicates::{classify_point, classify_sphere, Plane, RelativePosition};

pub const MAX_CLIP_PLANES: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct ClipPlaneSet {
    planes: [Plane; MAX_CLIP_PLANES],
    enabled: [bool; MAX_CLIP_PLANES],
}

impl Default for ClipPlaneSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipPlaneSet {
    /// Three disabled planes through the origin, facing +x, +y and +z.
    pub fn new() -> Self {
        let planes = [Vector3::x(), Vector3::y(), Vector3::z()]
            .map(|n| Plane::from_unit_normal(Point3::origin(), n));
        Self {
            planes,
            enabled: [false; MAX_CLIP_PLANES],
        }
    }

    fn check_index(index: usize) -> Result<()> {
        if index < MAX_CLIP_PLANES {
            Ok(())
        } else {
            Err(Error::ClipPlaneIndex(index))
        }
    }

    /// Replaces plane `index`. Its enabled state is kept.
    pub fn set_plane(&mut self, index: usize, point: Point3<f64>, normal: Vector3<f64>) -> Result<()> {
        Self::check_index(index)?;
        self.planes[index] = Plane::new(point, normal)?;
        Ok(())
    }

    pub fn enable(&mut self, index: usize, enabled: bool) -> Result<()> {
        Self::check_index(index)?;
        self.enabled[index] = enabled;
        Ok(())
    }

    pub fn plane(&self, index: usize) -> Option<&Plane> {
        self.planes.get(index)
    }

    pub fn is_enabled(&self, index: usize) -> bool {
        self.enabled.get(index).copied().unwrap_or(false)
    }

    pub fn any_enabled(&self) -> bool {
        self.enabled.iter().any(|&e| e)
    }

    /// Enabled planes in index order.
    pub fn enabled_planes(&self) -> impl Iterator<Item = &Plane> + '_ {
        self.planes
            .iter()
            .zip(self.enabled.iter())
            .filter(|&(_, &e)| e)
            .map(|(p, _)| p)
    }

    // --- Classification ---

    /// Most severe classification of `p` over all enabled planes.
    /// `Inside` when no plane is enabled.
    pub fn classify_point(&self, p: &Point3<f64>) -> RelativePosition {
        let mut result = RelativePosition::Inside;
        for plane in self.enabled_planes() {
            let pos = classify_point(plane, p);
            if pos == RelativePosition::Outside {
                return pos;
            }
            result = result.max(pos);
        }
        result
    }

    /// Most severe classification of `sphere` over all enabled planes.
    pub fn classify_sphere(&self, sphere: &Sphere) -> RelativePosition {
        let mut result = RelativePosition::Inside;
        for plane in self.enabled_planes() {
            let pos = classify_sphere(plane, sphere);
            if pos == RelativePosition::Outside {
                return pos;
            }
            result = result.max(pos);
        }
        result
    }

    /// `true` if any point lies strictly outside any enabled plane.
    pub fn clip_points(&self, points: &[Point3<f64>]) -> bool {
        self.enabled_planes()
            .any(|plane| points.iter().any(|p| plane.signed_distance(p) > 0.0))
    }

    /// Point test, optionally short-circuited by a bounding sphere of the
    /// points. The sphere decides only when it lies entirely on one side.
    fn clip_bounded(&self, points: &[Point3<f64>], sphere: Option<&Sphere>) -> bool {
        if let Some(sphere) = sphere {
            match self.classify_sphere(sphere) {
                RelativePosition::Outside => return !points.is_empty(),
                RelativePosition::Inside | RelativePosition::InsideTouches => return false,
                _ => {}
            }
        }
        self.clip_points(points)
    }

    // --- Grid elements ---

    pub fn clip_vertex(&self, grid: &Grid, vertex: VertexKey) -> bool {
        grid.position(vertex)
            .is_some_and(|p| self.classify_point(&p) == RelativePosition::Outside)
    }

    pub fn clip_edge(&self, grid: &Grid, edge: EdgeKey) -> bool {
        let Some(vertices) = grid.edge_vertices(edge) else {
            return false;
        };
        self.clip_points(&grid.positions(&vertices))
    }

    pub fn clip_face(&self, grid: &Grid, face: FaceKey, sphere: Option<&Sphere>) -> bool {
        if !self.any_enabled() {
            return false;
        }
        self.clip_bounded(&grid.positions(grid.face_vertices(face)), sphere)
    }

    pub fn clip_volume(&self, grid: &Grid, volume: VolumeKey, sphere: Option<&Sphere>) -> bool {
        if !self.any_enabled() {
            return false;
        }
        self.clip_bounded(&grid.positions(grid.volume_vertices(volume)), sphere)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshview_grid::builders;

    fn half_cut() -> ClipPlaneSet {
        let mut clip = ClipPlaneSet::new();
        clip.set_plane(0, Point3::new(0.5, 0.0, 0.0), Vector3::x()).unwrap();
        clip.enable(0, true).unwrap();
        clip
    }

    #[test]
    fn disabled_set_clips_nothing() {
        let clip = ClipPlaneSet::new();
        assert!(!clip.any_enabled());
        assert_eq!(clip.classify_point(&Point3::new(9.0, 9.0, 9.0)), RelativePosition::Inside);
        assert!(!clip.clip_points(&[Point3::new(9.0, 9.0, 9.0)]));
    }

    #[test]
    fn index_out_of_range() {
        let mut clip = ClipPlaneSet::new();
        assert!(matches!(clip.enable(3, true), Err(Error::ClipPlaneIndex(3))));
        assert!(matches!(
            clip.set_plane(7, Point3::origin(), Vector3::x()),
            Err(Error::ClipPlaneIndex(7))
        ));
        assert!(!clip.is_enabled(5));
    }

    #[test]
    fn max_severity_over_planes() {
        let mut clip = half_cut();
        clip.set_plane(1, Point3::new(0.0, 0.25, 0.0), Vector3::y()).unwrap();
        clip.enable(1, true).unwrap();

        // on plane 0, inside plane 1
        assert_eq!(clip.classify_point(&Point3::new(0.5, 0.0, 0.0)), RelativePosition::Cut);
        // inside plane 0, outside plane 1
        assert_eq!(clip.classify_point(&Point3::new(0.0, 1.0, 0.0)), RelativePosition::Outside);

        let sphere = Sphere::new(Point3::new(0.0, 0.5, 0.0), 0.25);
        assert_eq!(clip.classify_sphere(&sphere), RelativePosition::OutsideTouches);
    }

    #[test]
    fn sphere_never_decides_a_straddling_face() {
        let grid = builders::unit_cube().unwrap();
        let clip = half_cut();
        // a sphere claiming "inside" is trusted, one claiming "cut" is not
        let inside = Sphere::new(Point3::new(-5.0, 0.0, 0.0), 1.0);
        let cut = Sphere::new(Point3::new(0.5, 0.0, 0.0), 100.0);
        for f in grid.face_keys() {
            let exact = clip.clip_face(&grid, f, None);
            assert_eq!(clip.clip_face(&grid, f, Some(&cut)), exact);
            assert!(!clip.clip_face(&grid, f, Some(&inside)));
        }
    }

    #[test]
    fn cube_faces_against_half_cut() {
        let grid = builders::unit_cube().unwrap();
        let clip = half_cut();
        // only the two triangles of the x = 0 side stay unclipped
        let kept = grid
            .face_keys()
            .filter(|&f| !clip.clip_face(&grid, f, None))
            .count();
        assert_eq!(kept, 2);

        let clipped_vertices = grid
            .vertex_keys()
            .filter(|&v| clip.clip_vertex(&grid, v))
            .count();
        assert_eq!(clipped_vertices, 4);
    }
}
