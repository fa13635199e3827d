// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometric queries on grid elements.
//!
//! Normals, centroids, bounding spheres and axis-aligned bounds, computed
//! directly from vertex positions.

use nalgebra::{Point3, Vector3};

use crate::arena::Grid;
use crate::keys::*;

/// A sphere given by center and radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Point3<f64>,
    pub radius: f64,
}

impl Sphere {
    pub fn new(center: Point3<f64>, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Smallest sphere around the centroid of `points` that contains all of
    /// them. Not the minimal enclosing sphere, but conservative.
    pub fn around_centroid(points: &[Point3<f64>]) -> Option<Self> {
        let center = centroid(points)?;
        let radius = points
            .iter()
            .map(|p| (p - center).norm())
            .fold(0.0, f64::max);
        Some(Self { center, radius })
    }

    /// Sphere enclosing an axis-aligned box: the box center with half the
    /// diagonal as radius.
    pub fn around_box(min: &Point3<f64>, max: &Point3<f64>) -> Self {
        let center = nalgebra::center(min, max);
        Self {
            center,
            radius: (max - min).norm() * 0.5,
        }
    }
}

/// Arithmetic mean of a point set.
pub fn centroid(points: &[Point3<f64>]) -> Option<Point3<f64>> {
    if points.is_empty() {
        return None;
    }
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc: Vector3<f64>, p| acc + p.coords);
    Some(Point3::from(sum / points.len() as f64))
}

impl Grid {
    /// Returns the position of a vertex.
    pub fn position(&self, key: VertexKey) -> Option<Point3<f64>> {
        self.vertices.get(key).map(|v| v.position)
    }

    /// Positions of a list of vertices. Missing vertices are skipped.
    pub fn positions(&self, keys: &[VertexKey]) -> Vec<Point3<f64>> {
        keys.iter().filter_map(|&k| self.position(k)).collect()
    }

    /// Computes the unit face normal using Newell's method.
    ///
    /// The direction follows the right-hand rule relative to the winding.
    /// Returns `None` for degenerate faces.
    pub fn face_normal(&self, key: FaceKey) -> Option<Vector3<f64>> {
        let verts = &self.faces.get(key)?.vertices;
        let n = verts.len();

        let mut normal = Vector3::new(0.0, 0.0, 0.0);
        for i in 0..n {
            let curr = self.position(verts[i])?;
            let next = self.position(verts[(i + 1) % n])?;

            normal.x += (curr.y - next.y) * (curr.z + next.z);
            normal.y += (curr.z - next.z) * (curr.x + next.x);
            normal.z += (curr.x - next.x) * (curr.y + next.y);
        }

        let len = normal.norm();
        if len < 1e-15 {
            return None;
        }
        Some(normal / len)
    }

    /// Centroid of any element's vertices.
    pub fn element_centroid(&self, key: ElementKey) -> Option<Point3<f64>> {
        centroid(&self.positions(&self.element_vertices(key)))
    }

    /// Bounding sphere of any element, centered at its centroid.
    pub fn bounding_sphere(&self, key: ElementKey) -> Option<Sphere> {
        Sphere::around_centroid(&self.positions(&self.element_vertices(key)))
    }

    /// Axis-aligned bounds of all vertices, or `None` for an empty grid.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let mut iter = self.vertices.values().map(|v| v.position);
        let first = iter.next()?;
        Some(iter.fold((first, first), |(min, max), p| {
            (min.inf(&p), max.sup(&p))
        }))
    }
}
