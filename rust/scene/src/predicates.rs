// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometric predicates used by clipping and picking.
//!
//! Pure functions over `nalgebra` points. Plane classifications use exact
//! comparisons: a point is only `Cut` when its plane equation evaluates to
//! exactly zero.

use meshview_grid::Sphere;
use nalgebra::{Point3, Vector3, Vector4};

use crate::error::{Error, Result};

/// Position of a point or sphere relative to a plane. The positive side of a
/// plane is "outside".
///
/// Variants are ordered by severity, so the combined classification against
/// several planes is the maximum of the individual ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RelativePosition {
    Inside = -2,
    InsideTouches = -1,
    Cut = 0,
    OutsideTouches = 1,
    Outside = 2,
}

/// A plane through `point` with unit normal `normal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    point: Point3<f64>,
    normal: Vector3<f64>,
    equation: Vector4<f64>,
}

impl Plane {
    /// Creates a plane, normalizing `normal`.
    pub fn new(point: Point3<f64>, normal: Vector3<f64>) -> Result<Self> {
        let normal = unit_normal(normal)?;
        Ok(Self {
            point,
            normal,
            equation: equation(&point, &normal),
        })
    }

    /// Creates a plane from a normal that is already unit length.
    pub(crate) fn from_unit_normal(point: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self {
            point,
            normal,
            equation: equation(&point, &normal),
        }
    }

    pub fn point(&self) -> Point3<f64> {
        self.point
    }

    /// Unit normal.
    pub fn normal(&self) -> Vector3<f64> {
        self.normal
    }

    /// Coefficients `(a, b, c, d)` of `a·x + b·y + c·z + d = 0`.
    pub fn equation(&self) -> Vector4<f64> {
        self.equation
    }

    pub fn set_point(&mut self, point: Point3<f64>) {
        self.point = point;
        self.equation = equation(&self.point, &self.normal);
    }

    pub fn set_normal(&mut self, normal: Vector3<f64>) -> Result<()> {
        self.normal = unit_normal(normal)?;
        self.equation = equation(&self.point, &self.normal);
        Ok(())
    }

    /// Signed distance of `p`; positive values lie outside.
    #[inline]
    pub fn signed_distance(&self, p: &Point3<f64>) -> f64 {
        self.equation.xyz().dot(&p.coords) + self.equation.w
    }
}

fn unit_normal(normal: Vector3<f64>) -> Result<Vector3<f64>> {
    let len = normal.norm();
    if !len.is_finite() || len == 0.0 {
        return Err(Error::DegenerateNormal);
    }
    Ok(normal / len)
}

fn equation(point: &Point3<f64>, normal: &Vector3<f64>) -> Vector4<f64> {
    Vector4::new(normal.x, normal.y, normal.z, -normal.dot(&point.coords))
}

/// Classifies a point. Only an exact zero yields [`RelativePosition::Cut`].
pub fn classify_point(plane: &Plane, p: &Point3<f64>) -> RelativePosition {
    let s = plane.signed_distance(p);
    if s > 0.0 {
        RelativePosition::Outside
    } else if s < 0.0 {
        RelativePosition::Inside
    } else {
        RelativePosition::Cut
    }
}

/// Classifies a sphere by comparing the signed distance of its center with
/// its radius.
pub fn classify_sphere(plane: &Plane, sphere: &Sphere) -> RelativePosition {
    let dist = plane.signed_distance(&sphere.center);
    let r = sphere.radius;
    if dist > r {
        RelativePosition::Outside
    } else if dist == r {
        RelativePosition::OutsideTouches
    } else if dist < -r {
        RelativePosition::Inside
    } else if dist == -r {
        RelativePosition::InsideTouches
    } else {
        RelativePosition::Cut
    }
}

/// A picking ray from `from` towards `to`. Ray parameters are measured in
/// units of `to - from`, so `t = 1` is the point `to`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub from: Point3<f64>,
    pub to: Point3<f64>,
}

impl Ray {
    pub fn new(from: Point3<f64>, to: Point3<f64>) -> Result<Self> {
        let dir = to - from;
        let len = dir.norm();
        if !len.is_finite() || len == 0.0 {
            return Err(Error::DegenerateRay);
        }
        Ok(Self { from, to })
    }

    #[inline]
    pub fn dir(&self) -> Vector3<f64> {
        self.to - self.from
    }

    pub fn at(&self, t: f64) -> Point3<f64> {
        self.from + self.dir() * t
    }
}

/// Distance from `p` to the infinite line through `a` and `b`, together with
/// the parameter `t` of the closest point `a + t·(b - a)`.
pub fn distance_point_to_line(p: &Point3<f64>, a: &Point3<f64>, b: &Point3<f64>) -> (f64, f64) {
    let d = b - a;
    let len_sq = d.norm_squared();
    if len_sq == 0.0 {
        return ((p - a).norm(), 0.0);
    }
    let t = (p - a).dot(&d) / len_sq;
    let closest = a + d * t;
    ((p - closest).norm(), t)
}

/// Closest points between the segment `s0 s1` and the infinite line through
/// `l0` and `l1`. Returns the point on the segment first.
pub fn segment_line_closest_points(
    s0: &Point3<f64>,
    s1: &Point3<f64>,
    l0: &Point3<f64>,
    l1: &Point3<f64>,
) -> (Point3<f64>, Point3<f64>) {
    let d1 = s1 - s0;
    let d2 = l1 - l0;
    let r = s0 - l0;
    let a = d1.norm_squared();
    let e = d2.norm_squared();
    let f = d2.dot(&r);

    if e == 0.0 {
        let (_, s) = distance_point_to_line(l0, s0, s1);
        return (s0 + d1 * s.clamp(0.0, 1.0), *l0);
    }

    let s = if a == 0.0 {
        0.0
    } else {
        let b = d1.dot(&d2);
        let c = d1.dot(&r);
        let denom = a * e - b * b;
        if denom > 0.0 {
            ((b * f - c * e) / denom).clamp(0.0, 1.0)
        } else {
            // parallel
            0.0
        }
    };
    let t = (d1.dot(&d2) * s + f) / e;
    (s0 + d1 * s, l0 + d2 * t)
}

/// Parameters of a ray-triangle hit: `point = origin + t·dir`, barycentric
/// coordinates `u` and `v`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub t: f64,
    pub u: f64,
    pub v: f64,
}

/// Möller–Trumbore ray-triangle intersection.
///
/// Intersects the infinite line `origin + t·dir` with the triangle
/// (v0, v1, v2); the caller decides which `t` are acceptable.
pub fn ray_triangle_intersection(
    origin: &Point3<f64>,
    dir: &Vector3<f64>,
    v0: &Point3<f64>,
    v1: &Point3<f64>,
    v2: &Point3<f64>,
) -> Option<RayHit> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = dir.cross(&edge2);
    let a = edge1.dot(&h);

    if a.abs() < 1e-12 {
        return None; // parallel or degenerate
    }

    let f = 1.0 / a;
    let s = origin - v0;
    let u = f * s.dot(&h);

    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(&edge1);
    let v = f * dir.dot(&q);

    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    Some(RayHit {
        t: f * edge2.dot(&q),
        u,
        v,
    })
}

/// Slab test of the segment `p0 p1` against an axis-aligned box.
pub fn segment_intersects_box(
    p0: &Point3<f64>,
    p1: &Point3<f64>,
    min: &Point3<f64>,
    max: &Point3<f64>,
) -> bool {
    let d = p1 - p0;
    let mut t_min = 0.0_f64;
    let mut t_max = 1.0_f64;

    for i in 0..3 {
        if d[i] == 0.0 {
            if p0[i] < min[i] || p0[i] > max[i] {
                return false;
            }
            continue;
        }
        let inv = 1.0 / d[i];
        let mut t0 = (min[i] - p0[i]) * inv;
        let mut t1 = (max[i] - p0[i]) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_min = t_min.max(t0);
        t_max = t_max.min(t1);
        if t_min > t_max {
            return false;
        }
    }
    true
}

/// Separating-axis test of the triangle (a, b, c) against an axis-aligned
/// box. Touching counts as intersecting.
pub fn triangle_intersects_box(
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    min: &Point3<f64>,
    max: &Point3<f64>,
) -> bool {
    let center = nalgebra::center(min, max);
    let half = (max - min) * 0.5;
    let v = [a - center, b - center, c - center];
    let edges = [v[1] - v[0], v[2] - v[1], v[0] - v[2]];

    let separated = |axis: &Vector3<f64>| {
        let p = [axis.dot(&v[0]), axis.dot(&v[1]), axis.dot(&v[2])];
        let lo = p[0].min(p[1]).min(p[2]);
        let hi = p[0].max(p[1]).max(p[2]);
        let r = half.x * axis.x.abs() + half.y * axis.y.abs() + half.z * axis.z.abs();
        lo > r || hi < -r
    };

    // box face normals
    for axis in [Vector3::x(), Vector3::y(), Vector3::z()] {
        if separated(&axis) {
            return false;
        }
    }

    // triangle normal
    let normal = edges[0].cross(&edges[1]);
    if normal.norm_squared() > 0.0 && separated(&normal) {
        return false;
    }

    // edge cross products; a zero axis separates nothing
    for e in &edges {
        for axis in [Vector3::x(), Vector3::y(), Vector3::z()] {
            let cross = e.cross(&axis);
            if cross.norm_squared() > 0.0 && separated(&cross) {
                return false;
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn plane_x(x: f64) -> Plane {
        Plane::new(Point3::new(x, 0.0, 0.0), Vector3::new(2.0, 0.0, 0.0)).unwrap()
    }

    #[test]
    fn plane_normalizes_and_builds_equation() {
        let plane = plane_x(0.5);
        assert_relative_eq!(plane.normal(), Vector3::x());
        assert_relative_eq!(plane.equation(), Vector4::new(1.0, 0.0, 0.0, -0.5));
        assert!(Plane::new(Point3::origin(), Vector3::zeros()).is_err());
    }

    #[test]
    fn set_point_updates_equation() {
        let mut plane = plane_x(0.0);
        plane.set_point(Point3::new(3.0, 1.0, 1.0));
        assert_relative_eq!(plane.equation().w, -3.0);
        plane.set_normal(Vector3::new(-1.0, 0.0, 0.0)).unwrap();
        assert_relative_eq!(plane.equation(), Vector4::new(-1.0, 0.0, 0.0, 3.0));
    }

    #[test]
    fn point_classification_is_exact() {
        let plane = plane_x(0.5);
        assert_eq!(classify_point(&plane, &Point3::new(1.0, 0.0, 0.0)), RelativePosition::Outside);
        assert_eq!(classify_point(&plane, &Point3::new(0.0, 0.0, 0.0)), RelativePosition::Inside);
        assert_eq!(classify_point(&plane, &Point3::new(0.5, 7.0, 0.0)), RelativePosition::Cut);
        assert_eq!(
            classify_point(&plane, &Point3::new(0.5 + 1e-12, 0.0, 0.0)),
            RelativePosition::Outside
        );
    }

    #[test]
    fn sphere_classification() {
        let plane = plane_x(0.0);
        let at = |x: f64| Sphere::new(Point3::new(x, 0.0, 0.0), 1.0);
        assert_eq!(classify_sphere(&plane, &at(2.0)), RelativePosition::Outside);
        assert_eq!(classify_sphere(&plane, &at(1.0)), RelativePosition::OutsideTouches);
        assert_eq!(classify_sphere(&plane, &at(0.5)), RelativePosition::Cut);
        assert_eq!(classify_sphere(&plane, &at(-1.0)), RelativePosition::InsideTouches);
        assert_eq!(classify_sphere(&plane, &at(-2.0)), RelativePosition::Inside);
    }

    #[test]
    fn severity_order() {
        assert!(RelativePosition::Inside < RelativePosition::InsideTouches);
        assert!(RelativePosition::InsideTouches < RelativePosition::Cut);
        assert!(RelativePosition::Cut < RelativePosition::OutsideTouches);
        assert!(RelativePosition::OutsideTouches < RelativePosition::Outside);
    }

    #[test]
    fn degenerate_ray_rejected() {
        let p = Point3::new(1.0, 2.0, 3.0);
        assert!(matches!(Ray::new(p, p), Err(Error::DegenerateRay)));
    }

    #[test]
    fn point_line_distance_and_parameter() {
        let (dist, t) = distance_point_to_line(
            &Point3::new(1.0, 1.0, 0.0),
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(2.0, 0.0, 0.0),
        );
        assert_relative_eq!(dist, 1.0);
        assert_relative_eq!(t, 0.5);
    }

    #[test]
    fn segment_line_skew() {
        let (a, b) = segment_line_closest_points(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(2.0, 0.0, 0.0),
            &Point3::new(1.0, -1.0, 1.0),
            &Point3::new(1.0, 1.0, 1.0),
        );
        assert_relative_eq!(a, Point3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(b, Point3::new(1.0, 0.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn segment_line_clamps_to_segment() {
        let (a, _) = segment_line_closest_points(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(3.0, -1.0, 1.0),
            &Point3::new(3.0, 1.0, 1.0),
        );
        assert_relative_eq!(a, Point3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn ray_hits_triangle() {
        let hit = ray_triangle_intersection(
            &Point3::new(0.25, 0.25, 1.0),
            &Vector3::new(0.0, 0.0, -2.0),
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(0.0, 1.0, 0.0),
        )
        .unwrap();
        assert_relative_eq!(hit.t, 0.5);
    }

    #[test]
    fn ray_misses_triangle() {
        let hit = ray_triangle_intersection(
            &Point3::new(2.0, 2.0, 1.0),
            &Vector3::new(0.0, 0.0, -1.0),
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(0.0, 1.0, 0.0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn segment_box() {
        let min = Point3::new(0.0, 0.0, 0.0);
        let max = Point3::new(1.0, 1.0, 1.0);
        assert!(segment_intersects_box(
            &Point3::new(-1.0, 0.5, 0.5),
            &Point3::new(2.0, 0.5, 0.5),
            &min,
            &max
        ));
        assert!(!segment_intersects_box(
            &Point3::new(-1.0, 2.0, 0.5),
            &Point3::new(2.0, 2.0, 0.5),
            &min,
            &max
        ));
        assert!(!segment_intersects_box(
            &Point3::new(-2.0, 0.5, 0.5),
            &Point3::new(-1.0, 0.5, 0.5),
            &min,
            &max
        ));
    }

    #[test]
    fn triangle_box() {
        let min = Point3::new(0.0, 0.0, 0.0);
        let max = Point3::new(1.0, 1.0, 1.0);
        // large triangle covering the box center without any vertex inside
        assert!(triangle_intersects_box(
            &Point3::new(-5.0, -5.0, 0.5),
            &Point3::new(5.0, -5.0, 0.5),
            &Point3::new(0.0, 5.0, 0.5),
            &min,
            &max
        ));
        // separated by the triangle plane
        assert!(!triangle_intersects_box(
            &Point3::new(-5.0, -5.0, 2.0),
            &Point3::new(5.0, -5.0, 2.0),
            &Point3::new(0.0, 5.0, 2.0),
            &min,
            &max
        ));
        // only the diagonal edge separates it from the box corner
        assert!(!triangle_intersects_box(
            &Point3::new(2.5, 0.0, 0.5),
            &Point3::new(0.0, 2.5, 0.5),
            &Point3::new(2.5, 2.5, 0.5),
            &min,
            &max
        ));
    }
}
