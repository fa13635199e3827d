// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Camera state and the object → window transform.
//!
//! Mesh positions are object coordinates; the model matrix scales them per
//! axis by the world scale, the view matrix is a right-handed look-at and the projection
//! maps to normalized device coordinates. Window coordinates have their
//! origin in the bottom-left corner of the viewport, GUI coordinates in the
//! top-left corner.

use nalgebra::{Matrix4, Point3, Vector3};

use crate::error::{Error, Result};
use crate::predicates::{Plane, Ray};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective {
        fovy_degrees: f64,
        z_near: f64,
        z_far: f64,
    },
    Orthographic {
        left: f64,
        right: f64,
        bottom: f64,
        top: f64,
        z_near: f64,
        z_far: f64,
    },
}

impl Projection {
    pub fn z_near(&self) -> f64 {
        match *self {
            Projection::Perspective { z_near, .. } | Projection::Orthographic { z_near, .. } => z_near,
        }
    }

    pub fn z_far(&self) -> f64 {
        match *self {
            Projection::Perspective { z_far, .. } | Projection::Orthographic { z_far, .. } => z_far,
        }
    }
}

/// Viewport rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    from: Point3<f64>,
    dir: Vector3<f64>,
    up: Vector3<f64>,
    projection: Projection,
    viewport: Viewport,
    world_scale: Vector3<f64>,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            from: Point3::origin(),
            dir: Vector3::new(0.0, 0.0, -1.0),
            up: Vector3::y(),
            projection: Projection::Perspective {
                fovy_degrees: 45.0,
                z_near: 0.1,
                z_far: 100.0,
            },
            viewport: Viewport::new(800.0, 600.0),
            world_scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places the camera at `from`, looking at `to`.
    pub fn look_at(&mut self, from: Point3<f64>, to: Point3<f64>, up: Vector3<f64>) -> Result<()> {
        let dir = to - from;
        if !dir.norm().is_finite() || dir.norm() == 0.0 {
            return Err(Error::DegenerateRay);
        }
        if dir.cross(&up).norm() == 0.0 {
            return Err(Error::InvalidCamera("up vector is parallel to the view direction"));
        }
        self.from = from;
        self.dir = dir;
        self.up = up;
        Ok(())
    }

    pub fn set_projection(&mut self, projection: Projection) -> Result<()> {
        let (near, far) = (projection.z_near(), projection.z_far());
        if !(near > 0.0 && far > near) {
            return Err(Error::InvalidCamera("expected 0 < z_near < z_far"));
        }
        self.projection = projection;
        Ok(())
    }

    /// Keeps the projection kind and replaces its clip distances.
    pub fn set_near_far(&mut self, near: f64, far: f64) -> Result<()> {
        let mut projection = self.projection;
        match &mut projection {
            Projection::Perspective { z_near, z_far, .. }
            | Projection::Orthographic { z_near, z_far, .. } => {
                *z_near = near;
                *z_far = far;
            }
        }
        self.set_projection(projection)
    }

    pub fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        if !(viewport.width > 0.0 && viewport.height > 0.0) {
            return Err(Error::InvalidCamera("viewport must have a positive size"));
        }
        self.viewport = viewport;
        Ok(())
    }

    /// Per-axis scale from object to world coordinates.
    pub fn set_world_scale(&mut self, scale: Vector3<f64>) -> Result<()> {
        if !scale.iter().all(|s| s.is_finite() && *s > 0.0) {
            return Err(Error::InvalidCamera("world scale must be positive on every axis"));
        }
        self.world_scale = scale;
        Ok(())
    }

    pub fn from(&self) -> Point3<f64> {
        self.from
    }

    /// The view direction; its length is the distance to [`Camera::to`].
    pub fn dir(&self) -> Vector3<f64> {
        self.dir
    }

    pub fn to(&self) -> Point3<f64> {
        self.from + self.dir
    }

    pub fn up(&self) -> Vector3<f64> {
        self.up
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn world_scale(&self) -> Vector3<f64> {
        self.world_scale
    }

    // --- Matrices ---

    pub fn model_matrix(&self) -> Matrix4<f64> {
        Matrix4::new_nonuniform_scaling(&self.world_scale)
    }

    pub fn view_matrix(&self) -> Matrix4<f64> {
        Matrix4::look_at_rh(&self.from, &self.to(), &self.up)
    }

    pub fn projection_matrix(&self) -> Matrix4<f64> {
        match self.projection {
            Projection::Perspective {
                fovy_degrees,
                z_near,
                z_far,
            } => {
                let aspect = self.viewport.width / self.viewport.height;
                Matrix4::new_perspective(aspect, fovy_degrees.to_radians(), z_near, z_far)
            }
            Projection::Orthographic {
                left,
                right,
                bottom,
                top,
                z_near,
                z_far,
            } => Matrix4::new_orthographic(left, right, bottom, top, z_near, z_far),
        }
    }

    /// Snapshot of the full object → window transform.
    pub fn projector(&self) -> Projector {
        let mvp = self.projection_matrix() * self.view_matrix() * self.model_matrix();
        Projector {
            mvp,
            inverse: mvp.try_inverse(),
            viewport: self.viewport,
        }
    }

    /// Flips a GUI y coordinate (origin top-left) into window space.
    pub fn gui_to_window_y(&self, y: f64) -> f64 {
        self.viewport.height - y
    }

    /// Picking ray through a GUI pixel, from the near to the far plane, in
    /// object coordinates.
    pub fn ray_through(&self, gui_x: f64, gui_y: f64) -> Option<Ray> {
        let projector = self.projector();
        let y = self.gui_to_window_y(gui_y);
        let from = projector.unproject(&Point3::new(gui_x, y, 0.0))?;
        let to = projector.unproject(&Point3::new(gui_x, y, 1.0))?;
        Ray::new(from, to).ok()
    }

    /// The near clip plane in object coordinates. Its positive side is in
    /// front of the camera.
    pub fn near_clip_plane(&self) -> Plane {
        let n = self.dir.normalize();
        let world = self.from + n * self.projection.z_near();
        let point = Point3::from(world.coords.component_div(&self.world_scale));
        // pulling the plane back through the diagonal scale multiplies its normal by it
        let normal = n.component_mul(&self.world_scale).normalize();
        Plane::from_unit_normal(point, normal)
    }
}

/// A fixed object → window transform, read once per query.
#[derive(Debug, Clone)]
pub struct Projector {
    mvp: Matrix4<f64>,
    inverse: Option<Matrix4<f64>>,
    viewport: Viewport,
}

impl Projector {
    /// Window coordinates `(x, y, depth)` of an object-space point, with depth
    /// in `0..=1` between the near and far plane. `None` when the point lies
    /// in the plane of the eye.
    pub fn project(&self, p: &Point3<f64>) -> Option<Point3<f64>> {
        let clip = self.mvp * p.to_homogeneous();
        if clip.w == 0.0 {
            return None;
        }
        let ndc = clip.xyz() / clip.w;
        Some(Point3::new(
            self.viewport.x + self.viewport.width * (ndc.x + 1.0) * 0.5,
            self.viewport.y + self.viewport.height * (ndc.y + 1.0) * 0.5,
            (ndc.z + 1.0) * 0.5,
        ))
    }

    /// Inverse of [`Projector::project`].
    pub fn unproject(&self, win: &Point3<f64>) -> Option<Point3<f64>> {
        let inverse = self.inverse.as_ref()?;
        let ndc = nalgebra::Vector4::new(
            (win.x - self.viewport.x) / self.viewport.width * 2.0 - 1.0,
            (win.y - self.viewport.y) / self.viewport.height * 2.0 - 1.0,
            win.z * 2.0 - 1.0,
            1.0,
        );
        let obj = inverse * ndc;
        if obj.w == 0.0 {
            return None;
        }
        Some(Point3::from(obj.xyz() / obj.w))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn camera_on_z(distance: f64) -> Camera {
        let mut camera = Camera::new();
        camera
            .look_at(
                Point3::new(0.0, 0.0, distance),
                Point3::origin(),
                Vector3::y(),
            )
            .unwrap();
        camera
    }

    #[test]
    fn look_at_rejects_degenerate_input() {
        let mut camera = Camera::new();
        let p = Point3::new(1.0, 1.0, 1.0);
        assert!(matches!(camera.look_at(p, p, Vector3::y()), Err(Error::DegenerateRay)));
        assert!(camera
            .look_at(Point3::origin(), Point3::new(0.0, 2.0, 0.0), Vector3::y())
            .is_err());
    }

    #[test]
    fn target_projects_to_viewport_center() {
        let camera = camera_on_z(5.0);
        let win = camera.projector().project(&Point3::origin()).unwrap();
        assert_relative_eq!(win.x, 400.0, epsilon = 1e-9);
        assert_relative_eq!(win.y, 300.0, epsilon = 1e-9);
        assert!(win.z > 0.0 && win.z < 1.0);
    }

    #[test]
    fn unproject_inverts_project() {
        let camera = camera_on_z(5.0);
        let projector = camera.projector();
        let p = Point3::new(0.3, -0.2, 1.0);
        let win = projector.project(&p).unwrap();
        let back = projector.unproject(&win).unwrap();
        assert_relative_eq!(back, p, epsilon = 1e-9);
    }

    #[test]
    fn center_ray_runs_along_view_direction() {
        let camera = camera_on_z(5.0);
        let ray = camera.ray_through(400.0, 300.0).unwrap();
        assert_relative_eq!(ray.from, Point3::new(0.0, 0.0, 4.9), epsilon = 1e-9);
        assert_relative_eq!(ray.to, Point3::new(0.0, 0.0, -95.0), epsilon = 1e-6);
    }

    #[test]
    fn gui_y_is_flipped() {
        let camera = camera_on_z(5.0);
        // a pixel in the upper half of the window sees points with y > 0
        let ray = camera.ray_through(400.0, 100.0).unwrap();
        assert!(ray.to.y > 0.0);
    }

    #[test]
    fn near_plane_sits_in_front_of_the_eye() {
        let mut camera = camera_on_z(5.0);
        camera.set_world_scale(Vector3::new(2.0, 2.0, 2.0)).unwrap();
        let plane = camera.near_clip_plane();
        assert_relative_eq!(plane.point(), Point3::new(0.0, 0.0, 2.45), epsilon = 1e-12);
        assert_relative_eq!(plane.normal(), Vector3::new(0.0, 0.0, -1.0));
        assert!(plane.signed_distance(&Point3::origin()) > 0.0);
    }

    #[test]
    fn near_plane_follows_anisotropic_scale() {
        let mut camera = Camera::new();
        camera
            .look_at(Point3::new(5.0, 0.0, 5.0), Point3::origin(), Vector3::y())
            .unwrap();
        let scale = Vector3::new(2.0, 1.0, 1.0);
        camera.set_world_scale(scale).unwrap();
        let plane = camera.near_clip_plane();

        assert_relative_eq!(
            plane.normal(),
            Vector3::new(-2.0, 0.0, -1.0).normalize(),
            epsilon = 1e-12
        );

        // a world point on the near plane maps to an object point on the plane
        let n = Vector3::new(-1.0, 0.0, -1.0).normalize();
        let tangent = Vector3::new(1.0, 0.0, -1.0).normalize() * 0.3;
        let world = Point3::new(5.0, 0.0, 5.0) + n * 0.1 + tangent;
        let object = Point3::from(world.coords.component_div(&scale));
        assert_relative_eq!(plane.signed_distance(&object), 0.0, epsilon = 1e-12);
        assert!(plane.signed_distance(&Point3::origin()) > 0.0);

        assert!(camera.set_world_scale(Vector3::new(1.0, 0.0, 1.0)).is_err());
    }

    #[test]
    fn projection_applies_scale_per_axis() {
        let mut camera = camera_on_z(5.0);
        camera.set_world_scale(Vector3::new(2.0, 1.0, 1.0)).unwrap();
        let stretched = camera.projector().project(&Point3::new(0.5, 0.0, 0.0)).unwrap();

        camera.set_world_scale(Vector3::new(1.0, 1.0, 1.0)).unwrap();
        let plain = camera.projector().project(&Point3::new(1.0, 0.0, 0.0)).unwrap();
        assert_relative_eq!(stretched, plain, epsilon = 1e-9);
    }

    #[test]
    fn invalid_projection_rejected() {
        let mut camera = Camera::new();
        assert!(camera.set_near_far(1.0, 0.5).is_err());
        assert!(camera.set_near_far(0.0, 10.0).is_err());
        camera.set_near_far(0.5, 10.0).unwrap();
        assert_relative_eq!(camera.projection().z_near(), 0.5);
    }
}
