// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ray and rectangle queries against a visibility snapshot.
//!
//! Every query only considers elements whose rendered flag is set, so a
//! picked element is always one that is currently drawn.

use meshview_grid::{
    EdgeKey, ElementFlags, ElementKey, ElementKind, FaceKey, VertexKey, VolumeKey,
};
use nalgebra::Point3;

use crate::camera::{Camera, Projector};
use crate::modes::DrawMode;
use crate::object::MeshObject;
use crate::options::PickOptions;
use crate::predicates::{
    classify_point, distance_point_to_line, ray_triangle_intersection, segment_intersects_box,
    segment_line_closest_points, triangle_intersects_box, Plane, Ray, RelativePosition,
};
use crate::visibility::Visibility;

/// A selection rectangle in GUI pixels (origin top-left). Corners may be
/// given in any order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuiRect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl GuiRect {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }
}

/// Read-only query engine over one object's snapshot.
pub struct Picker<'a> {
    object: &'a MeshObject,
    vis: &'a Visibility,
    options: &'a PickOptions,
    front: DrawMode,
    back: DrawMode,
}

impl<'a> Picker<'a> {
    pub fn new(
        object: &'a MeshObject,
        vis: &'a Visibility,
        options: &'a PickOptions,
        front: DrawMode,
        back: DrawMode,
    ) -> Self {
        Self {
            object,
            vis,
            options,
            front,
            back,
        }
    }

    // --- Ray picking ---

    /// Rendered vertex closest to the ray line whose projection parameter
    /// lies inside the vertex window.
    pub fn pick_closest_vertex(&self, ray: &Ray) -> Option<VertexKey> {
        let grid = self.object.grid();
        let [lo, hi] = self.options.vertex_window;
        let mut best: Option<(VertexKey, f64)> = None;

        for v in self.vis.rendered().vertices.iter() {
            let Some(p) = grid.position(v) else { continue };
            let (dist, t) = distance_point_to_line(&p, &ray.from, &ray.to);
            if t > lo && t < hi && best.map_or(true, |(_, d)| dist < d) {
                best = Some((v, dist));
            }
        }
        best.map(|(v, _)| v)
    }

    /// Rendered edge closest to the ray.
    ///
    /// With `closest_to_target` the edge line nearest to `ray.to` wins,
    /// provided the foot point lies inside the edge window. Otherwise the
    /// edge segment with the smallest distance to the ray line wins, as long
    /// as its closest point lies in front of `ray.from`.
    pub fn pick_closest_edge(&self, ray: &Ray, closest_to_target: bool) -> Option<EdgeKey> {
        let grid = self.object.grid();
        let dir = ray.dir();
        let [lo, hi] = self.options.edge_window;
        let mut best: Option<(EdgeKey, f64)> = None;

        for e in self.vis.rendered().edges.iter() {
            let Some([a, b]) = grid.edge_vertices(e) else { continue };
            let (Some(pa), Some(pb)) = (grid.position(a), grid.position(b)) else {
                continue;
            };

            let score = if closest_to_target {
                let (dist, t) = distance_point_to_line(&ray.to, &pa, &pb);
                if !(t > lo && t < hi) {
                    continue;
                }
                dist
            } else {
                let (on_edge, on_ray) = segment_line_closest_points(&pa, &pb, &ray.from, &ray.to);
                if (on_edge - ray.from).dot(&dir) <= 0.0 {
                    continue;
                }
                (on_edge - on_ray).norm_squared()
            };

            if best.map_or(true, |(_, s)| score < s) {
                best = Some((e, score));
            }
        }
        best.map(|(e, _)| e)
    }

    /// Rendered face hit first along the ray.
    ///
    /// Faces pointing away from the ray origin are skipped unless the back
    /// draw mode is solid; faces pointing towards it unless the front mode
    /// is solid.
    pub fn pick_closest_face(&self, ray: &Ray) -> Option<FaceKey> {
        let grid = self.object.grid();
        let dir = ray.dir();
        let mut best: Option<(FaceKey, f64)> = None;

        for f in self.vis.rendered().faces.iter() {
            let norm_dot = self.object.face_normal(f).map_or(0.0, |n| n.dot(&dir));
            if !self.back.solid && norm_dot > 0.0 {
                continue;
            }
            if !self.front.solid && norm_dot < 0.0 {
                continue;
            }

            if let Some(sphere) = self.object.face_sphere(f) {
                let (dist, _) = distance_point_to_line(&sphere.center, &ray.from, &ray.to);
                if dist > sphere.radius {
                    continue;
                }
            }

            let corners = grid.positions(grid.face_vertices(f));
            for &[i, j, k] in triangles(corners.len()) {
                let Some(hit) =
                    ray_triangle_intersection(&ray.from, &dir, &corners[i], &corners[j], &corners[k])
                else {
                    continue;
                };
                if hit.t <= 0.0 {
                    continue;
                }
                let dist_sq = (ray.at(hit.t) - ray.from).norm_squared();
                if best.map_or(true, |(_, d)| dist_sq < d) {
                    best = Some((f, dist_sq));
                }
            }
        }
        best.map(|(f, _)| f)
    }

    /// First rendered volume in a visible subset adjacent to the picked face.
    pub fn pick_closest_volume(&self, ray: &Ray) -> Option<VolumeKey> {
        let face = self.pick_closest_face(ray)?;
        self.object
            .grid()
            .volumes_of_face(face)
            .iter()
            .copied()
            .find(|&v| self.volume_selectable(v))
    }

    fn volume_selectable(&self, volume: VolumeKey) -> bool {
        let subsets = self.object.subsets();
        self.vis.is_rendered(ElementKey::Volume(volume))
            && subsets
                .volume_subset(volume)
                .is_some_and(|s| subsets.is_visible(s))
    }

    // --- Rectangle queries ---

    /// Rendered elements of `kind` whose vertices all project into `rect`
    /// and lie strictly in front of the near plane.
    pub fn query_rect_contained(&self, camera: &Camera, kind: ElementKind, rect: &GuiRect) -> Vec<ElementKey> {
        let q = RectQuery::new(camera, rect);
        let grid = self.object.grid();
        let rendered = self.vis.rendered();
        let contains_all = |vertices: &[VertexKey]| {
            vertices
                .iter()
                .all(|&v| grid.position(v).is_some_and(|p| q.contains(&p)))
        };

        match kind {
            ElementKind::Vertex => rendered
                .vertices
                .iter()
                .filter(|&v| contains_all(&[v]))
                .map(ElementKey::Vertex)
                .collect(),
            ElementKind::Edge => rendered
                .edges
                .iter()
                .filter(|&e| grid.edge_vertices(e).is_some_and(|vs| contains_all(&vs)))
                .map(ElementKey::Edge)
                .collect(),
            ElementKind::Face => rendered
                .faces
                .iter()
                .filter(|&f| contains_all(grid.face_vertices(f)))
                .map(ElementKey::Face)
                .collect(),
            ElementKind::Volume => rendered
                .volumes
                .iter()
                .filter(|&v| contains_all(grid.volume_vertices(v)))
                .map(ElementKey::Volume)
                .collect(),
        }
    }

    /// Rendered elements of `kind` whose projection overlaps `rect` and that
    /// have at least one vertex strictly in front of the near plane.
    pub fn query_rect_intersecting(&self, camera: &Camera, kind: ElementKind, rect: &GuiRect) -> Vec<ElementKey> {
        let q = RectQuery::new(camera, rect);
        let grid = self.object.grid();
        let rendered = self.vis.rendered();

        match kind {
            ElementKind::Vertex => rendered
                .vertices
                .iter()
                .filter(|&v| grid.position(v).is_some_and(|p| q.contains(&p)))
                .map(ElementKey::Vertex)
                .collect(),
            ElementKind::Edge => rendered
                .edges
                .iter()
                .filter(|&e| {
                    let Some(vs) = grid.edge_vertices(e) else { return false };
                    q.polygon_hits(&grid.positions(&vs))
                })
                .map(ElementKey::Edge)
                .collect(),
            ElementKind::Face => rendered
                .faces
                .iter()
                .filter(|&f| q.polygon_hits(&grid.positions(grid.face_vertices(f))))
                .map(ElementKey::Face)
                .collect(),
            ElementKind::Volume => {
                // faces of drawn volumes, each tested once
                let mut tested: ElementFlags<FaceKey> = ElementFlags::new();
                let mut collected: ElementFlags<VolumeKey> = ElementFlags::new();
                let mut result = Vec::new();
                for vol in rendered.volumes.iter() {
                    for &f in grid.volume_faces(vol) {
                        if !tested.mark(f) {
                            continue;
                        }
                        if !q.polygon_hits(&grid.positions(grid.face_vertices(f))) {
                            continue;
                        }
                        for &adjacent in grid.volumes_of_face(f) {
                            if self.volume_selectable(adjacent) && collected.mark(adjacent) {
                                result.push(ElementKey::Volume(adjacent));
                            }
                        }
                    }
                }
                result
            }
        }
    }
}

/// Corner index triples of a triangle or a quadrilateral split along 0-2.
fn triangles(corners: usize) -> &'static [[usize; 3]] {
    match corners {
        3 => &[[0, 1, 2]],
        4 => &[[0, 1, 2], [0, 2, 3]],
        _ => &[],
    }
}

/// Window-space box and near plane, fixed for one rectangle query.
struct RectQuery {
    projector: Projector,
    near: Plane,
    min: Point3<f64>,
    max: Point3<f64>,
}

impl RectQuery {
    fn new(camera: &Camera, rect: &GuiRect) -> Self {
        let (y0, y1) = (camera.gui_to_window_y(rect.y0), camera.gui_to_window_y(rect.y1));
        Self {
            projector: camera.projector(),
            near: camera.near_clip_plane(),
            min: Point3::new(rect.x0.min(rect.x1), y0.min(y1), 0.0),
            max: Point3::new(rect.x0.max(rect.x1), y0.max(y1), 1.0),
        }
    }

    fn in_front(&self, p: &Point3<f64>) -> bool {
        classify_point(&self.near, p) == RelativePosition::Outside
    }

    /// In front of the near plane and projected inside the box.
    fn contains(&self, p: &Point3<f64>) -> bool {
        if !self.in_front(p) {
            return false;
        }
        self.projector.project(p).is_some_and(|w| {
            (0..3).all(|i| w[i] >= self.min[i] && w[i] <= self.max[i])
        })
    }

    /// Segment (2 points) or polygon (3-4 points) overlap test.
    fn polygon_hits(&self, points: &[Point3<f64>]) -> bool {
        if !points.iter().any(|p| self.in_front(p)) {
            return false;
        }
        let Some(win) = points
            .iter()
            .map(|p| self.projector.project(p))
            .collect::<Option<Vec<_>>>()
        else {
            return false;
        };

        if win.len() == 2 {
            return segment_intersects_box(&win[0], &win[1], &self.min, &self.max);
        }
        triangles(win.len())
            .iter()
            .any(|&[i, j, k]| triangle_intersects_box(&win[i], &win[j], &win[k], &self.min, &self.max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::ClipPlaneSet;
    use crate::modes::DrawToggles;
    use crate::visibility::rebuild_visibility;
    use meshview_grid::builders;

    fn cube() -> (MeshObject, Visibility) {
        let object = MeshObject::with_single_subset("cube", builders::unit_cube().unwrap());
        let vis = rebuild_visibility(&object, &ClipPlaneSet::new(), &DrawToggles::ALL);
        (object, vis)
    }

    fn ray(from: [f64; 3], to: [f64; 3]) -> Ray {
        Ray::new(Point3::from(from), Point3::from(to)).unwrap()
    }

    #[test]
    fn face_hit_is_the_near_side() {
        let (object, vis) = cube();
        let options = PickOptions::default();
        let picker = Picker::new(&object, &vis, &options, DrawMode::SOLID_WIRE, DrawMode::SOLID_WIRE);

        let f = picker
            .pick_closest_face(&ray([0.5, 0.5, 5.0], [0.5, 0.5, -5.0]))
            .unwrap();
        let n = object.face_normal(f).unwrap();
        assert!(n.z > 0.99);
    }

    #[test]
    fn wire_front_mode_culls_front_faces() {
        let (object, vis) = cube();
        let options = PickOptions::default();
        let picker = Picker::new(&object, &vis, &options, DrawMode::WIRE, DrawMode::SOLID);

        let f = picker
            .pick_closest_face(&ray([0.5, 0.4, 5.0], [0.5, 0.4, -5.0]))
            .unwrap();
        // the far face (z = 0) points away from the ray origin
        assert!(object.face_normal(f).unwrap().z < -0.99);
    }

    #[test]
    fn missing_ray_picks_nothing() {
        let (object, vis) = cube();
        let options = PickOptions::default();
        let picker = Picker::new(&object, &vis, &options, DrawMode::SOLID_WIRE, DrawMode::SOLID_WIRE);
        let r = ray([5.0, 5.0, 5.0], [5.0, 5.0, -5.0]);
        assert!(picker.pick_closest_face(&r).is_none());
        assert!(picker.pick_closest_edge(&r, false).is_some());
    }

    #[test]
    fn vertex_window_limits_ray_parameter() {
        let (object, vis) = cube();
        let options = PickOptions::default();
        let picker = Picker::new(&object, &vis, &options, DrawMode::SOLID_WIRE, DrawMode::SOLID_WIRE);

        let v = picker
            .pick_closest_vertex(&ray([0.8, 0.8, 3.0], [1.4, 1.4, -3.0]))
            .unwrap();
        assert_eq!(object.grid().position(v), Some(Point3::new(1.0, 1.0, 1.0)));

        // every vertex lies behind the ray origin
        assert!(picker
            .pick_closest_vertex(&ray([0.5, 0.5, 3.0], [0.5, 0.5, 6.0]))
            .is_none());
    }

    #[test]
    fn edge_modes() {
        let (object, vis) = cube();
        let options = PickOptions::default();
        let picker = Picker::new(&object, &vis, &options, DrawMode::SOLID_WIRE, DrawMode::SOLID_WIRE);
        let grid = object.grid();

        // a slanted ray through a point of the top back edge (y = 1, z = 1)
        let e = picker
            .pick_closest_edge(&ray([0.3, 3.0, 5.0], [0.3, 0.0, -1.0]), false)
            .unwrap();
        let [a, b] = grid.edge_vertices(e).unwrap();
        let (pa, pb) = (grid.position(a).unwrap(), grid.position(b).unwrap());
        assert_eq!((pa.y, pa.z, pb.y, pb.z), (1.0, 1.0, 1.0, 1.0));

        // target right next to the bottom front edge (y = 0, z = 1)
        let e = picker
            .pick_closest_edge(&ray([0.5, -3.0, 5.0], [0.5, -0.01, 1.0]), true)
            .unwrap();
        let [a, b] = grid.edge_vertices(e).unwrap();
        let (pa, pb) = (grid.position(a).unwrap(), grid.position(b).unwrap());
        assert_eq!((pa.y, pa.z, pb.y, pb.z), (0.0, 1.0, 0.0, 1.0));
    }

    #[test]
    fn volume_pick_goes_through_face() {
        let object = MeshObject::with_single_subset("tet", builders::tetrahedron().unwrap());
        let vis = rebuild_visibility(&object, &ClipPlaneSet::new(), &DrawToggles::ALL);
        let options = PickOptions::default();
        let picker = Picker::new(&object, &vis, &options, DrawMode::SOLID_WIRE, DrawMode::SOLID_WIRE);

        let vol = picker
            .pick_closest_volume(&ray([0.2, 0.2, 5.0], [0.2, 0.2, -5.0]))
            .unwrap();
        assert_eq!(Some(vol), object.grid().volume_keys().next());
    }

    #[test]
    fn unrendered_elements_are_never_picked() {
        let mut object = MeshObject::with_single_subset("cube", builders::unit_cube().unwrap());
        let options = PickOptions::default();
        let r = ray([0.5, 0.5, 5.0], [0.5, 0.5, -5.0]);

        let hit = {
            let vis = rebuild_visibility(&object, &ClipPlaneSet::new(), &DrawToggles::ALL);
            Picker::new(&object, &vis, &options, DrawMode::SOLID_WIRE, DrawMode::SOLID_WIRE)
                .pick_closest_face(&r)
                .unwrap()
        };
        object.set_hidden(ElementKey::Face(hit), true);

        let vis = rebuild_visibility(&object, &ClipPlaneSet::new(), &DrawToggles::ALL);
        let picker = Picker::new(&object, &vis, &options, DrawMode::SOLID_WIRE, DrawMode::SOLID_WIRE);
        let next = picker.pick_closest_face(&r).unwrap();
        assert_ne!(next, hit);
        assert!(vis.is_rendered(ElementKey::Face(next)));
    }
}
