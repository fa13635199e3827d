// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The scene orchestrator.
//!
//! The [`Scene`] owns its objects, the camera, the clip planes and the draw
//! settings. Every mutating entry point finishes the rebuild it implies
//! before returning:
//!
//! - geometry change: geometry caches, visibility and batches
//! - visuals change (clip planes, toggles, hidden flags, subset visibility):
//!   visibility and batches
//! - selection change: the selection batch only, or a full rebuild when no
//!   selection batch exists yet
//!
//! Draw modes and the camera do not affect visibility and never trigger a
//! rebuild.
//!
//! Each object carries at most one render snapshot (visibility + batches).
//! Handing out mutable object access drops the snapshot, so queries on that
//! object return nothing until the matching `notify_*` call rebuilds it.

use meshview_grid::{
    EdgeKey, ElementKey, ElementKind, FaceKey, GridFlags, Sphere, VertexKey, VolumeKey,
};
use nalgebra::{Point3, Vector3};
use slotmap::{new_key_type, SlotMap};
use tracing::{debug, info, warn};

use crate::batch::BatchSet;
use crate::camera::Camera;
use crate::clip::ClipPlaneSet;
use crate::error::{Error, Result};
use crate::modes::{DrawMode, DrawToggles};
use crate::object::MeshObject;
use crate::options::SceneOptions;
use crate::picking::{GuiRect, Picker};
use crate::predicates::Ray;
use crate::visibility::{rebuild_visibility, Visibility};

new_key_type! {
    /// Handle of an object registered with a [`Scene`].
    pub struct ObjectId;
}

/// Near and far clip distances suggested by [`Scene::estimate_near_far`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearFar {
    pub near: f64,
    pub far: f64,
}

#[derive(Debug, Clone)]
struct RenderState {
    visibility: Visibility,
    batches: BatchSet,
}

#[derive(Debug, Clone)]
struct Entry {
    object: MeshObject,
    render: Option<RenderState>,
}

#[derive(Debug, Clone)]
pub struct Scene {
    options: SceneOptions,
    objects: SlotMap<ObjectId, Entry>,
    order: Vec<ObjectId>,
    camera: Camera,
    clip_planes: ClipPlaneSet,
    toggles: DrawToggles,
    front_mode: DrawMode,
    back_mode: DrawMode,
}

impl Default for Scene {
    fn default() -> Self {
        Self::with_valid_options(SceneOptions::default())
    }
}

impl Scene {
    /// Creates an empty scene after validating `options`.
    pub fn new(options: SceneOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self::with_valid_options(options))
    }

    fn with_valid_options(options: SceneOptions) -> Self {
        Self {
            toggles: options.initial_toggles,
            front_mode: options.initial_front_mode,
            back_mode: options.initial_back_mode,
            options,
            objects: SlotMap::with_key(),
            order: Vec::new(),
            camera: Camera::default(),
            clip_planes: ClipPlaneSet::new(),
        }
    }

    pub fn options(&self) -> &SceneOptions {
        &self.options
    }

    // --- Object lifecycle ---

    /// Registers an object and builds its first snapshot.
    pub fn add_object(&mut self, mut object: MeshObject) -> ObjectId {
        object.update_geometry_caches();
        info!(
            name = object.name(),
            vertices = object.grid().vertex_count(),
            faces = object.grid().face_count(),
            volumes = object.grid().volume_count(),
            "adding object"
        );
        let id = self.objects.insert(Entry {
            object,
            render: None,
        });
        self.order.push(id);
        self.rebuild(id);
        id
    }

    /// Removes and drops an object.
    pub fn remove_object(&mut self, id: ObjectId) -> Result<()> {
        self.detach_object(id).map(drop)
    }

    /// Removes an object and hands it back to the caller.
    pub fn detach_object(&mut self, id: ObjectId) -> Result<MeshObject> {
        let entry = self.objects.remove(id).ok_or_else(|| unknown(id))?;
        self.order.retain(|&other| other != id);
        info!(name = entry.object.name(), "detached object");
        Ok(entry.object)
    }

    pub fn object(&self, id: ObjectId) -> Option<&MeshObject> {
        self.objects.get(id).map(|e| &e.object)
    }

    /// Mutable access to an object. Its snapshot is discarded; call one of
    /// the `notify_*` methods when done.
    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut MeshObject> {
        self.objects.get_mut(id).map(|e| {
            e.render = None;
            &mut e.object
        })
    }

    /// Mutable access to the selection only. The snapshot stays valid; call
    /// [`Scene::notify_selection_changed`] to refresh the selection batch.
    pub fn selection_mut(&mut self, id: ObjectId) -> Option<&mut GridFlags> {
        self.objects.get_mut(id).map(|e| e.object.selection_mut())
    }

    /// Objects in registration order.
    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &MeshObject)> + '_ {
        self.order
            .iter()
            .filter_map(|&id| self.objects.get(id).map(|e| (id, &e.object)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // --- Notifications ---

    pub fn notify_geometry_changed(&mut self, id: ObjectId) -> Result<()> {
        let entry = self.entry_mut(id)?;
        entry.object.update_geometry_caches();
        self.rebuild(id);
        Ok(())
    }

    pub fn notify_visuals_changed(&mut self, id: ObjectId) -> Result<()> {
        self.entry_mut(id)?;
        self.rebuild(id);
        Ok(())
    }

    pub fn notify_selection_changed(&mut self, id: ObjectId) -> Result<()> {
        let colors = &self.options.colors;
        let entry = self
            .objects
            .get_mut(id)
            .ok_or_else(|| unknown(id))?;
        let replaced = match entry.render.as_mut() {
            Some(state) => state
                .batches
                .replace_selection(&entry.object, &state.visibility, colors),
            None => false,
        };
        if replaced {
            debug!(object = ?id, "selection batch replaced");
        } else {
            self.rebuild(id);
        }
        Ok(())
    }

    /// Rebuilds every object.
    pub fn update_all_visuals(&mut self) {
        for id in self.order.clone() {
            self.rebuild(id);
        }
    }

    // --- Object visuals ---

    pub fn set_object_visible(&mut self, id: ObjectId, visible: bool) -> Result<()> {
        self.entry_mut(id)?.object.set_visible(visible);
        self.rebuild(id);
        Ok(())
    }

    pub fn set_subset_visible(&mut self, id: ObjectId, subset: usize, visible: bool) -> Result<()> {
        self.entry_mut(id)?
            .object
            .subsets_mut()
            .set_visible(subset, visible)?;
        self.rebuild(id);
        Ok(())
    }

    pub fn hide_selected(&mut self, id: ObjectId) -> Result<()> {
        self.entry_mut(id)?.object.hide_selected();
        self.rebuild(id);
        Ok(())
    }

    pub fn unhide_all(&mut self, id: ObjectId) -> Result<()> {
        self.entry_mut(id)?.object.unhide_all();
        self.rebuild(id);
        Ok(())
    }

    // --- Clip planes and draw settings ---

    pub fn set_clip_plane(&mut self, index: usize, point: Point3<f64>, normal: Vector3<f64>) -> Result<()> {
        self.clip_planes.set_plane(index, point, normal)?;
        self.update_all_visuals();
        Ok(())
    }

    pub fn enable_clip_plane(&mut self, index: usize, enabled: bool) -> Result<()> {
        self.clip_planes.enable(index, enabled)?;
        self.update_all_visuals();
        Ok(())
    }

    pub fn clip_planes(&self) -> &ClipPlaneSet {
        &self.clip_planes
    }

    pub fn set_draw_toggles(&mut self, toggles: DrawToggles) {
        self.toggles = toggles;
        self.update_all_visuals();
    }

    pub fn draw_toggles(&self) -> DrawToggles {
        self.toggles
    }

    pub fn set_draw_mode_front(&mut self, mode: DrawMode) {
        self.front_mode = mode;
    }

    pub fn set_draw_mode_back(&mut self, mode: DrawMode) {
        self.back_mode = mode;
    }

    pub fn draw_mode_front(&self) -> DrawMode {
        self.front_mode
    }

    pub fn draw_mode_back(&self) -> DrawMode {
        self.back_mode
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    // --- Snapshots ---

    /// Current visibility of an object, `None` if it has no valid snapshot.
    pub fn visibility(&self, id: ObjectId) -> Option<&Visibility> {
        self.objects
            .get(id)?
            .render
            .as_ref()
            .map(|state| &state.visibility)
    }

    /// Current batches of an object, `None` if it has no valid snapshot.
    pub fn batches(&self, id: ObjectId) -> Option<&BatchSet> {
        self.objects
            .get(id)?
            .render
            .as_ref()
            .map(|state| &state.batches)
    }

    /// Batches of every object with a snapshot, in registration order.
    pub fn render_list(&self) -> impl Iterator<Item = (ObjectId, &BatchSet)> + '_ {
        self.order
            .iter()
            .filter_map(|&id| self.batches(id).map(|b| (id, b)))
    }

    // --- Picking ---

    fn picker(&self, id: ObjectId) -> Option<Picker<'_>> {
        let entry = self.objects.get(id)?;
        let state = entry.render.as_ref()?;
        Some(Picker::new(
            &entry.object,
            &state.visibility,
            &self.options.pick,
            self.front_mode,
            self.back_mode,
        ))
    }

    pub fn pick_vertex(&self, id: ObjectId, ray: &Ray) -> Option<VertexKey> {
        self.picker(id)?.pick_closest_vertex(ray)
    }

    pub fn pick_edge(&self, id: ObjectId, ray: &Ray, closest_to_target: bool) -> Option<EdgeKey> {
        self.picker(id)?.pick_closest_edge(ray, closest_to_target)
    }

    pub fn pick_face(&self, id: ObjectId, ray: &Ray) -> Option<FaceKey> {
        self.picker(id)?.pick_closest_face(ray)
    }

    pub fn pick_volume(&self, id: ObjectId, ray: &Ray) -> Option<VolumeKey> {
        self.picker(id)?.pick_closest_volume(ray)
    }

    pub fn query_rect_contained(&self, id: ObjectId, kind: ElementKind, rect: &GuiRect) -> Vec<ElementKey> {
        self.picker(id)
            .map(|p| p.query_rect_contained(&self.camera, kind, rect))
            .unwrap_or_default()
    }

    pub fn query_rect_intersecting(&self, id: ObjectId, kind: ElementKind, rect: &GuiRect) -> Vec<ElementKey> {
        self.picker(id)
            .map(|p| p.query_rect_intersecting(&self.camera, kind, rect))
            .unwrap_or_default()
    }

    // --- Framing ---

    /// Bounds of all visible objects in world coordinates.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let scale = self.camera.world_scale();
        self.objects()
            .filter(|(_, object)| object.is_visible())
            .filter_map(|(_, object)| object.grid().bounding_box())
            .reduce(|(amin, amax), (bmin, bmax)| (amin.inf(&bmin), amax.sup(&bmax)))
            .map(|(min, max)| {
                (
                    Point3::from(min.coords.component_mul(&scale)),
                    Point3::from(max.coords.component_mul(&scale)),
                )
            })
    }

    /// Sphere around [`Scene::bounding_box`].
    pub fn bounding_sphere(&self) -> Option<Sphere> {
        self.bounding_box()
            .map(|(min, max)| Sphere::around_box(&min, &max))
    }

    /// Suggests near and far clip distances for a camera at `from` looking
    /// at `to`.
    ///
    /// The visible scene's bounding sphere is projected onto the view
    /// direction. When the camera is inside the padded sphere, an enabled
    /// clip plane close to the camera bounds the near distance instead.
    /// The near distance never exceeds `|to - from| / view_length_divisor`
    /// and never drops below `min_near`. `far` may end up below `near` when
    /// the whole scene lies behind the camera.
    pub fn estimate_near_far(&self, from: Point3<f64>, to: Point3<f64>) -> Result<NearFar> {
        let nf = &self.options.near_far;
        let dir = to - from;
        let view_length = dir.norm();
        if !view_length.is_finite() || view_length == 0.0 {
            return Err(Error::DegenerateRay);
        }
        let n = dir / view_length;

        let sphere = match self.bounding_sphere() {
            Some(s) if s.radius >= f64::EPSILON => s,
            Some(s) => Sphere::new(s.center, 1.0),
            None => Sphere::new(Point3::origin(), 1.0),
        };

        let dist = (sphere.center - from).dot(&n);
        let padded = sphere.radius * nf.sphere_padding;
        let far = dist + padded;
        let mut near = dist - padded;

        if near < 0.0 && self.clip_planes.any_enabled() {
            near = self
                .clip_planes
                .enabled_planes()
                .map(|plane| plane.signed_distance(&from).abs() * nf.clip_plane_factor)
                .fold(f64::INFINITY, f64::min)
                .max(nf.min_near);
        } else {
            near = near.max((sphere.radius * nf.border_factor).max(nf.min_near));
        }

        near = near.min(view_length / nf.view_length_divisor).max(nf.min_near);

        Ok(NearFar { near, far })
    }

    // --- Internals ---

    fn entry_mut(&mut self, id: ObjectId) -> Result<&mut Entry> {
        self.objects.get_mut(id).ok_or_else(|| unknown(id))
    }

    /// Recomputes visibility and batches of one object.
    fn rebuild(&mut self, id: ObjectId) {
        let Some(entry) = self.objects.get_mut(id) else {
            warn!(object = ?id, "rebuild requested for unknown object");
            return;
        };
        let visibility = rebuild_visibility(&entry.object, &self.clip_planes, &self.toggles);
        let batches = BatchSet::build(&entry.object, &visibility, &self.options.colors);

        let rendered = visibility.rendered();
        debug!(
            object = ?id,
            vertices = rendered.count(ElementKind::Vertex),
            edges = rendered.count(ElementKind::Edge),
            faces = rendered.count(ElementKind::Face),
            volumes = rendered.count(ElementKind::Volume),
            batches = batches.len(),
            "rebuilt visibility"
        );

        entry.render = Some(RenderState {
            visibility,
            batches,
        });
    }
}

fn unknown(id: ObjectId) -> Error {
    warn!(object = ?id, "unknown object");
    Error::ObjectNotFound(id)
}
