// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh objects: a grid with its subset classification, selection, hidden
//! flags, crease/fixed marks and cached per-element geometry.

use meshview_grid::{
    EdgeKey, ElementFlags, ElementKey, ElementKind, FaceKey, Grid, GridFlags, Sphere,
    SubsetHandler, SubsetInfo, VertexKey, VolumeKey,
};
use nalgebra::Vector3;
use slotmap::SecondaryMap;

#[derive(Debug, Clone)]
pub struct MeshObject {
    name: String,
    grid: Grid,
    subsets: SubsetHandler,
    selection: GridFlags,
    hidden: GridFlags,
    fixed_vertices: ElementFlags<VertexKey>,
    crease_edges: ElementFlags<EdgeKey>,
    visible: bool,
    color: [f32; 4],

    // Geometry caches, refreshed by `update_geometry_caches`
    face_spheres: SecondaryMap<FaceKey, Sphere>,
    volume_spheres: SecondaryMap<VolumeKey, Sphere>,
    face_normals: SecondaryMap<FaceKey, Vector3<f64>>,
}

impl MeshObject {
    pub fn new(name: impl Into<String>, grid: Grid, subsets: SubsetHandler) -> Self {
        let mut object = Self {
            name: name.into(),
            grid,
            subsets,
            selection: GridFlags::new(),
            hidden: GridFlags::new(),
            fixed_vertices: ElementFlags::new(),
            crease_edges: ElementFlags::new(),
            visible: true,
            color: [1.0, 1.0, 1.0, 1.0],
            face_spheres: SecondaryMap::new(),
            volume_spheres: SecondaryMap::new(),
            face_normals: SecondaryMap::new(),
        };
        object.update_geometry_caches();
        object
    }

    /// Wraps a grid with every element assigned to one subset.
    pub fn with_single_subset(name: impl Into<String>, grid: Grid) -> Self {
        let name = name.into();
        let mut subsets = SubsetHandler::new();
        let index = subsets.add_subset(SubsetInfo::new(name.clone(), [0.8, 0.8, 0.8, 1.0]));
        for kind in ElementKind::ALL {
            for key in grid.element_keys(kind) {
                subsets.assign(key, index);
            }
        }
        Self::new(name, grid, subsets)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mutable grid access. Call [`MeshObject::update_geometry_caches`] (or
    /// notify the scene) after changing positions or topology.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn subsets(&self) -> &SubsetHandler {
        &self.subsets
    }

    pub fn subsets_mut(&mut self) -> &mut SubsetHandler {
        &mut self.subsets
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn color(&self) -> [f32; 4] {
        self.color
    }

    pub fn set_color(&mut self, color: [f32; 4]) {
        self.color = color;
    }

    // --- Selection ---

    pub fn selection(&self) -> &GridFlags {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut GridFlags {
        &mut self.selection
    }

    pub fn select(&mut self, key: ElementKey) {
        self.selection.set(key, true);
    }

    pub fn is_selected(&self, key: ElementKey) -> bool {
        self.selection.get(key)
    }

    // --- Hidden flags ---

    pub fn hidden(&self) -> &GridFlags {
        &self.hidden
    }

    pub fn set_hidden(&mut self, key: ElementKey, hidden: bool) {
        self.hidden.set(key, hidden);
    }

    #[inline]
    pub fn is_hidden(&self, key: ElementKey) -> bool {
        self.hidden.get(key)
    }

    /// Hides every selected element and clears the selection.
    pub fn hide_selected(&mut self) {
        for key in self.selection.iter() {
            self.hidden.set(key, true);
        }
        self.selection.clear();
    }

    pub fn unhide_all(&mut self) {
        self.hidden.clear();
    }

    // --- Marks ---

    pub fn fixed_vertices(&self) -> &ElementFlags<VertexKey> {
        &self.fixed_vertices
    }

    pub fn crease_edges(&self) -> &ElementFlags<EdgeKey> {
        &self.crease_edges
    }

    pub fn set_fixed(&mut self, vertex: VertexKey, fixed: bool) {
        self.fixed_vertices.set(vertex, fixed);
    }

    pub fn set_crease(&mut self, edge: EdgeKey, crease: bool) {
        self.crease_edges.set(edge, crease);
    }

    pub fn has_marks(&self) -> bool {
        !self.fixed_vertices.is_empty() || !self.crease_edges.is_empty()
    }

    // --- Cached geometry ---

    /// Recomputes face/volume bounding spheres and face normals.
    pub fn update_geometry_caches(&mut self) {
        self.face_spheres.clear();
        self.volume_spheres.clear();
        self.face_normals.clear();

        for f in self.grid.face_keys() {
            if let Some(sphere) = self.grid.bounding_sphere(ElementKey::Face(f)) {
                self.face_spheres.insert(f, sphere);
            }
            if let Some(normal) = self.grid.face_normal(f) {
                self.face_normals.insert(f, normal);
            }
        }
        for v in self.grid.volume_keys() {
            if let Some(sphere) = self.grid.bounding_sphere(ElementKey::Volume(v)) {
                self.volume_spheres.insert(v, sphere);
            }
        }
    }

    pub fn face_sphere(&self, face: FaceKey) -> Option<&Sphere> {
        self.face_spheres.get(face)
    }

    pub fn volume_sphere(&self, volume: VolumeKey) -> Option<&Sphere> {
        self.volume_spheres.get(volume)
    }

    /// Unit normal of a face, `None` for degenerate faces.
    pub fn face_normal(&self, face: FaceKey) -> Option<Vector3<f64>> {
        self.face_normals.get(face).copied()
    }
}
