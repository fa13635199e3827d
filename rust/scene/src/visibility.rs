// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The visibility classifier.
//!
//! [`rebuild_visibility`] computes the rendered flag of every element of an
//! object from scratch. When volumes are drawn, faces are not taken from the
//! subset handler directly: each face is drawn iff it bounds fewer than two
//! visible, unclipped volumes, and it is drawn under a derived subset (its
//! own if that is visible, otherwise the one of its single surviving volume).
//!
//! Pass order: volumes, faces, edges, vertices. The volume and face passes
//! also mark the vertices and edges of every drawn face.

use meshview_grid::{ElementKey, FaceKey, Grid, GridFlags, SubsetHandler, VolumeKey};

use crate::clip::ClipPlaneSet;
use crate::modes::DrawToggles;
use crate::object::MeshObject;

/// Element kinds drawn for one object in the current pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActiveKinds {
    pub vertices: bool,
    pub edges: bool,
    pub faces: bool,
    pub volumes: bool,
}

impl ActiveKinds {
    /// A kind is active when its toggle is on and the grid has elements of
    /// that kind. Faces are suppressed while volumes are drawn.
    pub fn resolve(grid: &Grid, toggles: &DrawToggles) -> Self {
        let volumes = toggles.volumes && grid.volume_count() > 0;
        Self {
            vertices: toggles.vertices && grid.vertex_count() > 0,
            edges: toggles.edges && grid.edge_count() > 0,
            faces: toggles.faces && grid.face_count() > 0 && !volumes,
            volumes,
        }
    }

    pub fn count(&self) -> usize {
        [self.vertices, self.edges, self.faces, self.volumes]
            .iter()
            .filter(|&&on| on)
            .count()
    }

    pub fn any(&self) -> bool {
        self.count() > 0
    }
}

/// Immutable result of one classification pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Visibility {
    rendered: GridFlags,
    boundary_faces: Vec<(FaceKey, usize)>,
    active: ActiveKinds,
}

impl Visibility {
    /// Elements that passed clipping, hiding and the toggles. Edges and
    /// vertices marked through a drawn face keep the flag even when their own
    /// subset is invisible, in which case no subset batch draws them.
    pub fn rendered(&self) -> &GridFlags {
        &self.rendered
    }

    /// See [`Visibility::rendered`]: rendered does not imply "in a batch"
    /// for edges and vertices.
    #[inline]
    pub fn is_rendered(&self, key: ElementKey) -> bool {
        self.rendered.get(key)
    }

    pub fn active(&self) -> ActiveKinds {
        self.active
    }

    /// Faces drawn as the surface of the visible volumes, with their derived
    /// subset, in face slot order.
    pub fn boundary_faces(&self) -> &[(FaceKey, usize)] {
        &self.boundary_faces
    }

    pub fn boundary_faces_in(&self, subset: usize) -> impl Iterator<Item = FaceKey> + '_ {
        self.boundary_faces
            .iter()
            .filter(move |&&(_, s)| s == subset)
            .map(|&(f, _)| f)
    }

    /// Marks a drawn face together with its non-hidden vertices and edges.
    fn mark_face_closure(&mut self, object: &MeshObject, face: FaceKey) {
        let grid = object.grid();
        self.rendered.faces.mark(face);
        for &v in grid.face_vertices(face) {
            if !object.is_hidden(ElementKey::Vertex(v)) {
                self.rendered.vertices.mark(v);
            }
        }
        for &e in grid.face_edges(face) {
            if !object.is_hidden(ElementKey::Edge(e)) {
                self.rendered.edges.mark(e);
            }
        }
    }

    fn volume_pass(&mut self, object: &MeshObject, clip: &ClipPlaneSet, toggles: &DrawToggles) {
        let grid = object.grid();
        let subsets = object.subsets();

        for face in grid.face_keys() {
            if clip.clip_face(grid, face, object.face_sphere(face)) {
                continue;
            }

            let own = subsets
                .face_subset(face)
                .filter(|&s| toggles.faces && subsets.is_visible(s));

            let volumes = grid.volumes_of_face(face);
            let derived = if volumes.is_empty() {
                own
            } else {
                let mut count = 0usize;
                let mut survivor: Option<(VolumeKey, usize)> = None;
                for &vol in volumes {
                    let Some(s) = surviving_volume_subset(object, subsets, clip, vol) else {
                        continue;
                    };
                    count += 1;
                    survivor = if count == 1 { Some((vol, s)) } else { None };
                }

                match (own, survivor) {
                    (Some(s), _) if count < 2 => {
                        if let Some((vol, _)) = survivor {
                            self.rendered.volumes.mark(vol);
                        }
                        Some(s)
                    }
                    (_, Some((vol, s))) => {
                        self.rendered.volumes.mark(vol);
                        Some(s)
                    }
                    _ => None,
                }
            };

            if let Some(s) = derived {
                if !object.is_hidden(ElementKey::Face(face)) {
                    self.boundary_faces.push((face, s));
                    self.mark_face_closure(object, face);
                }
            }
        }
    }

    fn face_pass(&mut self, object: &MeshObject, clip: &ClipPlaneSet) {
        let grid = object.grid();
        let subsets = object.subsets();
        let test_planes = clip.any_enabled();

        for s in visible_subsets(subsets) {
            for face in subsets.faces_in(s) {
                if object.is_hidden(ElementKey::Face(face)) {
                    continue;
                }
                if test_planes && clip.clip_face(grid, face, object.face_sphere(face)) {
                    continue;
                }
                self.mark_face_closure(object, face);
            }
        }
    }

    fn edge_pass(&mut self, object: &MeshObject, clip: &ClipPlaneSet) {
        let grid = object.grid();
        let subsets = object.subsets();

        for s in visible_subsets(subsets) {
            for edge in subsets.edges_in(s) {
                if object.is_hidden(ElementKey::Edge(edge)) || clip.clip_edge(grid, edge) {
                    continue;
                }
                self.rendered.edges.mark(edge);
                if let Some(vertices) = grid.edge_vertices(edge) {
                    for v in vertices {
                        if !object.is_hidden(ElementKey::Vertex(v)) {
                            self.rendered.vertices.mark(v);
                        }
                    }
                }
            }
        }
    }

    fn vertex_pass(&mut self, object: &MeshObject, clip: &ClipPlaneSet) {
        let grid = object.grid();
        let subsets = object.subsets();

        for s in visible_subsets(subsets) {
            for vertex in subsets.vertices_in(s) {
                if object.is_hidden(ElementKey::Vertex(vertex)) || clip.clip_vertex(grid, vertex) {
                    continue;
                }
                self.rendered.vertices.mark(vertex);
            }
        }
    }
}

fn visible_subsets(subsets: &SubsetHandler) -> impl Iterator<Item = usize> + '_ {
    (0..subsets.num_subsets()).filter(|&s| subsets.is_visible(s))
}

/// Subset of a volume that is not hidden, sits in a visible subset and is
/// not clipped; `None` otherwise.
fn surviving_volume_subset(
    object: &MeshObject,
    subsets: &SubsetHandler,
    clip: &ClipPlaneSet,
    volume: VolumeKey,
) -> Option<usize> {
    if object.is_hidden(ElementKey::Volume(volume)) {
        return None;
    }
    let s = subsets.volume_subset(volume).filter(|&s| subsets.is_visible(s))?;
    if clip.clip_volume(object.grid(), volume, object.volume_sphere(volume)) {
        return None;
    }
    Some(s)
}

/// Classifies every element of `object` against the clip planes, draw
/// toggles, subset visibility and hidden flags.
pub fn rebuild_visibility(
    object: &MeshObject,
    clip: &ClipPlaneSet,
    toggles: &DrawToggles,
) -> Visibility {
    let mut vis = Visibility::default();
    if !object.is_visible() {
        return vis;
    }

    vis.active = ActiveKinds::resolve(object.grid(), toggles);

    if vis.active.volumes {
        vis.volume_pass(object, clip, toggles);
    }
    if vis.active.faces {
        vis.face_pass(object, clip);
    }
    if vis.active.edges {
        vis.edge_pass(object, clip);
    }
    if vis.active.vertices {
        vis.vertex_pass(object, clip);
    }
    vis
}
