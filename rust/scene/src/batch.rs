// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Render batches built from a visibility snapshot.
//!
//! A [`BatchSet`] holds, in this order: one batch per subset for each active
//! kind (volumes, faces, edges, vertices), then the selection batch if the
//! selection is non-empty, then the marks batch if the object has fixed
//! vertices or crease edges. Batches of invisible subsets exist but are
//! empty, so indices stay stable for in-place replacement.

use meshview_grid::{EdgeKey, ElementKey, FaceKey, VertexKey};
use nalgebra::Point3;

use crate::object::MeshObject;
use crate::options::ColorOptions;
use crate::visibility::Visibility;

/// How the renderer draws a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderMode {
    /// Lit solid pass followed by a wireframe pass.
    SolidDoublePass,
    /// Flat color, drawn once.
    ColorSinglePass,
    /// Flat color with blending, solid and wireframe.
    ColorDoublePass,
    /// Unlit color, drawn once.
    UnlitSinglePass,
}

/// What a batch contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchKind {
    Volumes { subset: usize },
    Faces { subset: usize },
    Edges { subset: usize },
    Vertices { subset: usize },
    Selection,
    Marks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Points,
    Lines,
    Triangles,
}

/// One element's primitives. Quadrilaterals become two triangles sharing the
/// diagonal from corner 0 to corner 2.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub element: ElementKey,
    pub primitive: Primitive,
    pub color: [f32; 4],
    pub positions: Vec<[f32; 3]>,
    pub normal: Option<[f32; 3]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub kind: BatchKind,
    pub mode: RenderMode,
    pub commands: Vec<DrawCommand>,
}

impl Batch {
    fn new(kind: BatchKind, mode: RenderMode) -> Self {
        Self {
            kind,
            mode,
            commands: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Elements in draw order.
    pub fn elements(&self) -> impl Iterator<Item = ElementKey> + '_ {
        self.commands.iter().map(|c| c.element)
    }
}

fn to_f32(p: &Point3<f64>) -> [f32; 3] {
    [p.x as f32, p.y as f32, p.z as f32]
}

/// Appends draw commands while reading geometry from one object.
struct Writer<'a> {
    object: &'a MeshObject,
    batch: Batch,
}

impl<'a> Writer<'a> {
    fn new(object: &'a MeshObject, kind: BatchKind, mode: RenderMode) -> Self {
        Self {
            object,
            batch: Batch::new(kind, mode),
        }
    }

    fn face(&mut self, face: FaceKey, element: ElementKey, color: [f32; 4]) {
        let grid = self.object.grid();
        let corners = grid.positions(grid.face_vertices(face));
        let positions = match corners.len() {
            3 => vec![to_f32(&corners[0]), to_f32(&corners[1]), to_f32(&corners[2])],
            4 => [0, 1, 2, 0, 2, 3].iter().map(|&i| to_f32(&corners[i])).collect(),
            _ => return,
        };
        let normal = self
            .object
            .face_normal(face)
            .map(|n| [n.x as f32, n.y as f32, n.z as f32]);
        self.batch.commands.push(DrawCommand {
            element,
            primitive: Primitive::Triangles,
            color,
            positions,
            normal,
        });
    }

    fn edge(&mut self, edge: EdgeKey, color: [f32; 4]) {
        let grid = self.object.grid();
        let Some(vertices) = grid.edge_vertices(edge) else {
            return;
        };
        let positions: Vec<_> = grid.positions(&vertices).iter().map(to_f32).collect();
        if positions.len() != 2 {
            return;
        }
        self.batch.commands.push(DrawCommand {
            element: ElementKey::Edge(edge),
            primitive: Primitive::Lines,
            color,
            positions,
            normal: None,
        });
    }

    fn vertex(&mut self, vertex: VertexKey, color: [f32; 4]) {
        let Some(p) = self.object.grid().position(vertex) else {
            return;
        };
        self.batch.commands.push(DrawCommand {
            element: ElementKey::Vertex(vertex),
            primitive: Primitive::Points,
            color,
            positions: vec![to_f32(&p)],
            normal: None,
        });
    }

    fn finish(self) -> Batch {
        self.batch
    }
}

/// The ordered batch list of one object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSet {
    batches: Vec<Batch>,
    selection_index: Option<usize>,
}

impl BatchSet {
    /// Builds every batch of `object` from its visibility snapshot.
    pub fn build(object: &MeshObject, vis: &Visibility, colors: &ColorOptions) -> Self {
        let mut set = Self::default();
        if !object.is_visible() {
            return set;
        }

        let subsets = object.subsets();
        let active = vis.active();
        let num_subsets = subsets.num_subsets();

        if active.volumes {
            for s in 0..num_subsets {
                set.batches.push(subset_batch(object, vis, BatchKind::Volumes { subset: s }));
            }
        }
        if active.faces {
            for s in 0..num_subsets {
                set.batches.push(subset_batch(object, vis, BatchKind::Faces { subset: s }));
            }
        }
        if active.edges {
            for s in 0..num_subsets {
                set.batches.push(subset_batch(object, vis, BatchKind::Edges { subset: s }));
            }
        }
        if active.vertices {
            for s in 0..num_subsets {
                set.batches.push(subset_batch(object, vis, BatchKind::Vertices { subset: s }));
            }
        }

        if !object.selection().is_empty() {
            set.selection_index = Some(set.batches.len());
            set.batches.push(selection_batch(object, vis, colors));
        }

        if object.has_marks() {
            set.batches.push(marks_batch(object, vis, colors));
        }

        set
    }

    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn selection_index(&self) -> Option<usize> {
        self.selection_index
    }

    pub fn selection(&self) -> Option<&Batch> {
        self.selection_index.and_then(|i| self.batches.get(i))
    }

    /// Rebuilds only the selection batch in place. Returns `false` (and
    /// leaves the set untouched) when there is no selection batch to replace
    /// or the selection became empty; the caller then needs a full build.
    pub fn replace_selection(
        &mut self,
        object: &MeshObject,
        vis: &Visibility,
        colors: &ColorOptions,
    ) -> bool {
        let Some(index) = self.selection_index else {
            return false;
        };
        if object.selection().is_empty() {
            return false;
        }
        self.batches[index] = selection_batch(object, vis, colors);
        true
    }
}

fn subset_color(object: &MeshObject, subset: usize) -> [f32; 4] {
    object
        .subsets()
        .subset(subset)
        .map_or(object.color(), |info| info.color)
}

fn subset_batch(object: &MeshObject, vis: &Visibility, kind: BatchKind) -> Batch {
    let subsets = object.subsets();
    let rendered = vis.rendered();

    match kind {
        BatchKind::Volumes { subset } => {
            // derived subsets are visible by construction
            let mut w = Writer::new(object, kind, RenderMode::SolidDoublePass);
            let color = subset_color(object, subset);
            for f in vis.boundary_faces_in(subset) {
                w.face(f, ElementKey::Face(f), color);
            }
            w.finish()
        }
        BatchKind::Faces { subset } => {
            let mut w = Writer::new(object, kind, RenderMode::SolidDoublePass);
            if subsets.is_visible(subset) {
                let color = subset_color(object, subset);
                for f in subsets.faces_in(subset).filter(|&f| rendered.faces.get(f)) {
                    w.face(f, ElementKey::Face(f), color);
                }
            }
            w.finish()
        }
        BatchKind::Edges { subset } => {
            let mut w = Writer::new(object, kind, RenderMode::UnlitSinglePass);
            if subsets.is_visible(subset) {
                let color = subset_color(object, subset);
                for e in subsets.edges_in(subset) {
                    if rendered.edges.get(e) && !object.is_hidden(ElementKey::Edge(e)) {
                        w.edge(e, color);
                    }
                }
            }
            w.finish()
        }
        BatchKind::Vertices { subset } => {
            let mut w = Writer::new(object, kind, RenderMode::UnlitSinglePass);
            if subsets.is_visible(subset) {
                let color = subset_color(object, subset);
                for v in subsets.vertices_in(subset) {
                    if rendered.vertices.get(v) && !object.is_hidden(ElementKey::Vertex(v)) {
                        w.vertex(v, color);
                    }
                }
            }
            w.finish()
        }
        BatchKind::Selection | BatchKind::Marks => Batch::new(kind, RenderMode::ColorSinglePass),
    }
}

/// Selected, rendered elements: translucent faces, translucent volume
/// surfaces, then edges, then vertices.
fn selection_batch(object: &MeshObject, vis: &Visibility, colors: &ColorOptions) -> Batch {
    let active = vis.active();
    let rendered = vis.rendered();
    let selection = object.selection();
    let mut w = Writer::new(object, BatchKind::Selection, RenderMode::ColorDoublePass);

    if active.faces || active.volumes {
        let color = colors.selection_rgba(colors.selection_face_alpha);
        for f in selection.faces.iter().filter(|&f| rendered.faces.get(f)) {
            w.face(f, ElementKey::Face(f), color);
        }
    }

    if active.volumes {
        let color = colors.selection_rgba(colors.selection_volume_alpha);
        for vol in selection.volumes.iter().filter(|&v| rendered.volumes.get(v)) {
            for &f in object.grid().volume_faces(vol) {
                if rendered.faces.get(f) {
                    w.face(f, ElementKey::Volume(vol), color);
                }
            }
        }
    }

    if active.edges || active.faces || active.volumes {
        let color = colors.selection_rgba(1.0);
        for e in selection.edges.iter().filter(|&e| rendered.edges.get(e)) {
            w.edge(e, color);
        }
    }

    if active.any() {
        let color = colors.selection_rgba(1.0);
        for v in selection.vertices.iter().filter(|&v| rendered.vertices.get(v)) {
            w.vertex(v, color);
        }
    }

    w.finish()
}

/// Rendered fixed vertices and crease edges.
fn marks_batch(object: &MeshObject, vis: &Visibility, colors: &ColorOptions) -> Batch {
    let rendered = vis.rendered();
    let mut w = Writer::new(object, BatchKind::Marks, RenderMode::ColorSinglePass);
    for e in object.crease_edges().iter().filter(|&e| rendered.edges.get(e)) {
        w.edge(e, colors.marks);
    }
    for v in object.fixed_vertices().iter().filter(|&v| rendered.vertices.get(v)) {
        w.vertex(v, colors.marks);
    }
    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::ClipPlaneSet;
    use crate::modes::DrawToggles;
    use crate::visibility::rebuild_visibility;
    use meshview_grid::{builders, Grid, SubsetInfo};

    fn build(object: &MeshObject, toggles: &DrawToggles) -> BatchSet {
        let vis = rebuild_visibility(object, &ClipPlaneSet::new(), toggles);
        BatchSet::build(object, &vis, &ColorOptions::default())
    }

    #[test]
    fn empty_object_has_no_batches() {
        let object = MeshObject::with_single_subset("empty", Grid::new());
        assert!(build(&object, &DrawToggles::ALL).is_empty());
    }

    #[test]
    fn cube_batches_in_kind_order() {
        let object = MeshObject::with_single_subset("cube", builders::unit_cube().unwrap());
        let set = build(&object, &DrawToggles::ALL);

        let kinds: Vec<_> = set.batches().iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![
                BatchKind::Faces { subset: 0 },
                BatchKind::Edges { subset: 0 },
                BatchKind::Vertices { subset: 0 },
            ]
        );
        assert_eq!(set.batches()[0].mode, RenderMode::SolidDoublePass);
        assert_eq!(set.batches()[0].len(), 12);
        assert_eq!(set.batches()[1].mode, RenderMode::UnlitSinglePass);
        assert_eq!(set.batches()[1].len(), 18);
        assert_eq!(set.batches()[2].len(), 8);
        assert!(set.selection_index().is_none());
    }

    #[test]
    fn closure_edges_of_hidden_subsets_stay_out_of_batches() {
        let mut grid = Grid::new();
        let a = grid.add_vertex(0.0, 0.0, 0.0);
        let b = grid.add_vertex(1.0, 0.0, 0.0);
        let c = grid.add_vertex(0.0, 1.0, 0.0);
        let face = grid.add_triangle(a, b, c).unwrap();

        let mut subsets = meshview_grid::SubsetHandler::new();
        let shown = subsets.add_subset(SubsetInfo::new("faces", [1.0, 1.0, 1.0, 1.0]));
        let hidden = subsets.add_subset(SubsetInfo::new("lines", [0.0, 0.0, 0.0, 1.0]));
        subsets.assign(ElementKey::Face(face), shown);
        for &e in grid.face_edges(face) {
            subsets.assign(ElementKey::Edge(e), hidden);
        }
        for &v in grid.face_vertices(face) {
            subsets.assign(ElementKey::Vertex(v), hidden);
        }
        subsets.set_visible(hidden, false).unwrap();
        let object = MeshObject::new("tri", grid, subsets);

        let vis = rebuild_visibility(&object, &ClipPlaneSet::new(), &DrawToggles::ALL);
        let set = BatchSet::build(&object, &vis, &ColorOptions::default());

        let edge = object.grid().face_edges(face)[0];
        assert!(vis.is_rendered(ElementKey::Edge(edge)));
        assert!(set
            .batches()
            .iter()
            .all(|batch| batch.elements().all(|k| k != ElementKey::Edge(edge))));
        assert_eq!(set.batches()[0].len(), 1);
    }

    #[test]
    fn batch_count_invariant_with_selection_and_marks() {
        let grid = builders::tetrahedron_pair().unwrap();
        let mut subsets = meshview_grid::SubsetHandler::new();
        subsets.add_subset(SubsetInfo::new("a", [1.0, 0.0, 0.0, 1.0]));
        subsets.add_subset(SubsetInfo::new("b", [0.0, 1.0, 0.0, 1.0]));
        for kind in meshview_grid::ElementKind::ALL {
            for key in grid.element_keys(kind) {
                subsets.assign(key, 0);
            }
        }
        let mut object = MeshObject::new("pair", grid, subsets);
        let v = object.grid().vertex_keys().next().unwrap();
        let vol = object.grid().volume_keys().next().unwrap();
        object.select(ElementKey::Volume(vol));
        object.set_fixed(v, true);

        let set = build(&object, &DrawToggles::ALL);
        // (volumes, edges, vertices) × 2 subsets + selection + marks
        assert_eq!(set.len(), 3 * 2 + 2);
        assert_eq!(set.selection_index(), Some(6));
        assert_eq!(set.batches()[7].kind, BatchKind::Marks);
        assert_eq!(set.batches()[7].mode, RenderMode::ColorSinglePass);

        // the empty subset keeps its (empty) slot
        assert_eq!(set.batches()[1].kind, BatchKind::Volumes { subset: 1 });
        assert!(set.batches()[1].is_empty());

        let selection = set.selection().unwrap();
        assert_eq!(selection.mode, RenderMode::ColorDoublePass);
        // three exterior faces of the selected tetrahedron, drawn translucent
        assert_eq!(selection.len(), 3);
        assert!(selection.commands.iter().all(|c| c.color[3] == 0.3));
    }

    #[test]
    fn selection_layers_faces_before_edges_before_vertices() {
        let mut object = MeshObject::with_single_subset("cube", builders::unit_cube().unwrap());
        let grid = object.grid().clone();
        let f = grid.face_keys().next().unwrap();
        let e = grid.face_edges(f)[0];
        let v = grid.face_vertices(f)[0];
        object.select(ElementKey::Vertex(v));
        object.select(ElementKey::Edge(e));
        object.select(ElementKey::Face(f));

        let set = build(&object, &DrawToggles::ALL);
        let selection = set.selection().unwrap();
        let order: Vec<_> = selection.elements().collect();
        assert_eq!(
            order,
            vec![ElementKey::Face(f), ElementKey::Edge(e), ElementKey::Vertex(v)]
        );
        assert_eq!(selection.commands[0].color[3], 0.5);
    }

    #[test]
    fn quads_are_split_into_two_triangles() {
        let object = MeshObject::with_single_subset("hex", builders::hexahedron().unwrap());
        let set = build(&object, &DrawToggles::ALL);
        let volumes = &set.batches()[0];
        assert_eq!(volumes.kind, BatchKind::Volumes { subset: 0 });
        assert_eq!(volumes.len(), 6);
        assert!(volumes.commands.iter().all(|c| c.positions.len() == 6));
    }

    #[test]
    fn replace_selection_keeps_other_batches() {
        let mut object = MeshObject::with_single_subset("cube", builders::unit_cube().unwrap());
        let toggles = DrawToggles::ALL;
        let vis = rebuild_visibility(&object, &ClipPlaneSet::new(), &toggles);
        let colors = ColorOptions::default();

        let mut set = BatchSet::build(&object, &vis, &colors);
        assert!(!set.replace_selection(&object, &vis, &colors));

        let v = object.grid().vertex_keys().next().unwrap();
        object.select(ElementKey::Vertex(v));
        let mut set2 = BatchSet::build(&object, &vis, &colors);
        let before = set2.batches()[..3].to_vec();

        let w = object.grid().vertex_keys().nth(1).unwrap();
        object.select(ElementKey::Vertex(w));
        assert!(set2.replace_selection(&object, &vis, &colors));
        assert_eq!(&set2.batches()[..3], before.as_slice());
        assert_eq!(set2.selection().unwrap().len(), 2);

        set = BatchSet::build(&object, &vis, &colors);
        assert_eq!(set, set2);
    }

    #[test]
    fn invisible_subset_batch_is_empty() {
        let mut object = MeshObject::with_single_subset("cube", builders::unit_cube().unwrap());
        object.subsets_mut().set_visible(0, false).unwrap();
        let set = build(&object, &DrawToggles::ALL);
        assert_eq!(set.len(), 3);
        assert!(set.batches().iter().all(|b| b.is_empty()));
    }
}
