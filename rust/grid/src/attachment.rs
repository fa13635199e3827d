// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Boolean per-element attachments.
//!
//! Flags live outside the [`Grid`](crate::Grid) arena in secondary maps keyed
//! by the same generational keys, so a stale key never aliases a new element.

use slotmap::{Key, SecondaryMap};

use crate::keys::*;

/// A set of marked elements of one kind.
#[derive(Debug, Clone)]
pub struct ElementFlags<K: Key> {
    marked: SecondaryMap<K, ()>,
}

impl<K: Key> ElementFlags<K> {
    pub fn new() -> Self {
        Self {
            marked: SecondaryMap::new(),
        }
    }

    /// Marks or unmarks `key`.
    pub fn set(&mut self, key: K, value: bool) {
        if value {
            self.marked.insert(key, ());
        } else {
            self.marked.remove(key);
        }
    }

    /// Marks `key`, returning `true` if it was not marked before.
    pub fn mark(&mut self, key: K) -> bool {
        self.marked.insert(key, ()).is_none()
    }

    #[inline]
    pub fn get(&self, key: K) -> bool {
        self.marked.contains_key(key)
    }

    pub fn clear(&mut self) {
        self.marked.clear();
    }

    pub fn len(&self) -> usize {
        self.marked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marked.is_empty()
    }

    /// Marked keys in slot order.
    pub fn iter(&self) -> impl Iterator<Item = K> + '_ {
        self.marked.keys()
    }
}

impl<K: Key> Default for ElementFlags<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key> PartialEq for ElementFlags<K> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|k| other.get(k))
    }
}

impl<K: Key> FromIterator<K> for ElementFlags<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut flags = Self::new();
        for key in iter {
            flags.mark(key);
        }
        flags
    }
}

/// Flags for every element kind of one grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridFlags {
    pub vertices: ElementFlags<VertexKey>,
    pub edges: ElementFlags<EdgeKey>,
    pub faces: ElementFlags<FaceKey>,
    pub volumes: ElementFlags<VolumeKey>,
}

impl GridFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: ElementKey, value: bool) {
        match key {
            ElementKey::Vertex(k) => self.vertices.set(k, value),
            ElementKey::Edge(k) => self.edges.set(k, value),
            ElementKey::Face(k) => self.faces.set(k, value),
            ElementKey::Volume(k) => self.volumes.set(k, value),
        }
    }

    pub fn get(&self, key: ElementKey) -> bool {
        match key {
            ElementKey::Vertex(k) => self.vertices.get(k),
            ElementKey::Edge(k) => self.edges.get(k),
            ElementKey::Face(k) => self.faces.get(k),
            ElementKey::Volume(k) => self.volumes.get(k),
        }
    }

    /// Number of marked elements of one kind.
    pub fn count(&self, kind: ElementKind) -> usize {
        match kind {
            ElementKind::Vertex => self.vertices.len(),
            ElementKind::Edge => self.edges.len(),
            ElementKind::Face => self.faces.len(),
            ElementKind::Volume => self.volumes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        ElementKind::ALL.iter().all(|&k| self.count(k) == 0)
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.edges.clear();
        self.faces.clear();
        self.volumes.clear();
    }

    /// All marked elements, lowest dimension first, slot order within a kind.
    pub fn iter(&self) -> impl Iterator<Item = ElementKey> + '_ {
        self.vertices
            .iter()
            .map(ElementKey::Vertex)
            .chain(self.edges.iter().map(ElementKey::Edge))
            .chain(self.faces.iter().map(ElementKey::Face))
            .chain(self.volumes.iter().map(ElementKey::Volume))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Grid;

    #[test]
    fn set_and_clear() {
        let mut grid = Grid::new();
        let a = grid.add_vertex(0.0, 0.0, 0.0);
        let b = grid.add_vertex(1.0, 0.0, 0.0);

        let mut flags = ElementFlags::new();
        assert!(flags.mark(a));
        assert!(!flags.mark(a));
        assert!(flags.get(a));
        assert!(!flags.get(b));
        assert_eq!(flags.len(), 1);

        flags.set(a, false);
        assert!(flags.is_empty());
    }

    #[test]
    fn equality_ignores_insertion_order() {
        let mut grid = Grid::new();
        let a = grid.add_vertex(0.0, 0.0, 0.0);
        let b = grid.add_vertex(1.0, 0.0, 0.0);

        let x: ElementFlags<_> = [a, b].into_iter().collect();
        let y: ElementFlags<_> = [b, a].into_iter().collect();
        assert_eq!(x, y);
    }

    #[test]
    fn grid_flags_by_kind() {
        let mut grid = Grid::new();
        let a = grid.add_vertex(0.0, 0.0, 0.0);
        let b = grid.add_vertex(1.0, 0.0, 0.0);
        let e = grid.add_edge(a, b).unwrap();

        let mut flags = GridFlags::new();
        flags.set(ElementKey::Edge(e), true);
        flags.set(ElementKey::Vertex(b), true);

        assert_eq!(flags.count(ElementKind::Edge), 1);
        assert!(flags.get(ElementKey::Vertex(b)));
        assert_eq!(
            flags.iter().collect::<Vec<_>>(),
            vec![ElementKey::Vertex(b), ElementKey::Edge(e)]
        );
    }
}
