// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Global draw toggles and front/back draw modes.

use meshview_grid::ElementKind;
use serde::{Deserialize, Serialize};

/// Which element kinds are drawn at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawToggles {
    pub vertices: bool,
    pub edges: bool,
    pub faces: bool,
    pub volumes: bool,
}

impl DrawToggles {
    pub const ALL: Self = Self {
        vertices: true,
        edges: true,
        faces: true,
        volumes: true,
    };

    pub fn new(vertices: bool, edges: bool, faces: bool, volumes: bool) -> Self {
        Self {
            vertices,
            edges,
            faces,
            volumes,
        }
    }

    pub fn get(&self, kind: ElementKind) -> bool {
        match kind {
            ElementKind::Vertex => self.vertices,
            ElementKind::Edge => self.edges,
            ElementKind::Face => self.faces,
            ElementKind::Volume => self.volumes,
        }
    }
}

impl Default for DrawToggles {
    fn default() -> Self {
        Self::ALL
    }
}

/// How one side (front or back) of faces is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DrawMode {
    pub solid: bool,
    pub wire: bool,
}

impl DrawMode {
    pub const NONE: Self = Self {
        solid: false,
        wire: false,
    };
    pub const SOLID: Self = Self {
        solid: true,
        wire: false,
    };
    pub const WIRE: Self = Self {
        solid: false,
        wire: true,
    };
    pub const SOLID_WIRE: Self = Self {
        solid: true,
        wire: true,
    };
}

impl Default for DrawMode {
    fn default() -> Self {
        Self::SOLID_WIRE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles_by_kind() {
        let t = DrawToggles::new(false, true, false, true);
        assert!(!t.get(ElementKind::Vertex));
        assert!(t.get(ElementKind::Edge));
        assert!(t.get(ElementKind::Volume));
        assert_eq!(DrawToggles::default(), DrawToggles::ALL);
    }

    #[test]
    fn partial_toggles_from_json() {
        let t: DrawToggles = serde_json::from_str(r#"{"volumes": false}"#).unwrap();
        assert_eq!(t, DrawToggles::new(true, true, true, false));
    }
}
