// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Meshview Grid
//!
//! Arena-based volumetric grid used by the meshview scene.
//!
//! Vertices, edges, faces (triangles and quadrilaterals) and volumes
//! (tetrahedra, pyramids, prisms, hexahedra) live in slot maps with
//! generational keys. Edges and faces are shared: two faces that reference the
//! same vertex pair reuse one edge, and two volumes that reference the same
//! vertex set reuse one face. Upward adjacency (vertex → edges, edge → faces,
//! face → volumes) is maintained on construction, so a face can report every
//! volume it bounds, which is what boundary-face extraction relies on.
//!
//! Subset classification and per-element attachments are kept outside the
//! arena ([`SubsetHandler`], [`ElementFlags`]) so that several classifications
//! can coexist for one grid.

pub mod arena;
pub mod attachment;
pub mod builders;
pub mod construction;
pub mod error;
pub mod geometry;
pub mod keys;
pub mod subset;
pub mod traversal;

pub use arena::{EdgeData, FaceData, Grid, VertexData, VolumeData, VolumeShape};
pub use attachment::{ElementFlags, GridFlags};
pub use error::{Error, Result};
pub use geometry::Sphere;
pub use keys::{EdgeKey, ElementKey, ElementKind, FaceKey, VertexKey, VolumeKey};
pub use subset::{SubsetHandler, SubsetInfo};
