// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for grid operations.

use crate::keys::{EdgeKey, FaceKey, VertexKey, VolumeKey};

/// Result type alias for grid operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during grid operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Vertex key not found in the grid.
    #[error("vertex not found: {0:?}")]
    VertexNotFound(VertexKey),

    /// Edge key not found in the grid.
    #[error("edge not found: {0:?}")]
    EdgeNotFound(EdgeKey),

    /// Face key not found in the grid.
    #[error("face not found: {0:?}")]
    FaceNotFound(FaceKey),

    /// Volume key not found in the grid.
    #[error("volume not found: {0:?}")]
    VolumeNotFound(VolumeKey),

    /// Both endpoints of an edge are the same vertex.
    #[error("edge endpoints coincide: {0:?}")]
    DegenerateEdge(VertexKey),

    /// A face lists the same vertex twice.
    #[error("face repeats vertex {0:?}")]
    DegenerateFace(VertexKey),

    /// A volume lists the same corner twice.
    #[error("volume repeats corner {0:?}")]
    DegenerateVolume(VertexKey),

    /// Only triangles and quadrilaterals are supported.
    #[error("unsupported face with {0} vertices (expected 3 or 4)")]
    UnsupportedFace(usize),

    /// Only tetrahedra, pyramids, prisms and hexahedra are supported.
    #[error("unsupported volume with {0} vertices (expected 4, 5, 6 or 8)")]
    UnsupportedVolume(usize),

    /// A subset index beyond the registered subsets.
    #[error("subset index {index} out of range ({count} subsets)")]
    SubsetOutOfRange { index: usize, count: usize },
}
