// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for scene operations.

use crate::scene::ObjectId;

/// Result type alias for scene operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Invalid-argument errors raised at the scene API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("clip plane index {0} out of range (3 planes)")]
    ClipPlaneIndex(usize),

    #[error("plane normal has zero length or is not finite")]
    DegenerateNormal,

    #[error("ray has zero length or is not finite")]
    DegenerateRay,

    #[error("invalid camera: {0}")]
    InvalidCamera(&'static str),

    #[error("object not found: {0:?}")]
    ObjectNotFound(ObjectId),

    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error(transparent)]
    Grid(#[from] meshview_grid::Error),

    #[error("options file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("options parse error: {0}")]
    Json(#[from] serde_json::Error),
}
