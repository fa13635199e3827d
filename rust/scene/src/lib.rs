// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Meshview Scene
//!
//! Visibility and rendering pipeline for interactive editing of volumetric
//! meshes built on [`meshview_grid`].
//!
//! Given a grid, its subset classification and a set of up to three clip
//! planes, the crate decides which elements are drawn, groups them into
//! render batches and answers picking queries (closest element under a ray,
//! elements inside or touching a screen rectangle).
//!
//! ## Pipeline
//!
//! 1. [`clip`]: classify points, spheres and whole elements against the
//!    enabled clip planes.
//! 2. [`visibility`]: derive the rendered set. With volumes on, only faces
//!    on the boundary of the visible volume region are drawn, inheriting the
//!    subset of the volume behind them.
//! 3. [`batch`]: turn the rendered set into an ordered list of draw batches,
//!    one per subset and kind, plus selection and marks overlays.
//! 4. [`picking`]: ray and rectangle queries over the same snapshot.
//!
//! The [`Scene`] ties these together and rebuilds snapshots whenever
//! geometry, visuals or the selection change.
//!
//! ## Example
//!
//! ```
//! use meshview_grid::builders;
//! use meshview_scene::{MeshObject, Scene};
//! use nalgebra::{Point3, Vector3};
//!
//! let mut scene = Scene::default();
//! let id = scene.add_object(MeshObject::with_single_subset("cube", builders::unit_cube()?));
//!
//! scene.set_clip_plane(0, Point3::new(0.5, 0.0, 0.0), Vector3::x())?;
//! scene.enable_clip_plane(0, true)?;
//!
//! let batches = scene.batches(id).expect("snapshot is built");
//! assert!(!batches.is_empty());
//! # Ok::<(), meshview_scene::Error>(())
//! ```

pub mod batch;
pub mod camera;
pub mod clip;
pub mod error;
pub mod modes;
pub mod object;
pub mod options;
pub mod picking;
pub mod predicates;
pub mod scene;
pub mod visibility;

pub use batch::{Batch, BatchKind, BatchSet, DrawCommand, Primitive, RenderMode};
pub use camera::{Camera, Projection, Projector, Viewport};
pub use clip::{ClipPlaneSet, MAX_CLIP_PLANES};
pub use error::{Error, Result};
pub use modes::{DrawMode, DrawToggles};
pub use object::MeshObject;
pub use options::{ColorOptions, NearFarOptions, PickOptions, SceneOptions, OPTIONS_ENV};
pub use picking::{GuiRect, Picker};
pub use predicates::{Plane, Ray, RelativePosition};
pub use scene::{NearFar, ObjectId, Scene};
pub use visibility::{rebuild_visibility, ActiveKinds, Visibility};
