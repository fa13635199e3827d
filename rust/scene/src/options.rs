// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene configuration.
//!
//! Options are passed to [`Scene::new`](crate::Scene::new) and consulted by
//! every rebuild and query; there is no process-wide state.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::modes::{DrawMode, DrawToggles};

/// Environment variable naming a JSON options file.
pub const OPTIONS_ENV: &str = "MESHVIEW_OPTIONS";

/// Accepted ray-parameter windows for picking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickOptions {
    /// Open interval for the projection parameter of a vertex onto the ray.
    pub vertex_window: [f64; 2],
    /// Open interval for the projection parameter of the ray target onto an
    /// edge when picking the edge closest to the target.
    pub edge_window: [f64; 2],
}

impl Default for PickOptions {
    fn default() -> Self {
        Self {
            vertex_window: [0.0, 1.2],
            edge_window: [-0.2, 1.2],
        }
    }
}

/// Constants of the near/far clip distance estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NearFarOptions {
    /// Smallest near distance ever returned.
    pub min_near: f64,
    /// Factor applied to the bounding-sphere radius.
    pub sphere_padding: f64,
    /// Fraction of the camera-to-plane distance used when a clip plane
    /// determines the near distance.
    pub clip_plane_factor: f64,
    /// The near distance never exceeds the view length divided by this.
    pub view_length_divisor: f64,
    /// Fraction of the radius used as the regular near floor.
    pub border_factor: f64,
}

impl Default for NearFarOptions {
    fn default() -> Self {
        Self {
            min_near: 1e-5,
            sphere_padding: 1.01,
            clip_plane_factor: 0.1,
            view_length_divisor: 100.0,
            border_factor: 0.001,
        }
    }
}

/// Colors of the selection and marks batches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorOptions {
    pub selection: [f32; 3],
    pub selection_face_alpha: f32,
    pub selection_volume_alpha: f32,
    pub marks: [f32; 4],
}

impl Default for ColorOptions {
    fn default() -> Self {
        Self {
            selection: [1.0, 0.7, 0.1],
            selection_face_alpha: 0.5,
            selection_volume_alpha: 0.3,
            marks: [0.1, 0.1, 0.9, 1.0],
        }
    }
}

impl ColorOptions {
    pub fn selection_rgba(&self, alpha: f32) -> [f32; 4] {
        let [r, g, b] = self.selection;
        [r, g, b, alpha]
    }
}

/// Complete scene configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneOptions {
    pub pick: PickOptions,
    pub near_far: NearFarOptions,
    pub colors: ColorOptions,
    pub initial_toggles: DrawToggles,
    pub initial_front_mode: DrawMode,
    pub initial_back_mode: DrawMode,
}

impl SceneOptions {
    /// Parses and validates options. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Loads options from the file named by `MESHVIEW_OPTIONS`, or the
    /// defaults when the variable is unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var(OPTIONS_ENV) {
            Ok(path) => {
                let json = std::fs::read_to_string(&path)?;
                let options = Self::from_json(&json)?;
                tracing::info!(path = %path, "loaded scene options");
                Ok(options)
            }
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_window("pick.vertex_window", self.pick.vertex_window)?;
        check_window("pick.edge_window", self.pick.edge_window)?;

        let nf = &self.near_far;
        for (name, value) in [
            ("near_far.min_near", nf.min_near),
            ("near_far.sphere_padding", nf.sphere_padding),
            ("near_far.clip_plane_factor", nf.clip_plane_factor),
            ("near_far.view_length_divisor", nf.view_length_divisor),
            ("near_far.border_factor", nf.border_factor),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidOptions(format!(
                    "{name} must be finite and positive, got {value}"
                )));
            }
        }

        let c = &self.colors;
        let alphas = [c.selection_face_alpha, c.selection_volume_alpha];
        let components = c.selection.iter().chain(c.marks.iter()).chain(alphas.iter());
        for &value in components {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidOptions(format!(
                    "color component {value} outside 0..=1"
                )));
            }
        }
        Ok(())
    }
}

fn check_window(name: &str, [lo, hi]: [f64; 2]) -> Result<()> {
    if !lo.is_finite() || !hi.is_finite() || lo >= hi {
        return Err(Error::InvalidOptions(format!(
            "{name} must be a finite, non-empty interval, got [{lo}, {hi}]"
        )));
    }
    Ok(())
}
