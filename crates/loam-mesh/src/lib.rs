//! CPU terrain meshing: heightfield → centered, UV-mapped triangle grid (engine-only).
#![forbid(unsafe_code)]

mod curve;
mod mesh_build;

pub use curve::HeightCurve;
pub use mesh_build::{MeshData, build_terrain_mesh, lod_step, vertices_per_line};

use serde::Deserialize;
use thiserror::Error;

/// Vertical shaping applied when a heightfield becomes a mesh.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct MeshSettings {
    #[serde(default = "default_height_multiplier")]
    pub height_multiplier: f32,
    #[serde(default)]
    pub height_curve: HeightCurve,
}
fn default_height_multiplier() -> f32 {
    30.0
}
impl Default for MeshSettings {
    fn default() -> Self {
        Self {
            height_multiplier: default_height_multiplier(),
            height_curve: HeightCurve::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshError {
    #[error("lod {lod} uses step {step}, which does not divide the chunk edge {edge}")]
    LodStepMismatch { lod: u32, step: usize, edge: usize },
    #[error("heightfield is {width}x{height}; terrain meshes need a square field")]
    NonSquareField { width: usize, height: usize },
    #[error("height curve needs at least one key")]
    EmptyCurve,
    #[error("height curve key {index} is out of order or not finite")]
    UnorderedCurve { index: usize },
}
