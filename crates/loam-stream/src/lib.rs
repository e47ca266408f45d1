//! Chunk streaming around a moving observer: tile lifecycle, visibility, LOD.
#![forbid(unsafe_code)]

mod renderer;
mod settings;
mod streamer;
mod tile;

pub use renderer::TileRenderer;
pub use settings::{LodInfo, StreamSettings};
pub use streamer::{ChunkStreamer, TickReport};
pub use tile::{TerrainTile, TileState};

use loam_runtime::RequestError;
use loam_world::ParamError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StreamError {
    #[error("at least one detail level is required")]
    NoDetailLevels,
    #[error("detail level {index} must have a larger range and an equal or coarser lod than the one before")]
    UnorderedDetailLevels { index: usize },
    #[error("detail level {index} has a non-positive or non-finite range")]
    InvalidRange { index: usize },
    #[error("move threshold must be finite and non-negative")]
    InvalidMoveThreshold,
    #[error(transparent)]
    Param(#[from] ParamError),
    #[error(transparent)]
    Request(#[from] RequestError),
}
