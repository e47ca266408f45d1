//! Heightfield synthesis: fractal noise, island falloff, region coloring.
#![forbid(unsafe_code)]

pub mod error;
pub mod falloff;
pub mod field;
pub mod mapgen;
pub mod noise;
pub mod regions;
pub mod texture;
pub mod worldgen;

pub use error::ParamError;
pub use falloff::FalloffMask;
pub use field::{ColorField, HeightField, Rgba};
pub use mapgen::{MapData, MapSettings, generate_map_data};
pub use noise::{NoiseSettings, NormalizeMode, generate_noise_map};
pub use regions::{MAX_REGIONS, Region, RegionTable};

use loam_geom::Vec2;

/// Integer grid key of one terrain chunk. World position is `coord * edge`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Chunk containing `pos`, rounding half to even like the grid snapping on the observer side.
    #[inline]
    pub fn containing(pos: Vec2, edge: f32) -> Self {
        Self {
            x: (pos.x / edge).round_ties_even() as i32,
            y: (pos.y / edge).round_ties_even() as i32,
        }
    }

    /// Centre of this chunk on the ground plane.
    #[inline]
    pub fn world_position(self, edge: f32) -> Vec2 {
        Vec2::new(self.x as f32 * edge, self.y as f32 * edge)
    }
}

impl From<(i32, i32)> for TileCoord {
    fn from(value: (i32, i32)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
