//! One-shot map data for a single chunk: heights plus region colors.

use loam_geom::Vec2;

use crate::error::ParamError;
use crate::falloff::FalloffMask;
use crate::field::{ColorField, HeightField};
use crate::noise::{NoiseSettings, generate_noise_map};
use crate::regions::RegionTable;

#[derive(Clone, Debug, PartialEq)]
pub struct MapSettings {
    /// Vertices per chunk edge (`S`). Chunks tile at `S - 1` world units.
    pub chunk_size: usize,
    pub noise: NoiseSettings,
    pub use_falloff: bool,
    pub regions: RegionTable,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            chunk_size: 241,
            noise: NoiseSettings::default(),
            use_falloff: false,
            regions: RegionTable::default(),
        }
    }
}

impl MapSettings {
    pub fn validate(&self) -> Result<(), ParamError> {
        if self.chunk_size < 2 {
            return Err(ParamError::InvalidSize(self.chunk_size));
        }
        self.noise.validate()
    }

    /// World-space edge length of one chunk.
    #[inline]
    pub fn chunk_edge(&self) -> usize {
        self.chunk_size - 1
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MapData {
    pub heights: HeightField,
    pub colors: ColorField,
}

/// Generate heights and colors for the chunk centred at `centre`.
///
/// `falloff` is only consulted when `settings.use_falloff` is set; pass a
/// cached mask to avoid rebuilding it per chunk.
pub fn generate_map_data(
    settings: &MapSettings,
    centre: Vec2,
    falloff: Option<&FalloffMask>,
) -> MapData {
    let size = settings.chunk_size;
    let mut heights = generate_noise_map(size, size, &settings.noise.shifted(centre));

    if settings.use_falloff {
        let owned;
        let mask = match falloff {
            Some(m) if m.size() == size => m,
            _ => {
                owned = FalloffMask::generate(size);
                &owned
            }
        };
        for (v, f) in heights.values_mut().iter_mut().zip(mask.values()) {
            *v = (*v - f).clamp(0.0, 1.0);
        }
    }

    let colors = classify_field(&heights, &settings.regions);
    MapData { heights, colors }
}

fn classify_field(heights: &HeightField, regions: &RegionTable) -> ColorField {
    let n = heights.values().len();
    let mut colors = Vec::with_capacity(n);
    let mut indices = Vec::with_capacity(n);
    for &h in heights.values() {
        let idx = regions.classify_index(h);
        colors.push(regions.regions()[idx].color);
        // RegionTable caps its length at MAX_REGIONS, so this never truncates.
        indices.push(idx as u16);
    }
    ColorField::new(heights.width(), heights.height(), colors, indices)
}
