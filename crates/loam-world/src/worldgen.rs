use serde::Deserialize;

use loam_geom::Vec2;

use crate::error::ParamError;
use crate::mapgen::MapSettings;
use crate::noise::{NoiseSettings, NormalizeMode};
use crate::regions::{Region, RegionTable};

#[derive(Clone, Debug, Deserialize)]
pub struct WorldGenConfig {
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default = "default_regions")]
    pub regions: Vec<RegionConfig>,
}

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self {
            map: MapConfig::default(),
            regions: default_regions(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default)]
    pub seed: i32,
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default = "default_octaves")]
    pub octaves: i32,
    #[serde(default = "default_persistence")]
    pub persistence: f32,
    #[serde(default = "default_lacunarity")]
    pub lacunarity: f32,
    #[serde(default)]
    pub offset: [f32; 2],
    #[serde(default)]
    pub normalize_mode: NormalizeMode,
    #[serde(default)]
    pub use_falloff: bool,
}
fn default_chunk_size() -> usize {
    241
}
fn default_scale() -> f32 {
    50.0
}
fn default_octaves() -> i32 {
    4
}
fn default_persistence() -> f32 {
    0.5
}
fn default_lacunarity() -> f32 {
    2.0
}
impl Default for MapConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            seed: 0,
            scale: default_scale(),
            octaves: default_octaves(),
            persistence: default_persistence(),
            lacunarity: default_lacunarity(),
            offset: [0.0, 0.0],
            normalize_mode: NormalizeMode::default(),
            use_falloff: false,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct RegionConfig {
    pub label: String,
    pub height: f32,
    pub color: [u8; 3],
}

fn default_regions() -> Vec<RegionConfig> {
    RegionTable::default()
        .regions()
        .iter()
        .map(|r| RegionConfig {
            label: r.label.clone(),
            height: r.height,
            color: [r.color[0], r.color[1], r.color[2]],
        })
        .collect()
}

impl WorldGenConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Apply the editor-side clamps: lacunarity below 1 and octaves below 1 are raised to 1.
    pub fn sanitized(mut self) -> Self {
        if self.map.lacunarity < 1.0 {
            log::warn!("lacunarity {} below 1; using 1", self.map.lacunarity);
            self.map.lacunarity = 1.0;
        }
        if self.map.octaves < 1 {
            log::warn!("octaves {} below 1; using 1", self.map.octaves);
            self.map.octaves = 1;
        }
        self
    }

    pub fn to_settings(&self) -> Result<MapSettings, ParamError> {
        let regions = RegionTable::new(
            self.regions
                .iter()
                .map(|r| {
                    let c = r.color;
                    Region::new(r.label.clone(), r.height, [c[0], c[1], c[2], 255])
                })
                .collect(),
        )?;
        let octaves = u32::try_from(self.map.octaves).map_err(|_| ParamError::NoOctaves)?;
        let settings = MapSettings {
            chunk_size: self.map.chunk_size,
            noise: NoiseSettings {
                seed: self.map.seed,
                scale: self.map.scale,
                octaves,
                persistence: self.map.persistence,
                lacunarity: self.map.lacunarity,
                offset: Vec2::new(self.map.offset[0], self.map.offset[1]),
                normalize_mode: self.map.normalize_mode,
            },
            use_falloff: self.map.use_falloff,
            regions,
        };
        settings.validate()?;
        Ok(settings)
    }
}
