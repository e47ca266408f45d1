use std::error::Error;
use std::path::Path;

use loam_mesh::MeshSettings;
use loam_stream::StreamSettings;
use loam_world::worldgen::WorldGenConfig;
use loam_world::{MapSettings, ParamError};
use serde::Deserialize;

/// Everything a terrain session reads from disk. `[map]` and `[[regions]]`
/// sit at the top level next to `[mesh]` and `[stream]`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TerrainConfig {
    #[serde(flatten)]
    pub worldgen: WorldGenConfig,
    #[serde(default)]
    pub mesh: MeshSettings,
    #[serde(default)]
    pub stream: StreamSettings,
}

impl TerrainConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        let mut cfg: TerrainConfig = toml::from_str(s)?;
        cfg.worldgen = cfg.worldgen.sanitized();
        Ok(cfg)
    }

    pub fn map_settings(&self) -> Result<MapSettings, ParamError> {
        self.worldgen.to_settings()
    }
}

pub fn load_config_from_path(path: &Path) -> Result<TerrainConfig, Box<dyn Error>> {
    let s = std::fs::read_to_string(path)?;
    let cfg = TerrainConfig::from_toml_str(&s)?;
    log::info!("loaded terrain config from {}", path.display());
    Ok(cfg)
}
