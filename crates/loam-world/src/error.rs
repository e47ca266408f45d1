use thiserror::Error;

/// Rejected generation input. Raised when a request is made, never from a worker.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("noise scale must be finite, got {0}")]
    NonFiniteScale(f32),
    #[error("at least one octave is required")]
    NoOctaves,
    #[error("{name} must be finite")]
    NonFiniteParameter { name: &'static str },
    #[error("{octaves} octaves at lacunarity {lacunarity} overflow the sampling frequency")]
    FrequencyOverflow { octaves: u32, lacunarity: f32 },
    #[error("chunk size must be at least 2, got {0}")]
    InvalidSize(usize),
    #[error("{len} values cannot fill a {width}x{height} field")]
    FieldSizeMismatch { width: usize, height: usize, len: usize },
    #[error("region table has {0} entries; at most {max} are supported", max = crate::regions::MAX_REGIONS)]
    TooManyRegions(usize),
    #[error("region table is empty")]
    EmptyRegionTable,
    #[error("region {index} has a threshold below the region before it")]
    UnorderedRegions { index: usize },
    #[error("region {index} has a non-finite threshold")]
    NonFiniteThreshold { index: usize },
}
