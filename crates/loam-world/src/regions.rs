//! Height → region classification (ascending-break policy).

use crate::error::ParamError;
use crate::field::Rgba;

#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    pub label: String,
    /// Inclusive upper bound of heights this region claims.
    pub height: f32,
    pub color: Rgba,
}

impl Region {
    pub fn new(label: impl Into<String>, height: f32, color: Rgba) -> Self {
        Self {
            label: label.into(),
            height,
            color,
        }
    }
}

/// Largest table a [`crate::ColorField`] can index.
pub const MAX_REGIONS: usize = u16::MAX as usize + 1;

/// Non-empty region list sorted by threshold.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionTable {
    regions: Vec<Region>,
}

impl RegionTable {
    pub fn new(regions: Vec<Region>) -> Result<Self, ParamError> {
        if regions.is_empty() {
            return Err(ParamError::EmptyRegionTable);
        }
        if regions.len() > MAX_REGIONS {
            return Err(ParamError::TooManyRegions(regions.len()));
        }
        for (index, r) in regions.iter().enumerate() {
            if !r.height.is_finite() {
                return Err(ParamError::NonFiniteThreshold { index });
            }
            if index > 0 && r.height < regions[index - 1].height {
                return Err(ParamError::UnorderedRegions { index });
            }
        }
        Ok(Self { regions })
    }

    #[inline]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Index of the first region whose threshold is at or above `height`.
    /// Heights above every threshold land in the last region.
    pub fn classify_index(&self, height: f32) -> usize {
        self.regions
            .iter()
            .position(|r| height <= r.height)
            .unwrap_or(self.regions.len() - 1)
    }

    #[inline]
    pub fn classify(&self, height: f32) -> &Region {
        &self.regions[self.classify_index(height)]
    }
}

impl Default for RegionTable {
    fn default() -> Self {
        Self {
            regions: vec![
                Region::new("water-deep", 0.30, [50, 99, 195, 255]),
                Region::new("water-shallow", 0.40, [54, 103, 199, 255]),
                Region::new("sand", 0.45, [210, 208, 125, 255]),
                Region::new("grass", 0.55, [86, 152, 23, 255]),
                Region::new("grass-2", 0.60, [62, 107, 18, 255]),
                Region::new("rock", 0.70, [90, 69, 60, 255]),
                Region::new("rock-2", 0.90, [75, 60, 53, 255]),
                Region::new("snow", 1.00, [255, 255, 255, 255]),
            ],
        }
    }
}
