use serde::Deserialize;

use crate::StreamError;

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct LodInfo {
    pub lod: u32,
    /// Largest nearest-edge distance at which this level is used.
    pub range: f32,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct StreamSettings {
    #[serde(default = "default_detail_levels")]
    pub detail_levels: Vec<LodInfo>,
    #[serde(default = "default_move_threshold")]
    pub move_threshold: f32,
}
fn default_detail_levels() -> Vec<LodInfo> {
    vec![
        LodInfo {
            lod: 0,
            range: 200.0,
        },
        LodInfo {
            lod: 1,
            range: 400.0,
        },
        LodInfo {
            lod: 4,
            range: 600.0,
        },
    ]
}
fn default_move_threshold() -> f32 {
    25.0
}
impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            detail_levels: default_detail_levels(),
            move_threshold: default_move_threshold(),
        }
    }
}

impl StreamSettings {
    pub fn validate(&self) -> Result<(), StreamError> {
        if self.detail_levels.is_empty() {
            return Err(StreamError::NoDetailLevels);
        }
        for (index, level) in self.detail_levels.iter().enumerate() {
            if !level.range.is_finite() || level.range <= 0.0 {
                return Err(StreamError::InvalidRange { index });
            }
            if index > 0 {
                let prev = self.detail_levels[index - 1];
                if level.range <= prev.range || level.lod < prev.lod {
                    return Err(StreamError::UnorderedDetailLevels { index });
                }
            }
        }
        if !self.move_threshold.is_finite() || self.move_threshold < 0.0 {
            return Err(StreamError::InvalidMoveThreshold);
        }
        Ok(())
    }

    /// The last level's range; tiles farther than this are hidden.
    #[inline]
    pub fn max_view_distance(&self) -> f32 {
        self.detail_levels
            .last()
            .map(|l| l.range)
            .unwrap_or(0.0)
    }

    #[inline]
    pub fn sqr_move_threshold(&self) -> f32 {
        self.move_threshold * self.move_threshold
    }

    /// Index of the first level whose range covers `distance`; the last level otherwise.
    pub fn lod_index_for(&self, distance: f32) -> usize {
        let mut index = 0;
        for i in 0..self.detail_levels.len().saturating_sub(1) {
            if distance > self.detail_levels[i].range {
                index = i + 1;
            } else {
                break;
            }
        }
        index
    }

    #[inline]
    pub fn lod_for(&self, distance: f32) -> u32 {
        self.detail_levels[self.lod_index_for(distance)].lod
    }
}
