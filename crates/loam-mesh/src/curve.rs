use serde::Deserialize;

use crate::MeshError;

/// Piecewise-linear response curve applied to normalized heights.
///
/// Immutable once built; clone it into each job rather than sharing a
/// mutable curve between workers.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(try_from = "Vec<[f32; 2]>")]
pub struct HeightCurve {
    keys: Vec<[f32; 2]>,
}

impl HeightCurve {
    pub fn new(keys: Vec<[f32; 2]>) -> Result<Self, MeshError> {
        if keys.is_empty() {
            return Err(MeshError::EmptyCurve);
        }
        for (index, k) in keys.iter().enumerate() {
            let ordered = index == 0 || k[0] >= keys[index - 1][0];
            if !k[0].is_finite() || !k[1].is_finite() || !ordered {
                return Err(MeshError::UnorderedCurve { index });
            }
        }
        Ok(Self { keys })
    }

    /// y = x over [0, 1].
    pub fn linear() -> Self {
        Self {
            keys: vec![[0.0, 0.0], [1.0, 1.0]],
        }
    }

    #[inline]
    pub fn keys(&self) -> &[[f32; 2]] {
        &self.keys
    }

    /// Evaluate at `t`, holding the end values outside the key range.
    pub fn evaluate(&self, t: f32) -> f32 {
        let first = self.keys[0];
        let last = self.keys[self.keys.len() - 1];
        if t <= first[0] {
            return first[1];
        }
        if t >= last[0] {
            return last[1];
        }
        let hi = self.keys.partition_point(|k| k[0] <= t);
        let (a, b) = (self.keys[hi - 1], self.keys[hi]);
        let span = b[0] - a[0];
        if span <= 0.0 {
            return b[1];
        }
        a[1] + (b[1] - a[1]) * ((t - a[0]) / span)
    }
}

impl Default for HeightCurve {
    // Flat lowlands, then a steepening rise to the peaks.
    fn default() -> Self {
        Self {
            keys: vec![[0.0, 0.0], [0.4, 0.0], [0.6, 0.15], [0.8, 0.45], [1.0, 1.0]],
        }
    }
}

impl TryFrom<Vec<[f32; 2]>> for HeightCurve {
    type Error = MeshError;

    fn try_from(keys: Vec<[f32; 2]>) -> Result<Self, Self::Error> {
        Self::new(keys)
    }
}
