//! Seeded multi-octave value noise.

use fastnoise_lite::{FastNoiseLite, NoiseType};
use loam_geom::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

use crate::error::ParamError;
use crate::field::HeightField;

/// Replacement for a non-positive scale.
pub const MIN_SCALE: f32 = 0.0001;
/// Per-octave offsets are drawn from `[-OCTAVE_OFFSET_RANGE, OCTAVE_OFFSET_RANGE)`.
pub const OCTAVE_OFFSET_RANGE: i32 = 100_000;
/// Sample coordinates at or beyond half this period are folded back into
/// `[-LATTICE_PERIOD / 2, LATTICE_PERIOD / 2)` so the lattice index fits an `i32`.
pub const LATTICE_PERIOD: f64 = 2_147_483_648.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizeMode {
    /// Stretch each map's own [min, max] to [0, 1]. Neighbouring maps do not line up.
    Local,
    /// Scale by the largest possible octave sum so every map shares one range.
    #[default]
    Global,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NoiseSettings {
    pub seed: i32,
    pub scale: f32,
    pub octaves: u32,
    pub persistence: f32,
    pub lacunarity: f32,
    pub offset: Vec2,
    pub normalize_mode: NormalizeMode,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            scale: 50.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            offset: Vec2::ZERO,
            normalize_mode: NormalizeMode::Global,
        }
    }
}

impl NoiseSettings {
    pub fn validate(&self) -> Result<(), ParamError> {
        if !self.scale.is_finite() {
            return Err(ParamError::NonFiniteScale(self.scale));
        }
        if self.octaves == 0 {
            return Err(ParamError::NoOctaves);
        }
        if !self.persistence.is_finite() {
            return Err(ParamError::NonFiniteParameter {
                name: "persistence",
            });
        }
        if !self.lacunarity.is_finite() {
            return Err(ParamError::NonFiniteParameter { name: "lacunarity" });
        }
        if !self.offset.x.is_finite() || !self.offset.y.is_finite() {
            return Err(ParamError::NonFiniteParameter { name: "offset" });
        }
        let top = self.top_frequency();
        if !top.is_finite() || top > f64::from(f32::MAX) {
            return Err(ParamError::FrequencyOverflow {
                octaves: self.octaves,
                lacunarity: self.lacunarity,
            });
        }
        Ok(())
    }

    /// Scale actually used for sampling.
    #[inline]
    pub fn effective_scale(&self) -> f32 {
        if self.scale <= 0.0 { MIN_SCALE } else { self.scale }
    }

    /// Copy of these settings with `centre` added to the offset.
    pub fn shifted(&self, centre: Vec2) -> Self {
        Self {
            offset: self.offset + centre,
            ..self.clone()
        }
    }

    /// Sum of octave amplitudes: the largest magnitude an octave sum can reach.
    pub fn max_possible_height(&self) -> f32 {
        let mut amplitude = 1.0f32;
        let mut total = 0.0f32;
        for _ in 0..self.octaves {
            total += amplitude;
            amplitude *= self.persistence;
        }
        total
    }

    /// Frequency of the last octave, `lacunarity^(octaves - 1)`.
    pub fn top_frequency(&self) -> f64 {
        let exp = f64::from(self.octaves.saturating_sub(1));
        f64::from(self.lacunarity).abs().powf(exp)
    }

    fn octave_offsets(&self) -> Vec<[f64; 2]> {
        let mut rng = ChaCha8Rng::seed_from_u64(u64::from(self.seed as u32));
        (0..self.octaves)
            .map(|_| {
                let ox: i32 = rng.random_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE);
                let oy: i32 = rng.random_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE);
                [
                    f64::from(ox) + f64::from(self.offset.x),
                    f64::from(oy) - f64::from(self.offset.y),
                ]
            })
            .collect()
    }
}

fn value_noise(seed: i32) -> FastNoiseLite {
    let mut noise = FastNoiseLite::with_seed(seed);
    noise.set_noise_type(Some(NoiseType::Value));
    noise.set_frequency(Some(1.0));
    noise
}

/// Value noise remapped to [0, 1].
#[inline]
fn unit_noise(noise: &FastNoiseLite, x: f32, y: f32) -> f32 {
    ((noise.get_noise_2d(x, y) + 1.0) * 0.5).clamp(0.0, 1.0)
}

/// Bring a sample coordinate into the range the noise lattice can index.
/// Coordinates already inside it pass through unchanged.
#[inline]
fn fold_lattice(v: f64) -> f32 {
    let half = LATTICE_PERIOD / 2.0;
    if v.abs() < half {
        return v as f32;
    }
    let r = v.rem_euclid(LATTICE_PERIOD);
    (if r >= half { r - LATTICE_PERIOD } else { r }) as f32
}

#[inline]
fn inverse_lerp(a: f32, b: f32, v: f32) -> f32 {
    if a == b {
        0.0
    } else {
        ((v - a) / (b - a)).clamp(0.0, 1.0)
    }
}

/// Sample a `width` x `height` fractal noise map.
///
/// Deterministic for identical inputs. Callers are expected to have run
/// [`NoiseSettings::validate`]; a non-positive scale is replaced by
/// [`MIN_SCALE`] rather than rejected.
pub fn generate_noise_map(width: usize, height: usize, settings: &NoiseSettings) -> HeightField {
    let octave_offsets = settings.octave_offsets();
    let max_possible_height = settings.max_possible_height();
    let scale = f64::from(settings.effective_scale());
    let lacunarity = f64::from(settings.lacunarity);
    let noise = value_noise(settings.seed);

    let half_width = width as f64 / 2.0;
    let half_height = height as f64 / 2.0;

    let mut values = vec![0.0f32; width * height];
    let mut min_local = f32::MAX;
    let mut max_local = f32::MIN;

    for y in 0..height {
        for x in 0..width {
            let mut amplitude = 1.0f32;
            let mut frequency = 1.0f64;
            let mut noise_height = 0.0f32;
            for off in &octave_offsets {
                // f64 keeps tiny scales and high octaves finite before folding.
                let sample_x = fold_lattice(((x as f64 - half_width) + off[0]) / scale * frequency);
                let sample_y = fold_lattice(((y as f64 - half_height) + off[1]) / scale * frequency);
                let v = unit_noise(&noise, sample_x, sample_y) * 2.0 - 1.0;
                noise_height += v * amplitude;
                amplitude *= settings.persistence;
                frequency *= lacunarity;
            }
            min_local = min_local.min(noise_height);
            max_local = max_local.max(noise_height);
            values[y * width + x] = noise_height;
        }
    }

    let mut field = HeightField::from_raw(width, height, values);
    match settings.normalize_mode {
        NormalizeMode::Local => {
            for v in field.values_mut() {
                *v = inverse_lerp(min_local, max_local, *v);
            }
        }
        NormalizeMode::Global => {
            // Floor only; values may exceed 1 when octaves line up.
            for v in field.values_mut() {
                *v = ((*v + 1.0) / max_possible_height).max(0.0);
            }
        }
    }
    field
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverse_lerp_degenerate_range_is_zero() {
        assert_eq!(inverse_lerp(2.0, 2.0, 2.0), 0.0);
        assert_eq!(inverse_lerp(0.0, 4.0, 1.0), 0.25);
        assert_eq!(inverse_lerp(0.0, 4.0, 9.0), 1.0);
    }

    #[test]
    fn max_possible_height_sums_amplitudes() {
        let s = NoiseSettings {
            octaves: 4,
            persistence: 0.5,
            ..NoiseSettings::default()
        };
        assert!((s.max_possible_height() - 1.875).abs() < 1e-6);
    }

    #[test]
    fn octave_offsets_follow_axis_signs() {
        let base = NoiseSettings::default();
        let moved = base.shifted(Vec2::new(10.0, 10.0));
        let a = base.octave_offsets();
        let b = moved.octave_offsets();
        assert_eq!(a.len(), b.len());
        for (a, b) in a.iter().zip(&b) {
            assert_eq!(b[0] - a[0], 10.0);
            assert_eq!(b[1] - a[1], -10.0);
        }
    }

    #[test]
    fn fold_lattice_keeps_ordinary_coordinates() {
        for v in [0.0, -0.5, 1234.25, -98_765.5, 1_073_741_000.0] {
            assert_eq!(fold_lattice(v), v as f32);
        }
    }

    #[test]
    fn fold_lattice_bounds_huge_coordinates() {
        let half = (LATTICE_PERIOD / 2.0) as f32;
        for v in [1.0e9 * 8.0, -1.0e9 * 8.0, 3.0e30, -3.0e30, LATTICE_PERIOD, -LATTICE_PERIOD] {
            let folded = fold_lattice(v);
            assert!((-half..=half).contains(&folded), "{v} folded to {folded}");
        }
        // one full period away lands on the same coordinate
        assert_eq!(fold_lattice(LATTICE_PERIOD + 12.5), 12.5);
    }

    #[test]
    fn top_frequency_rejects_overflow() {
        let s = NoiseSettings {
            octaves: 40,
            ..NoiseSettings::default()
        };
        assert!((s.top_frequency() - 2f64.powi(39)).abs() < 1.0);
        assert!(s.validate().is_ok());

        let s = NoiseSettings {
            octaves: 200,
            ..NoiseSettings::default()
        };
        assert_eq!(
            s.validate(),
            Err(ParamError::FrequencyOverflow {
                octaves: 200,
                lacunarity: 2.0
            })
        );
    }

    #[test]
    fn effective_scale_clamps_non_positive() {
        let s = NoiseSettings {
            scale: -3.0,
            ..NoiseSettings::default()
        };
        assert_eq!(s.effective_scale(), MIN_SCALE);
        assert!(s.validate().is_ok());
    }
}
