//! Radial edge attenuation used to shape island maps.

const FALLOFF_A: f32 = 3.0;
const FALLOFF_B: f32 = 2.2;

#[derive(Clone, Debug, PartialEq)]
pub struct FalloffMask {
    size: usize,
    values: Vec<f32>,
}

impl FalloffMask {
    /// Square mask: 0 near the centre, rising to 1 at the edges.
    pub fn generate(size: usize) -> Self {
        let mut values = vec![0.0f32; size * size];
        for j in 0..size {
            for i in 0..size {
                let x = i as f32 / size as f32 * 2.0 - 1.0;
                let y = j as f32 / size as f32 * 2.0 - 1.0;
                let v = x.abs().max(y.abs());
                values[j * size + i] = evaluate(v);
            }
        }
        Self { size, values }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.values[y * self.size + x]
    }

    #[inline]
    pub fn values(&self) -> &[f32] {
        &self.values
    }
}

#[inline]
fn evaluate(v: f32) -> f32 {
    let num = v.powf(FALLOFF_A);
    num / (num + (FALLOFF_B - FALLOFF_B * v).powf(FALLOFF_A))
}
