use crate::error::ParamError;

pub type Rgba = [u8; 4];

/// Row-major grid of normalized heights; `values[y * width + x]`.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightField {
    width: usize,
    height: usize,
    values: Vec<f32>,
}

impl HeightField {
    /// Wrap a row-major buffer; its length must be `width * height`.
    pub fn from_values(width: usize, height: usize, values: Vec<f32>) -> Result<Self, ParamError> {
        let expected = width.checked_mul(height);
        if expected != Some(values.len()) {
            return Err(ParamError::FieldSizeMismatch {
                width,
                height,
                len: values.len(),
            });
        }
        Ok(Self::from_raw(width, height, values))
    }

    pub(crate) fn from_raw(width: usize, height: usize, values: Vec<f32>) -> Self {
        debug_assert_eq!(values.len(), width * height);
        Self {
            width,
            height,
            values,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.values[self.idx(x, y)]
    }

    #[inline]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn min_max(&self) -> (f32, f32) {
        self.values
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }

    pub fn mean(&self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f32>() / self.values.len() as f32
    }

    pub(crate) fn values_mut(&mut self) -> &mut [f32] {
        &mut self.values
    }
}

/// Per-cell classification colors, same layout as the heightfield they came from.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorField {
    width: usize,
    height: usize,
    colors: Vec<Rgba>,
    regions: Vec<u16>,
}

impl ColorField {
    pub(crate) fn new(width: usize, height: usize, colors: Vec<Rgba>, regions: Vec<u16>) -> Self {
        debug_assert_eq!(colors.len(), width * height);
        debug_assert_eq!(regions.len(), width * height);
        Self {
            width,
            height,
            colors,
            regions,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Rgba {
        self.colors[y * self.width + x]
    }

    /// Index into the region table that produced the color at (x, y).
    #[inline]
    pub fn region_at(&self, x: usize, y: usize) -> usize {
        usize::from(self.regions[y * self.width + x])
    }

    #[inline]
    pub fn colors(&self) -> &[Rgba] {
        &self.colors
    }

    #[inline]
    pub fn region_indices(&self) -> &[u16] {
        &self.regions
    }
}
