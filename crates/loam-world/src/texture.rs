//! RGBA8 pixel buffers for heightfield and color previews.

use crate::field::{ColorField, HeightField};

/// Grayscale ramp from black (0) to white (1), RGBA8, row-major.
pub fn height_texture(heights: &HeightField) -> Vec<u8> {
    let mut out = Vec::with_capacity(heights.values().len() * 4);
    for &v in heights.values() {
        let c = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        out.extend_from_slice(&[c, c, c, 255]);
    }
    out
}

/// Flatten a color field to RGBA8 bytes, row-major.
pub fn color_texture(colors: &ColorField) -> Vec<u8> {
    colors.colors().iter().flatten().copied().collect()
}
