use loam_geom::{Vec2, Vec3};
use loam_world::HeightField;

use crate::{HeightCurve, MeshError};

/// Triangle grid ready for upload. Normals are left to the renderer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub triangles: Vec<u32>,
}

impl MeshData {
    fn with_grid(verts_per_line: usize) -> Self {
        let quads = (verts_per_line - 1) * (verts_per_line - 1);
        Self {
            vertices: Vec::with_capacity(verts_per_line * verts_per_line),
            uvs: Vec::with_capacity(verts_per_line * verts_per_line),
            triangles: Vec::with_capacity(quads * 6),
        }
    }

    #[inline]
    fn add_triangle(&mut self, a: usize, b: usize, c: usize) {
        self.triangles
            .extend_from_slice(&[a as u32, b as u32, c as u32]);
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }
}

/// Grid stride for a level of detail: 1 at lod 0, otherwise `lod * 2`.
#[inline]
pub fn lod_step(lod: u32) -> usize {
    if lod == 0 { 1 } else { lod as usize * 2 }
}

/// Vertices along one edge of a `size`-wide field meshed at `lod`.
pub fn vertices_per_line(size: usize, lod: u32) -> Result<usize, MeshError> {
    let edge = size.saturating_sub(1);
    let step = lod_step(lod);
    if edge == 0 || edge % step != 0 {
        return Err(MeshError::LodStepMismatch { lod, step, edge });
    }
    Ok(edge / step + 1)
}

/// Build the mesh for `heights` at `lod`, centred on the origin.
///
/// Row `y` maps to `z = (S-1)/2 - y`, so increasing rows run towards -z.
pub fn build_terrain_mesh(
    heights: &HeightField,
    height_multiplier: f32,
    curve: &HeightCurve,
    lod: u32,
) -> Result<MeshData, MeshError> {
    if !heights.is_square() {
        return Err(MeshError::NonSquareField {
            width: heights.width(),
            height: heights.height(),
        });
    }
    let width = heights.width();
    let height = heights.height();
    let step = lod_step(lod);
    let verts_per_line = vertices_per_line(width, lod)?;

    let top_left_x = (width - 1) as f32 / -2.0;
    let top_left_z = (height - 1) as f32 / 2.0;

    let mut mesh = MeshData::with_grid(verts_per_line);
    let mut vertex_index = 0usize;
    for y in (0..height).step_by(step) {
        for x in (0..width).step_by(step) {
            let h = curve.evaluate(heights.get(x, y)) * height_multiplier;
            mesh.vertices
                .push(Vec3::new(top_left_x + x as f32, h, top_left_z - y as f32));
            mesh.uvs
                .push(Vec2::new(x as f32 / width as f32, y as f32 / height as f32));

            if x < width - 1 && y < height - 1 {
                let i = vertex_index;
                let w = verts_per_line;
                mesh.add_triangle(i, i + w + 1, i + w);
                mesh.add_triangle(i + w + 1, i, i + 1);
            }
            vertex_index += 1;
        }
    }
    debug_assert_eq!(mesh.vertices.len(), verts_per_line * verts_per_line);
    log::trace!(
        target: "mesh",
        "built lod {} mesh: {} verts, {} tris",
        lod,
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    Ok(mesh)
}
