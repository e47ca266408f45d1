use std::error::Error;
use std::path::Path;
use std::time::Instant;

use clap::ValueEnum;
use loam_geom::Vec2;
use loam_mesh::{MeshSettings, build_terrain_mesh};
use loam_world::texture::{color_texture, height_texture};
use loam_world::{FalloffMask, MapData, MapSettings, generate_map_data};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PreviewMode {
    /// Raw normalized heights.
    Noise,
    /// Region colors.
    Color,
    /// Heights, colors and a mesh at the requested LOD.
    Mesh,
}

/// Generate one chunk on the calling thread and report what came out.
pub fn run_preview(
    map: &MapSettings,
    shaping: &MeshSettings,
    mode: PreviewMode,
    centre: Vec2,
    lod: u32,
    out: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    map.validate()?;
    let t0 = Instant::now();
    let mask = map
        .use_falloff
        .then(|| FalloffMask::generate(map.chunk_size));
    let data = generate_map_data(map, centre, mask.as_ref());
    log::info!(
        "generated {0}x{0} chunk at ({1}, {2}) in {3}ms",
        map.chunk_size,
        centre.x,
        centre.y,
        t0.elapsed().as_millis()
    );

    let (min, max) = data.heights.min_max();
    println!(
        "heights: min {:.4}  max {:.4}  mean {:.4}",
        min,
        max,
        data.heights.mean()
    );

    if mode != PreviewMode::Noise {
        for (label, share) in region_coverage(map, &data) {
            println!("  {:<16} {:>6.2}%", label, share * 100.0);
        }
    }

    if mode == PreviewMode::Mesh {
        let t0 = Instant::now();
        let mesh = build_terrain_mesh(
            &data.heights,
            shaping.height_multiplier,
            &shaping.height_curve,
            lod,
        )?;
        println!(
            "mesh lod {}: {} vertices, {} triangles ({}ms)",
            lod,
            mesh.vertex_count(),
            mesh.triangle_count(),
            t0.elapsed().as_millis()
        );
    }

    if let Some(path) = out {
        let bytes = match mode {
            PreviewMode::Noise => height_texture(&data.heights),
            PreviewMode::Color | PreviewMode::Mesh => color_texture(&data.colors),
        };
        std::fs::write(path, &bytes)?;
        println!(
            "wrote {} bytes of {}x{} RGBA8 to {}",
            bytes.len(),
            data.heights.width(),
            data.heights.height(),
            path.display()
        );
    }
    Ok(())
}

/// Share of cells falling in each region, in table order.
fn region_coverage<'a>(map: &'a MapSettings, data: &MapData) -> Vec<(&'a str, f32)> {
    let mut counts = vec![0usize; map.regions.len()];
    for &i in data.colors.region_indices() {
        counts[i as usize] += 1;
    }
    let total = data.colors.region_indices().len().max(1) as f32;
    map.regions
        .regions()
        .iter()
        .zip(counts)
        .map(|(r, n)| (r.label.as_str(), n as f32 / total))
        .collect()
}
