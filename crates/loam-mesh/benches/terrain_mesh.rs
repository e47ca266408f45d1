use criterion::{Criterion, black_box, criterion_group, criterion_main};

use loam_geom::Vec2;
use loam_mesh::{HeightCurve, build_terrain_mesh};
use loam_world::{MapSettings, generate_map_data};

fn bench_terrain_mesh(c: &mut Criterion) {
    let mut group = c.benchmark_group("terrain_mesh");
    let data = generate_map_data(&MapSettings::default(), Vec2::ZERO, None);
    let curve = HeightCurve::default();
    for lod in [0u32, 1, 2, 4, 6] {
        group.bench_function(format!("241_lod{lod}"), |b| {
            b.iter(|| black_box(build_terrain_mesh(&data.heights, 30.0, &curve, lod)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_terrain_mesh);
criterion_main!(benches);
