use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::time::Duration;

use loam_geom::Vec2;
use loam_world::{MapSettings, NoiseSettings, NormalizeMode, generate_map_data, generate_noise_map};

fn bench_noise_map(c: &mut Criterion) {
    let mut group = c.benchmark_group("noise_map");
    group.measurement_time(Duration::from_secs(5));
    for mode in [NormalizeMode::Local, NormalizeMode::Global] {
        let settings = NoiseSettings {
            normalize_mode: mode,
            ..NoiseSettings::default()
        };
        group.bench_function(format!("241x241_{mode:?}"), |b| {
            b.iter(|| black_box(generate_noise_map(241, 241, &settings)))
        });
    }
    group.finish();
}

fn bench_map_data_falloff(c: &mut Criterion) {
    let settings = MapSettings {
        use_falloff: true,
        ..MapSettings::default()
    };
    c.bench_function("map_data_241_falloff", |b| {
        b.iter(|| black_box(generate_map_data(&settings, Vec2::new(240.0, 0.0), None)))
    });
}

criterion_group!(benches, bench_noise_map, bench_map_data_falloff);
criterion_main!(benches);
