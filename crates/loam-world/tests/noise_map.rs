use loam_geom::Vec2;
use loam_world::{NoiseSettings, NormalizeMode, ParamError, generate_noise_map};

fn local_fixture() -> NoiseSettings {
    NoiseSettings {
        seed: 0,
        scale: 50.0,
        octaves: 4,
        persistence: 0.5,
        lacunarity: 2.0,
        offset: Vec2::ZERO,
        normalize_mode: NormalizeMode::Local,
    }
}

#[test]
fn identical_inputs_give_identical_maps() {
    let s = local_fixture();
    let a = generate_noise_map(241, 241, &s);
    let b = generate_noise_map(241, 241, &s);
    let bits_a: Vec<u32> = a.values().iter().map(|v| v.to_bits()).collect();
    let bits_b: Vec<u32> = b.values().iter().map(|v| v.to_bits()).collect();
    assert_eq!(bits_a, bits_b);
}

#[test]
fn reference_corners_are_reproducible_across_threads() {
    let s = local_fixture();
    let here = generate_noise_map(241, 241, &s);
    let there = std::thread::spawn(move || generate_noise_map(241, 241, &s))
        .join()
        .unwrap();
    assert_eq!(here.get(0, 0).to_bits(), there.get(0, 0).to_bits());
    assert_eq!(here.get(240, 240).to_bits(), there.get(240, 240).to_bits());
}

// Captured once; a change here means the noise backend or the offset RNG stream moved.
#[test]
fn reference_corners_match_baseline() {
    let map = generate_noise_map(241, 241, &local_fixture());
    assert_eq!(map.get(0, 0).to_bits(), 0x3ea2_61a8);
    assert_eq!(map.get(240, 240).to_bits(), 0x3f3e_c514);
}

#[test]
fn local_mode_spans_unit_range() {
    let map = generate_noise_map(121, 121, &local_fixture());
    let (lo, hi) = map.min_max();
    assert_eq!(lo, 0.0);
    assert_eq!(hi, 1.0);
    assert!(map.values().iter().all(|v| (0.0..=1.0).contains(v)));
}

#[test]
fn global_mode_is_never_negative() {
    let s = NoiseSettings {
        normalize_mode: NormalizeMode::Global,
        ..local_fixture()
    };
    let map = generate_noise_map(121, 121, &s);
    assert!(map.values().iter().all(|v| *v >= 0.0));
}

#[test]
fn different_seeds_differ() {
    let a = generate_noise_map(64, 64, &local_fixture());
    let b = generate_noise_map(
        64,
        64,
        &NoiseSettings {
            seed: 7,
            ..local_fixture()
        },
    );
    assert_ne!(a.values(), b.values());
}

#[test]
fn non_positive_scale_still_produces_finite_map() {
    let s = NoiseSettings {
        scale: 0.0,
        ..local_fixture()
    };
    assert!(s.validate().is_ok());
    let map = generate_noise_map(16, 16, &s);
    assert!(map.values().iter().all(|v| v.is_finite()));
}

#[test]
fn deep_octave_stacks_stay_finite() {
    for octaves in [16, 40, 64] {
        let s = NoiseSettings {
            octaves,
            ..local_fixture()
        };
        assert!(s.validate().is_ok());
        let map = generate_noise_map(16, 16, &s);
        assert!(map.values().iter().all(|v| (0.0..=1.0).contains(v)));
    }
}

#[test]
fn tiny_scale_with_global_normalization_does_not_overflow() {
    let s = NoiseSettings {
        scale: 1.0e-30,
        octaves: 8,
        normalize_mode: NormalizeMode::Global,
        ..local_fixture()
    };
    assert!(s.validate().is_ok());
    let map = generate_noise_map(16, 16, &s);
    assert!(map.values().iter().all(|v| v.is_finite() && *v >= 0.0));
}

#[test]
fn runaway_frequency_is_rejected() {
    let s = NoiseSettings {
        octaves: 300,
        lacunarity: 3.0,
        ..local_fixture()
    };
    assert_eq!(
        s.validate(),
        Err(ParamError::FrequencyOverflow {
            octaves: 300,
            lacunarity: 3.0
        })
    );
}

#[test]
fn validate_rejects_bad_parameters() {
    let nan_scale = NoiseSettings {
        scale: f32::NAN,
        ..local_fixture()
    };
    assert!(nan_scale.validate().is_err());
    let no_octaves = NoiseSettings {
        octaves: 0,
        ..local_fixture()
    };
    assert!(no_octaves.validate().is_err());
    let bad_offset = NoiseSettings {
        offset: Vec2::new(f32::INFINITY, 0.0),
        ..local_fixture()
    };
    assert!(bad_offset.validate().is_err());
}

// Adjacent chunks sampled with offsets one edge length apart share their seam exactly.
#[test]
fn global_mode_seams_line_up() {
    let size = 241usize;
    let edge = (size - 1) as f32;
    let base = NoiseSettings {
        normalize_mode: NormalizeMode::Global,
        ..local_fixture()
    };
    let origin = generate_noise_map(size, size, &base);
    let east = generate_noise_map(size, size, &base.shifted(Vec2::new(edge, 0.0)));
    let north = generate_noise_map(size, size, &base.shifted(Vec2::new(0.0, edge)));

    for i in 0..size {
        let a = origin.get(size - 1, i);
        let b = east.get(0, i);
        assert!((a - b).abs() <= 1e-5, "east seam row {i}: {a} vs {b}");

        // +y in world space is up the grid, so the north chunk's bottom row meets our top row.
        let c = origin.get(i, 0);
        let d = north.get(i, size - 1);
        assert!((c - d).abs() <= 1e-5, "north seam col {i}: {c} vs {d}");
    }
}

#[test]
fn tile_coord_snapping() {
    use loam_world::TileCoord;
    assert_eq!(TileCoord::containing(Vec2::new(0.0, 0.0), 240.0), TileCoord::new(0, 0));
    assert_eq!(TileCoord::containing(Vec2::new(130.0, -130.0), 240.0), TileCoord::new(1, -1));
    // exactly half an edge rounds to even
    assert_eq!(TileCoord::containing(Vec2::new(120.0, 360.0), 240.0), TileCoord::new(0, 2));
    assert_eq!(TileCoord::new(2, -3).world_position(240.0), Vec2::new(480.0, -720.0));
    assert_eq!(TileCoord::new(1, 1).offset(-2, 0), TileCoord::new(-1, 1));
}
