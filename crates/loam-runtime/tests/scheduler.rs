use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use loam_geom::Vec2;
use loam_mesh::{MeshError, MeshSettings};
use loam_runtime::{Completion, GenerationScheduler, JobKind, RequestError};
use loam_world::{MapSettings, NoiseSettings, ParamError, TileCoord, generate_map_data};

fn small_settings() -> Arc<MapSettings> {
    Arc::new(MapSettings {
        chunk_size: 9,
        ..MapSettings::default()
    })
}

fn wait_idle(s: &GenerationScheduler) {
    let deadline = Instant::now() + Duration::from_secs(60);
    while s.in_flight() > 0 {
        assert!(Instant::now() < deadline, "scheduler did not go idle");
        std::thread::sleep(Duration::from_millis(2));
    }
}

#[test]
fn thousand_height_requests_complete_exactly_once() {
    let sched = GenerationScheduler::with_workers(4);
    let settings = small_settings();
    let mut expected = HashSet::new();
    for i in 0..1000i32 {
        let coord = TileCoord::new(i % 40, i / 40);
        expected.insert(coord);
        sched
            .request_height(coord, coord.world_position(8.0), &settings)
            .unwrap();
    }
    wait_idle(&sched);

    let mut seen = HashSet::new();
    let mut calls = 0usize;
    let delivered = sched.drain(|c| {
        calls += 1;
        assert_eq!(c.kind(), JobKind::Height);
        assert!(seen.insert(c.coord()), "duplicate completion for {}", c.coord());
    });
    assert_eq!(delivered, 1000);
    assert_eq!(calls, 1000);
    assert_eq!(seen, expected);
    assert_eq!(sched.in_flight(), 0);
    assert_eq!(sched.queued(), 0);

    let stats = sched.stats();
    assert_eq!(stats.height_requested, 1000);
    assert_eq!(stats.height_completed, 1000);

    // a second drain finds nothing
    assert_eq!(sched.drain(|_| panic!("nothing left to deliver")), 0);
}

#[test]
fn background_result_matches_inline_generation() {
    let sched = GenerationScheduler::with_workers(2);
    let settings = small_settings();
    let coord = TileCoord::new(3, -2);
    let centre = coord.world_position(8.0);
    sched.request_height(coord, centre, &settings).unwrap();
    wait_idle(&sched);

    let results = sched.drain_results();
    assert_eq!(results.len(), 1);
    match &results[0] {
        Completion::Height(out) => {
            assert_eq!(out.coord, coord);
            assert_eq!(*out.data, generate_map_data(&settings, centre, None));
        }
        Completion::Mesh(_) => panic!("expected a height result"),
    }
}

#[test]
fn mesh_requests_carry_lod_tags() {
    let sched = GenerationScheduler::with_workers(2);
    let settings = small_settings();
    let data = Arc::new(generate_map_data(&settings, Vec2::ZERO, None));
    let shaping = MeshSettings::default();
    let coord = TileCoord::new(0, 0);
    for lod in [0u32, 1, 2] {
        sched.request_mesh(coord, lod, &data, &shaping).unwrap();
    }
    wait_idle(&sched);

    let mut lods = Vec::new();
    sched.drain(|c| match c {
        Completion::Mesh(out) => {
            let per_line = 8 / loam_mesh::lod_step(out.lod) + 1;
            assert_eq!(out.mesh.vertex_count(), per_line * per_line);
            lods.push(out.lod);
        }
        Completion::Height(_) => panic!("expected mesh results only"),
    });
    lods.sort();
    assert_eq!(lods, vec![0, 1, 2]);
    assert_eq!(sched.stats().mesh_completed, 3);
}

#[test]
fn invalid_requests_fail_before_spawning() {
    let sched = GenerationScheduler::with_workers(1);
    let bad = Arc::new(MapSettings {
        chunk_size: 9,
        noise: NoiseSettings {
            octaves: 0,
            ..NoiseSettings::default()
        },
        ..MapSettings::default()
    });
    assert_eq!(
        sched.request_height(TileCoord::new(0, 0), Vec2::ZERO, &bad),
        Err(RequestError::Param(ParamError::NoOctaves))
    );

    let data = Arc::new(generate_map_data(&small_settings(), Vec2::ZERO, None));
    // step 6 does not divide an edge of 8
    assert_eq!(
        sched.request_mesh(TileCoord::new(0, 0), 3, &data, &MeshSettings::default()),
        Err(RequestError::Mesh(MeshError::LodStepMismatch {
            lod: 3,
            step: 6,
            edge: 8
        }))
    );
    assert_eq!(sched.in_flight(), 0);
    assert_eq!(sched.stats().height_requested, 0);
    assert_eq!(sched.stats().mesh_requested, 0);
}

#[test]
fn falloff_mask_is_shared_between_jobs() {
    let sched = GenerationScheduler::with_workers(2);
    let settings = Arc::new(MapSettings {
        chunk_size: 9,
        use_falloff: true,
        ..MapSettings::default()
    });
    for i in 0..8 {
        sched
            .request_height(TileCoord::new(i, 0), Vec2::new(i as f32 * 8.0, 0.0), &settings)
            .unwrap();
    }
    wait_idle(&sched);
    assert_eq!(sched.drain_results().len(), 8);
    let stats = sched.falloff_cache().stats();
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.hits + stats.misses, 8);
}
