//! Background generation: worker pool, result queues, and the per-tick drain.
#![forbid(unsafe_code)]

mod falloff_cache;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender, unbounded};
use loam_geom::Vec2;
use loam_mesh::{MeshData, MeshError, MeshSettings, build_terrain_mesh, vertices_per_line};
use loam_world::{MapData, MapSettings, ParamError, TileCoord, generate_map_data};
use rayon::{ThreadPool, ThreadPoolBuilder};
use thiserror::Error;

pub use crate::falloff_cache::{FalloffCache, FalloffCacheStats};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    #[error("invalid map parameters: {0}")]
    Param(#[from] ParamError),
    #[error("invalid mesh request: {0}")]
    Mesh(#[from] MeshError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JobKind {
    Height,
    Mesh { lod: u32 },
}

pub struct HeightOut {
    pub coord: TileCoord,
    pub data: Arc<MapData>,
    pub t_gen_ms: u32,
}

pub struct MeshOut {
    pub coord: TileCoord,
    pub lod: u32,
    pub mesh: MeshData,
    pub t_mesh_ms: u32,
}

/// One finished job, tagged with the tile and request kind it answers.
pub enum Completion {
    Height(HeightOut),
    Mesh(MeshOut),
}

impl Completion {
    #[inline]
    pub fn coord(&self) -> TileCoord {
        match self {
            Completion::Height(out) => out.coord,
            Completion::Mesh(out) => out.coord,
        }
    }

    #[inline]
    pub fn kind(&self) -> JobKind {
        match self {
            Completion::Height(_) => JobKind::Height,
            Completion::Mesh(out) => JobKind::Mesh { lod: out.lod },
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub height_requested: u64,
    pub height_completed: u64,
    pub mesh_requested: u64,
    pub mesh_completed: u64,
}

#[inline]
fn elapsed_ms(t0: Instant) -> u32 {
    t0.elapsed().as_millis().min(u128::from(u32::MAX)) as u32
}

/// Runs map and mesh generation off the calling thread.
///
/// Workers only ever touch their own inputs and the two result queues. The
/// owner calls [`GenerationScheduler::drain`] once per tick to hand results
/// to tile state on its own thread.
pub struct GenerationScheduler {
    pool: Arc<ThreadPool>,
    height_tx: Sender<HeightOut>,
    height_rx: Receiver<HeightOut>,
    mesh_tx: Sender<MeshOut>,
    mesh_rx: Receiver<MeshOut>,
    inflight_height: Arc<AtomicUsize>,
    inflight_mesh: Arc<AtomicUsize>,
    height_requested: AtomicU64,
    mesh_requested: AtomicU64,
    height_completed: AtomicU64,
    mesh_completed: AtomicU64,
    falloff: Arc<FalloffCache>,
    pub workers: usize,
}

impl GenerationScheduler {
    pub fn new() -> Self {
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(8);
        Self::with_workers(workers)
    }

    pub fn with_workers(workers: usize) -> Self {
        let workers = workers.max(1);
        let pool = Arc::new(
            ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("loam-gen-{i}"))
                .build()
                .expect("generation pool"),
        );
        let (height_tx, height_rx) = unbounded::<HeightOut>();
        let (mesh_tx, mesh_rx) = unbounded::<MeshOut>();
        log::debug!(target: "runtime", "generation pool started with {} workers", workers);
        Self {
            pool,
            height_tx,
            height_rx,
            mesh_tx,
            mesh_rx,
            inflight_height: Arc::new(AtomicUsize::new(0)),
            inflight_mesh: Arc::new(AtomicUsize::new(0)),
            height_requested: AtomicU64::new(0),
            mesh_requested: AtomicU64::new(0),
            height_completed: AtomicU64::new(0),
            mesh_completed: AtomicU64::new(0),
            falloff: Arc::new(FalloffCache::new()),
            workers,
        }
    }

    /// Queue map generation for the chunk at `coord`, centred at `centre`.
    pub fn request_height(
        &self,
        coord: TileCoord,
        centre: Vec2,
        settings: &Arc<MapSettings>,
    ) -> Result<(), RequestError> {
        settings.validate()?;
        let settings = Arc::clone(settings);
        let falloff = Arc::clone(&self.falloff);
        let tx = self.height_tx.clone();
        let inflight = Arc::clone(&self.inflight_height);

        self.height_requested.fetch_add(1, Ordering::Relaxed);
        inflight.fetch_add(1, Ordering::AcqRel);
        log::debug!(target: "runtime", "height requested for {}", coord);
        self.pool.spawn(move || {
            let t0 = Instant::now();
            let mask = settings
                .use_falloff
                .then(|| falloff.get_or_generate(settings.chunk_size));
            let data = generate_map_data(&settings, centre, mask.as_deref());
            let _ = tx.send(HeightOut {
                coord,
                data: Arc::new(data),
                t_gen_ms: elapsed_ms(t0),
            });
            inflight.fetch_sub(1, Ordering::AcqRel);
        });
        Ok(())
    }

    /// Queue a mesh build of `data` at `lod`. The shaping settings are copied into the job.
    pub fn request_mesh(
        &self,
        coord: TileCoord,
        lod: u32,
        data: &Arc<MapData>,
        shaping: &MeshSettings,
    ) -> Result<(), RequestError> {
        let heights = &data.heights;
        if !heights.is_square() {
            return Err(MeshError::NonSquareField {
                width: heights.width(),
                height: heights.height(),
            }
            .into());
        }
        vertices_per_line(heights.width(), lod)?;

        let data = Arc::clone(data);
        let multiplier = shaping.height_multiplier;
        let curve = shaping.height_curve.clone();
        let tx = self.mesh_tx.clone();
        let inflight = Arc::clone(&self.inflight_mesh);

        self.mesh_requested.fetch_add(1, Ordering::Relaxed);
        inflight.fetch_add(1, Ordering::AcqRel);
        log::debug!(target: "runtime", "mesh requested for {} at lod {}", coord, lod);
        self.pool.spawn(move || {
            let t0 = Instant::now();
            let mesh = match build_terrain_mesh(&data.heights, multiplier, &curve, lod) {
                Ok(mesh) => mesh,
                Err(e) => panic!("mesh job for {coord} failed after validation: {e}"),
            };
            let _ = tx.send(MeshOut {
                coord,
                lod,
                mesh,
                t_mesh_ms: elapsed_ms(t0),
            });
            inflight.fetch_sub(1, Ordering::AcqRel);
        });
        Ok(())
    }

    /// Hand every queued result to `sink`, heights first, each queue in completion order.
    /// Never blocks; returns the number of results delivered.
    pub fn drain(&self, mut sink: impl FnMut(Completion)) -> usize {
        let mut n = 0usize;
        for out in self.height_rx.try_iter() {
            self.height_completed.fetch_add(1, Ordering::Relaxed);
            log::trace!(target: "runtime", "height ready for {} in {}ms", out.coord, out.t_gen_ms);
            sink(Completion::Height(out));
            n += 1;
        }
        for out in self.mesh_rx.try_iter() {
            self.mesh_completed.fetch_add(1, Ordering::Relaxed);
            log::trace!(
                target: "runtime",
                "mesh ready for {} lod {} in {}ms",
                out.coord,
                out.lod,
                out.t_mesh_ms
            );
            sink(Completion::Mesh(out));
            n += 1;
        }
        n
    }

    pub fn drain_results(&self) -> Vec<Completion> {
        let mut out = Vec::new();
        self.drain(|c| out.push(c));
        out
    }

    /// Jobs requested but not yet posted to a result queue.
    pub fn in_flight(&self) -> usize {
        self.inflight_height.load(Ordering::Acquire) + self.inflight_mesh.load(Ordering::Acquire)
    }

    /// Results posted but not yet drained.
    pub fn queued(&self) -> usize {
        self.height_rx.len() + self.mesh_rx.len()
    }

    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            height_requested: self.height_requested.load(Ordering::Relaxed),
            height_completed: self.height_completed.load(Ordering::Relaxed),
            mesh_requested: self.mesh_requested.load(Ordering::Relaxed),
            mesh_completed: self.mesh_completed.load(Ordering::Relaxed),
        }
    }

    pub fn falloff_cache(&self) -> Arc<FalloffCache> {
        Arc::clone(&self.falloff)
    }
}

impl Default for GenerationScheduler {
    fn default() -> Self {
        Self::new()
    }
}
