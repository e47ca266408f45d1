use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use hashbrown::hash_map::Entry;
use loam_geom::Vec2;
use loam_mesh::{MeshSettings, vertices_per_line};
use loam_runtime::{Completion, GenerationScheduler, RequestError};
use loam_world::{MapSettings, TileCoord};

use crate::StreamError;
use crate::renderer::TileRenderer;
use crate::settings::StreamSettings;
use crate::tile::{TerrainTile, TileContext};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Results drained from the scheduler this tick.
    pub completions: usize,
    /// Whether the visible window was recomputed.
    pub window_updated: bool,
}

/// Keeps the chunks around an observer generated, meshed at the right
/// detail level, and shown or hidden as the observer moves.
///
/// All tile state lives here and is only touched from [`ChunkStreamer::tick`].
pub struct ChunkStreamer {
    scheduler: Arc<GenerationScheduler>,
    map: Arc<MapSettings>,
    shaping: MeshSettings,
    stream: StreamSettings,
    edge: f32,
    chunks_visible_in_view: i32,
    tiles: HashMap<TileCoord, TerrainTile>,
    visible_last_update: HashSet<TileCoord>,
    observer: Vec2,
    observer_at_last_update: Option<Vec2>,
}

impl ChunkStreamer {
    pub fn new(
        scheduler: Arc<GenerationScheduler>,
        map: MapSettings,
        shaping: MeshSettings,
        stream: StreamSettings,
    ) -> Result<Self, StreamError> {
        map.validate()?;
        stream.validate()?;
        for level in &stream.detail_levels {
            vertices_per_line(map.chunk_size, level.lod).map_err(RequestError::from)?;
        }
        let edge = map.chunk_edge() as f32;
        let chunks_visible_in_view = (stream.max_view_distance() / edge).round_ties_even() as i32;
        log::info!(
            target: "stream",
            "streaming {}-unit chunks, {} in view each way, {} detail levels",
            edge,
            chunks_visible_in_view,
            stream.detail_levels.len()
        );
        Ok(Self {
            scheduler,
            map: Arc::new(map),
            shaping,
            stream,
            edge,
            chunks_visible_in_view,
            tiles: HashMap::new(),
            visible_last_update: HashSet::new(),
            observer: Vec2::ZERO,
            observer_at_last_update: None,
        })
    }

    /// Advance one frame: apply finished jobs, then refresh the window if the
    /// observer moved far enough since the last refresh.
    pub fn tick(
        &mut self,
        observer: Vec2,
        renderer: &mut dyn TileRenderer,
    ) -> Result<TickReport, StreamError> {
        self.observer = observer;
        let completions = self.apply_completions(renderer)?;

        let moved_enough = match self.observer_at_last_update {
            None => true,
            Some(last) => (last - observer).length_sq() > self.stream.sqr_move_threshold(),
        };
        if moved_enough {
            self.observer_at_last_update = Some(observer);
            self.update_visible_chunks(renderer)?;
        }
        Ok(TickReport {
            completions,
            window_updated: moved_enough,
        })
    }

    fn apply_completions(&mut self, renderer: &mut dyn TileRenderer) -> Result<usize, StreamError> {
        let completions = self.scheduler.drain_results();
        let n = completions.len();
        let ctx = TileContext {
            observer: self.observer,
            stream: &self.stream,
            scheduler: &self.scheduler,
            shaping: &self.shaping,
        };
        // Drained results are gone from the queues: every one is applied even
        // if an earlier follow-up request fails.
        let mut first_err = None;
        for completion in completions {
            let coord = completion.coord();
            let Some(tile) = self.tiles.get_mut(&coord) else {
                log::warn!(target: "stream", "dropping result for unknown tile {}", coord);
                continue;
            };
            let applied = match completion {
                Completion::Height(out) => tile.on_height_ready(out.data, &ctx, renderer),
                Completion::Mesh(out) => tile.on_mesh_ready(out.lod, out.mesh, &ctx, renderer),
            };
            if let Err(e) = applied {
                log::warn!(target: "stream", "follow-up request for {} failed: {}", coord, e);
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
            if tile.is_visible() {
                self.visible_last_update.insert(coord);
            }
        }
        match first_err {
            Some(e) => Err(e.into()),
            None => Ok(n),
        }
    }

    fn update_visible_chunks(&mut self, renderer: &mut dyn TileRenderer) -> Result<(), StreamError> {
        for coord in self.visible_last_update.drain() {
            if let Some(tile) = self.tiles.get_mut(&coord) {
                tile.set_visible(false, renderer);
            }
        }

        let ctx = TileContext {
            observer: self.observer,
            stream: &self.stream,
            scheduler: &self.scheduler,
            shaping: &self.shaping,
        };
        let current = TileCoord::containing(self.observer, self.edge);
        let n = self.chunks_visible_in_view;
        let mut created = 0usize;
        for dy in -n..=n {
            for dx in -n..=n {
                let coord = current.offset(dx, dy);
                match self.tiles.entry(coord) {
                    Entry::Occupied(mut e) => {
                        let tile = e.get_mut();
                        tile.update(&ctx, renderer)?;
                        if tile.is_visible() {
                            self.visible_last_update.insert(coord);
                        }
                    }
                    Entry::Vacant(e) => {
                        let tile = e.insert(TerrainTile::new(coord, self.edge));
                        tile.request_height(&self.scheduler, &self.map)?;
                        created += 1;
                    }
                }
            }
        }
        log::debug!(
            target: "stream",
            "window around {} refreshed: {} visible, {} new, {} known",
            current,
            self.visible_last_update.len(),
            created,
            self.tiles.len()
        );
        Ok(())
    }

    pub fn tile(&self, coord: TileCoord) -> Option<&TerrainTile> {
        self.tiles.get(&coord)
    }

    pub fn tiles(&self) -> impl Iterator<Item = &TerrainTile> + '_ {
        self.tiles.values()
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Tiles shown as of the last window refresh or completion, sorted.
    pub fn visible_tiles(&self) -> Vec<TileCoord> {
        let mut out: Vec<_> = self.visible_last_update.iter().copied().collect();
        out.sort_unstable();
        out
    }

    #[inline]
    pub fn observer(&self) -> Vec2 {
        self.observer
    }

    #[inline]
    pub fn chunk_edge(&self) -> f32 {
        self.edge
    }

    #[inline]
    pub fn max_view_distance(&self) -> f32 {
        self.stream.max_view_distance()
    }

    #[inline]
    pub fn chunks_visible_in_view(&self) -> i32 {
        self.chunks_visible_in_view
    }

    pub fn map_settings(&self) -> &Arc<MapSettings> {
        &self.map
    }

    pub fn stream_settings(&self) -> &StreamSettings {
        &self.stream
    }

    pub fn scheduler(&self) -> &Arc<GenerationScheduler> {
        &self.scheduler
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use loam_mesh::MeshData;
    use loam_world::ColorField;

    use super::*;
    use crate::settings::LodInfo;

    struct Discard;

    impl TileRenderer for Discard {
        fn set_visible(&mut self, _: TileCoord, _: bool) {}
        fn apply_mesh(&mut self, _: TileCoord, _: Arc<MeshData>) {}
        fn apply_color_texture(&mut self, _: TileCoord, _: &ColorField, _: usize, _: usize) {}
    }

    #[test]
    fn failed_follow_up_does_not_drop_other_completions() {
        let stream = StreamSettings {
            detail_levels: vec![
                LodInfo { lod: 0, range: 20.0 },
                LodInfo { lod: 1, range: 35.0 },
                LodInfo { lod: 2, range: 50.0 },
            ],
            move_threshold: 5.0,
        };
        let map = MapSettings {
            chunk_size: 25,
            ..MapSettings::default()
        };
        let mut s = ChunkStreamer::new(
            Arc::new(GenerationScheduler::with_workers(2)),
            map,
            MeshSettings::default(),
            stream,
        )
        .unwrap();
        s.tick(Vec2::ZERO, &mut Discard).unwrap();

        let deadline = Instant::now() + Duration::from_secs(60);
        while s.scheduler.in_flight() > 0 {
            assert!(Instant::now() < deadline, "heights did not finish");
            std::thread::sleep(Duration::from_millis(2));
        }
        assert_eq!(s.scheduler.queued(), 25);

        // step 10 does not divide the 24-unit edge, so nearby tiles fail to request meshes
        s.stream.detail_levels[0].lod = 5;
        let err = s.tick(Vec2::ZERO, &mut Discard).unwrap_err();
        assert!(matches!(err, StreamError::Request(RequestError::Mesh(_))));

        assert_eq!(s.scheduler.queued(), 0);
        for tile in s.tiles() {
            assert!(tile.map_data().is_some(), "{} lost its heights", tile.coord());
            assert!(!tile.is_height_pending());
        }
    }
}
