use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use loam_geom::{Bounds2, Vec2};
use loam_mesh::{MeshData, MeshSettings};
use loam_runtime::{GenerationScheduler, RequestError};
use loam_world::{MapData, MapSettings, TileCoord};

use crate::renderer::TileRenderer;
use crate::settings::StreamSettings;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileState {
    Empty,
    HeightPending,
    HeightReady,
    /// Heights are in and a mesh for `lod` is being built; nothing shown yet.
    MeshPending { lod: u32 },
    Ready { lod: u32 },
}

/// What a tile needs from its owner to react to a change.
pub(crate) struct TileContext<'a> {
    pub observer: Vec2,
    pub stream: &'a StreamSettings,
    pub scheduler: &'a GenerationScheduler,
    pub shaping: &'a MeshSettings,
}

/// One chunk of terrain. Lives for the rest of the session once created.
pub struct TerrainTile {
    coord: TileCoord,
    position: Vec2,
    bounds: Bounds2,
    map: Option<Arc<MapData>>,
    lod_meshes: HashMap<u32, Arc<MeshData>>,
    height_pending: bool,
    mesh_pending: HashSet<u32>,
    last_applied_lod: Option<u32>,
    visible: bool,
}

impl TerrainTile {
    pub(crate) fn new(coord: TileCoord, edge: f32) -> Self {
        let position = coord.world_position(edge);
        Self {
            coord,
            position,
            bounds: Bounds2::from_center_size(position, Vec2::ONE * edge),
            map: None,
            lod_meshes: HashMap::new(),
            height_pending: false,
            mesh_pending: HashSet::new(),
            last_applied_lod: None,
            visible: false,
        }
    }

    #[inline]
    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn bounds(&self) -> Bounds2 {
        self.bounds
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[inline]
    pub fn map_data(&self) -> Option<&Arc<MapData>> {
        self.map.as_ref()
    }

    #[inline]
    pub fn last_applied_lod(&self) -> Option<u32> {
        self.last_applied_lod
    }

    #[inline]
    pub fn has_mesh(&self, lod: u32) -> bool {
        self.lod_meshes.contains_key(&lod)
    }

    #[inline]
    pub fn is_mesh_pending(&self, lod: u32) -> bool {
        self.mesh_pending.contains(&lod)
    }

    #[inline]
    pub fn is_height_pending(&self) -> bool {
        self.height_pending
    }

    pub fn cached_lods(&self) -> impl Iterator<Item = u32> + '_ {
        self.lod_meshes.keys().copied()
    }

    pub fn pending_lods(&self) -> impl Iterator<Item = u32> + '_ {
        self.mesh_pending.iter().copied()
    }

    pub fn state(&self) -> TileState {
        if self.map.is_none() {
            return if self.height_pending {
                TileState::HeightPending
            } else {
                TileState::Empty
            };
        }
        if let Some(lod) = self.last_applied_lod {
            return TileState::Ready { lod };
        }
        match self.mesh_pending.iter().min() {
            Some(&lod) => TileState::MeshPending { lod },
            None => TileState::HeightReady,
        }
    }

    /// Distance from `observer` to the nearest point of this tile's footprint.
    #[inline]
    pub fn distance_to(&self, observer: Vec2) -> f32 {
        self.bounds.distance(observer)
    }

    pub(crate) fn request_height(
        &mut self,
        scheduler: &GenerationScheduler,
        settings: &Arc<MapSettings>,
    ) -> Result<(), RequestError> {
        if self.height_pending || self.map.is_some() {
            return Ok(());
        }
        scheduler.request_height(self.coord, self.position, settings)?;
        self.height_pending = true;
        Ok(())
    }

    pub(crate) fn on_height_ready(
        &mut self,
        data: Arc<MapData>,
        ctx: &TileContext<'_>,
        renderer: &mut dyn TileRenderer,
    ) -> Result<(), RequestError> {
        self.height_pending = false;
        let colors = &data.colors;
        renderer.apply_color_texture(self.coord, colors, colors.width(), colors.height());
        self.map = Some(data);
        self.update(ctx, renderer)
    }

    pub(crate) fn on_mesh_ready(
        &mut self,
        lod: u32,
        mesh: MeshData,
        ctx: &TileContext<'_>,
        renderer: &mut dyn TileRenderer,
    ) -> Result<(), RequestError> {
        self.mesh_pending.remove(&lod);
        self.lod_meshes.insert(lod, Arc::new(mesh));
        self.update(ctx, renderer)
    }

    /// Refresh visibility and LOD against the observer. No-op until heights arrive.
    pub(crate) fn update(
        &mut self,
        ctx: &TileContext<'_>,
        renderer: &mut dyn TileRenderer,
    ) -> Result<(), RequestError> {
        let Some(map) = self.map.as_ref() else {
            return Ok(());
        };
        let distance = self.distance_to(ctx.observer);
        let visible = distance <= ctx.stream.max_view_distance();

        if visible {
            let lod = ctx.stream.lod_for(distance);
            if self.last_applied_lod != Some(lod) {
                if let Some(mesh) = self.lod_meshes.get(&lod) {
                    log::debug!(
                        target: "stream",
                        "tile {} lod {:?} -> {}",
                        self.coord,
                        self.last_applied_lod,
                        lod
                    );
                    self.last_applied_lod = Some(lod);
                    renderer.apply_mesh(self.coord, Arc::clone(mesh));
                } else if !self.mesh_pending.contains(&lod) {
                    ctx.scheduler.request_mesh(self.coord, lod, map, ctx.shaping)?;
                    self.mesh_pending.insert(lod);
                }
            }
        }

        self.set_visible(visible, renderer);
        Ok(())
    }

    pub(crate) fn set_visible(&mut self, visible: bool, renderer: &mut dyn TileRenderer) {
        if self.visible != visible {
            self.visible = visible;
            renderer.set_visible(self.coord, visible);
        }
    }
}
