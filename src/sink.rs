use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use loam_mesh::MeshData;
use loam_stream::TileRenderer;
use loam_world::{ColorField, TileCoord};

/// Headless renderer: remembers what would be on screen and logs changes.
#[derive(Default)]
pub struct LogRenderer {
    shown: HashSet<TileCoord>,
    meshes: HashMap<TileCoord, (usize, usize)>,
    textures: usize,
    mesh_swaps: usize,
}

impl LogRenderer {
    pub fn shown(&self) -> usize {
        self.shown.len()
    }

    pub fn textures(&self) -> usize {
        self.textures
    }

    pub fn mesh_swaps(&self) -> usize {
        self.mesh_swaps
    }

    /// Shown tiles grouped by the vertex count of their current mesh; tiles
    /// without a mesh yet are counted under 0.
    pub fn shown_by_vertex_count(&self) -> Vec<(usize, usize)> {
        let mut counts: HashMap<usize, usize> = HashMap::new();
        for coord in &self.shown {
            let verts = self.meshes.get(coord).map(|m| m.0).unwrap_or(0);
            *counts.entry(verts).or_default() += 1;
        }
        let mut out: Vec<_> = counts.into_iter().collect();
        out.sort_unstable_by(|a, b| b.0.cmp(&a.0));
        out
    }
}

impl TileRenderer for LogRenderer {
    fn set_visible(&mut self, tile: TileCoord, visible: bool) {
        if visible {
            self.shown.insert(tile);
        } else {
            self.shown.remove(&tile);
        }
        log::trace!(target: "render", "{} visible={}", tile, visible);
    }

    fn apply_mesh(&mut self, tile: TileCoord, mesh: Arc<MeshData>) {
        self.mesh_swaps += 1;
        self.meshes
            .insert(tile, (mesh.vertex_count(), mesh.triangle_count()));
        log::debug!(
            target: "render",
            "{} mesh {} verts / {} tris",
            tile,
            mesh.vertex_count(),
            mesh.triangle_count()
        );
    }

    fn apply_color_texture(
        &mut self,
        tile: TileCoord,
        _colors: &ColorField,
        width: usize,
        height: usize,
    ) {
        self.textures += 1;
        log::trace!(target: "render", "{} texture {}x{}", tile, width, height);
    }
}
