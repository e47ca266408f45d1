use std::sync::Arc;

use loam_mesh::MeshData;
use loam_world::{ColorField, TileCoord};

/// Display side of the streamer. Implementations own whatever visual
/// objects back a tile; the streamer only calls in from its own thread.
pub trait TileRenderer {
    fn set_visible(&mut self, tile: TileCoord, visible: bool);

    fn apply_mesh(&mut self, tile: TileCoord, mesh: Arc<MeshData>);

    fn apply_color_texture(
        &mut self,
        tile: TileCoord,
        colors: &ColorField,
        width: usize,
        height: usize,
    );
}
