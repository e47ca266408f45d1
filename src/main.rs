//! Loam: streamed, LOD-meshed procedural terrain around a moving observer.

mod config;
mod preview;
mod sink;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use loam_geom::Vec2;
use loam_runtime::GenerationScheduler;
use loam_stream::ChunkStreamer;

use crate::config::{TerrainConfig, load_config_from_path};
use crate::preview::{PreviewMode, run_preview};
use crate::sink::LogRenderer;

#[derive(Parser)]
#[command(name = "loam")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Terrain config (TOML). Built-in defaults are used when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is unset (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk an observer in a straight line and stream terrain around it.
    Stream {
        /// Number of frames to run.
        #[arg(long, default_value = "240")]
        ticks: u32,

        /// Observer start position.
        #[arg(long, num_args = 2, value_names = ["X", "Y"], default_values_t = [0.0, 0.0], allow_negative_numbers = true)]
        start: Vec<f32>,

        /// Observer velocity in world units per tick.
        #[arg(long, num_args = 2, value_names = ["DX", "DY"], default_values_t = [8.0, 0.0], allow_negative_numbers = true)]
        velocity: Vec<f32>,

        /// Wall-clock length of one tick.
        #[arg(long, default_value = "16")]
        tick_ms: u64,

        /// Worker threads for generation (defaults to available cores).
        #[arg(long)]
        workers: Option<usize>,
    },

    /// Generate a single chunk synchronously and print statistics.
    Preview {
        #[arg(short, long, value_enum, default_value = "color")]
        mode: PreviewMode,

        /// Chunk grid coordinate to preview.
        #[arg(long, num_args = 2, value_names = ["X", "Y"], default_values_t = [0, 0], allow_negative_numbers = true)]
        tile: Vec<i32>,

        /// Detail level for `--mode mesh`.
        #[arg(long, default_value = "0")]
        lod: u32,

        /// Write the preview texture as raw RGBA8 bytes.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .format_timestamp_millis()
        .init();

    if let Err(e) = run(cli) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let cfg = match &cli.config {
        Some(path) => load_config_from_path(path)?,
        None => TerrainConfig::default(),
    };

    match cli.command {
        Commands::Stream {
            ticks,
            start,
            velocity,
            tick_ms,
            workers,
        } => {
            let start = Vec2::new(start[0], start[1]);
            let velocity = Vec2::new(velocity[0], velocity[1]);
            run_stream(&cfg, ticks, start, velocity, Duration::from_millis(tick_ms), workers)
        }
        Commands::Preview {
            mode,
            tile,
            lod,
            out,
        } => {
            let map = cfg.map_settings()?;
            let coord = loam_world::TileCoord::new(tile[0], tile[1]);
            let centre = coord.world_position(map.chunk_edge() as f32);
            run_preview(&map, &cfg.mesh, mode, centre, lod, out.as_deref())
        }
    }
}

fn run_stream(
    cfg: &TerrainConfig,
    ticks: u32,
    start: Vec2,
    velocity: Vec2,
    tick: Duration,
    workers: Option<usize>,
) -> Result<(), Box<dyn Error>> {
    let scheduler = Arc::new(match workers {
        Some(n) => GenerationScheduler::with_workers(n),
        None => GenerationScheduler::new(),
    });
    let mut streamer = ChunkStreamer::new(
        Arc::clone(&scheduler),
        cfg.map_settings()?,
        cfg.mesh.clone(),
        cfg.stream.clone(),
    )?;
    let mut renderer = LogRenderer::default();
    log::info!(
        "streaming for {} ticks from ({}, {}) with {} workers; view distance {}",
        ticks,
        start.x,
        start.y,
        scheduler.workers,
        streamer.max_view_distance()
    );

    let t0 = Instant::now();
    let mut observer = start;
    let mut window_updates = 0u32;
    for i in 0..ticks {
        let report = streamer.tick(observer, &mut renderer)?;
        if report.window_updated {
            window_updates += 1;
            log::info!(
                target: "stream",
                "tick {}: observer ({:.1}, {:.1}), {} tiles, {} shown, {} jobs in flight",
                i,
                observer.x,
                observer.y,
                streamer.tile_count(),
                renderer.shown(),
                scheduler.in_flight()
            );
        }
        observer += velocity;
        std::thread::sleep(tick);
    }

    // let outstanding work land at the final position
    let end = observer - velocity;
    while scheduler.in_flight() > 0 || scheduler.queued() > 0 {
        std::thread::sleep(tick);
        streamer.tick(end, &mut renderer)?;
    }

    let stats = scheduler.stats();
    println!("ran {} ticks in {:.2}s", ticks, t0.elapsed().as_secs_f32());
    println!("window updates: {}", window_updates);
    println!(
        "tiles: {} created, {} shown, {} textures, {} mesh swaps",
        streamer.tile_count(),
        renderer.shown(),
        renderer.textures(),
        renderer.mesh_swaps()
    );
    println!(
        "jobs: height {}/{}  mesh {}/{}",
        stats.height_completed, stats.height_requested, stats.mesh_completed, stats.mesh_requested
    );
    for (verts, n) in renderer.shown_by_vertex_count() {
        println!("  {:>3} shown tiles at {} vertices", n, verts);
    }
    let falloff = scheduler.falloff_cache().stats();
    log::debug!(
        "falloff cache: {} hits, {} misses, {} sizes",
        falloff.hits,
        falloff.misses,
        falloff.entries
    );
    Ok(())
}
