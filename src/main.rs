use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use hashbrown::HashSet;
use toroid::{ChunkCoord, MeshSummary, WorldFacade, WorldGenConfig, WorldSummary, ascii_band_map};
use toroid_world::load_config_from_path;

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate a toroidal voxel world and mesh the chunks around the origin", long_about = None)]
struct Args {
    /// TOML world config; CLI flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    seed: Option<u64>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    depth: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    #[arg(long)]
    chunk_size: Option<u32>,

    #[arg(long)]
    plates: Option<u32>,

    #[arg(long)]
    sea_level: Option<u32>,

    /// Print a downsampled band map
    #[arg(long)]
    map: bool,

    /// Widest the band map may be, in characters
    #[arg(long, default_value_t = 64)]
    map_cols: usize,

    /// Mesh every chunk within this many chunks of (0, 0)
    #[arg(long, default_value_t = 1)]
    mesh_radius: i32,

    /// Build meshes on the worker pool instead of inline
    #[arg(long)]
    background: bool,

    /// Worker threads for background meshing; 0 picks from available parallelism
    #[arg(long)]
    workers: Option<usize>,

    /// Print the world and mesh summary as TOML
    #[arg(long)]
    summary: bool,
}

impl Args {
    fn apply(&self, cfg: &mut WorldGenConfig) {
        let w = &mut cfg.world;
        if let Some(v) = self.seed {
            w.seed = v;
        }
        if let Some(v) = self.width {
            w.width = v;
        }
        if let Some(v) = self.depth {
            w.depth = v;
        }
        if let Some(v) = self.height {
            w.height = v;
        }
        if let Some(v) = self.chunk_size {
            w.chunk_size = v;
        }
        if let Some(v) = self.sea_level {
            w.sea_level = v;
        }
        if let Some(v) = self.plates {
            cfg.tectonics.plate_count = v;
        }
        if self.background {
            cfg.runtime.background = true;
        }
        if let Some(v) = self.workers {
            cfg.runtime.workers = v;
        }
    }
}

fn chunks_around_origin(world: &WorldFacade, radius: i32) -> Vec<ChunkCoord> {
    let grid = world.chunk_grid();
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for dz in -radius..=radius {
        for dx in -radius..=radius {
            let c = grid.wrap(ChunkCoord::new(dx, dz));
            if seen.insert(c) {
                out.push(c);
            }
        }
    }
    out
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let mut cfg = match &args.config {
        Some(path) => load_config_from_path(path)?,
        None => WorldGenConfig::default(),
    };
    args.apply(&mut cfg);

    let world = WorldFacade::from_config(&cfg)?;
    let summary = WorldSummary::from_world(&world);
    log::info!(
        "world {}x{}x{} seed={} plates={} elevation {:.3}..{:.3}",
        summary.width,
        summary.depth,
        summary.height,
        summary.seed,
        summary.plates,
        summary.elevation_min,
        summary.elevation_max
    );

    if args.map {
        print!("{}", ascii_band_map(world.terrain(), args.map_cols));
    }

    let coords = chunks_around_origin(&world, args.mesh_radius.max(0));
    for &c in &coords {
        world.get_chunk_mesh(c.cx, c.cz);
    }
    if !world.flush(Duration::from_secs(60)) {
        log::warn!("background meshing did not finish; reporting what landed");
    }
    let mut meshes = Vec::with_capacity(coords.len());
    for &c in &coords {
        match world.get_chunk_mesh(c.cx, c.cz) {
            Some(mesh) => {
                let m = MeshSummary::of(&mesh);
                log::info!(
                    "chunk ({}, {}) v{}: {} faces, {} vertices, {} triangles",
                    m.cx,
                    m.cz,
                    m.version,
                    m.faces,
                    m.vertices,
                    m.triangles
                );
                meshes.push(m);
            }
            None => log::warn!("chunk ({}, {}) has no mesh yet", c.cx, c.cz),
        }
    }
    if let Some((queued, inflight, skipped)) = world.queue_debug_counts() {
        log::debug!("mesh queue: queued={} inflight={} skipped={}", queued, inflight, skipped);
    }

    if args.summary {
        print!("{}", summary.with_meshes(meshes).to_toml()?);
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    if let Err(e) = run(args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
