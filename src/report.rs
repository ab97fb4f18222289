//! Text summaries of a generated world for the CLI.

use std::collections::BTreeMap;

use serde::Serialize;
use toroid_mesh_cpu::ChunkMesh;
use toroid_world::{Band, Terrain};

use crate::facade::WorldFacade;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MeshSummary {
    pub cx: i32,
    pub cz: i32,
    pub version: u64,
    pub faces: usize,
    pub vertices: usize,
    pub triangles: usize,
}

impl MeshSummary {
    pub fn of(mesh: &ChunkMesh) -> Self {
        Self {
            cx: mesh.coord.cx,
            cz: mesh.coord.cz,
            version: mesh.version,
            faces: mesh.face_count(),
            vertices: mesh.vertex_count(),
            triangles: mesh.triangle_count(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WorldSummary {
    pub seed: u64,
    pub width: u32,
    pub depth: u32,
    pub height: u32,
    pub chunk_size: u32,
    pub sea_level: u32,
    pub plates: usize,
    pub boundary_columns: usize,
    pub elevation_min: f32,
    pub elevation_max: f32,
    pub bands: BTreeMap<&'static str, usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub meshes: Vec<MeshSummary>,
}

fn band_key(b: Band) -> &'static str {
    match b {
        Band::DeepOcean => "deep_ocean",
        Band::Ocean => "ocean",
        Band::Beach => "beach",
        Band::Snow => "snow",
        Band::Rock => "rock",
        Band::Tundra => "tundra",
        Band::Desert => "desert",
        Band::Forest => "forest",
        Band::Grassland => "grassland",
    }
}

impl WorldSummary {
    pub fn from_world(world: &WorldFacade) -> Self {
        let p = world.params();
        let terrain = world.terrain();
        let (elevation_min, elevation_max) = terrain.heightmap().min_max();
        let bands = terrain
            .material_field()
            .band_counts()
            .into_iter()
            .filter(|&(_, n)| n > 0)
            .map(|(b, n)| (band_key(b), n))
            .collect();
        Self {
            seed: p.seed,
            width: p.width,
            depth: p.depth,
            height: p.height,
            chunk_size: p.chunk_size,
            sea_level: p.sea_level,
            plates: terrain.plate_field().plates().len(),
            boundary_columns: terrain.plate_field().boundary_cells(),
            elevation_min,
            elevation_max,
            bands,
            meshes: Vec::new(),
        }
    }

    pub fn with_meshes(mut self, meshes: Vec<MeshSummary>) -> Self {
        self.meshes = meshes;
        self
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }
}

/// Band glyphs sampled on a grid at most `max_cols` wide, one line per sampled row.
pub fn ascii_band_map(terrain: &Terrain, max_cols: usize) -> String {
    let torus = terrain.torus();
    let (w, d) = (torus.width as usize, torus.depth as usize);
    let step = w.div_ceil(max_cols.max(1)).max(1);
    let field = terrain.material_field();
    let mut out = String::with_capacity((w / step + 1) * (d / step + 1));
    for z in (0..d).step_by(step) {
        for x in (0..w).step_by(step) {
            out.push(field.band(x as i32, z as i32).glyph());
        }
        out.push('\n');
    }
    out
}
