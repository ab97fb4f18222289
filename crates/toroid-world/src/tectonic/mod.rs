//! Plate tectonics over the toroidal column grid.

mod boundary;
mod noise;
mod plate;
mod sim;

use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::WorldParams;
use crate::error::ConfigError;
use crate::heightmap::Heightmap;
use crate::torus::Torus;

pub use boundary::{BoundaryKind, classify_pair};
pub use plate::{Plate, PlateKind};
pub use sim::SimContext;

/// Per-column plate metadata produced alongside the heightmap.
#[derive(Clone, Debug, PartialEq)]
pub struct PlateField {
    torus: Torus,
    plates: Vec<Plate>,
    owner: Vec<u16>,
    boundary: Vec<Option<BoundaryKind>>,
    distance: Vec<u16>,
}

impl PlateField {
    #[inline]
    pub fn plates(&self) -> &[Plate] {
        &self.plates
    }

    #[inline]
    pub fn plate_at(&self, x: i32, z: i32) -> u16 {
        self.owner[self.torus.index(x, z)]
    }

    #[inline]
    pub fn boundary_at(&self, x: i32, z: i32) -> Option<BoundaryKind> {
        self.boundary[self.torus.index(x, z)]
    }

    /// Steps to the nearest boundary column, saturating at the configured cap.
    #[inline]
    pub fn boundary_distance(&self, x: i32, z: i32) -> u16 {
        self.distance[self.torus.index(x, z)]
    }

    pub fn boundary_cells(&self) -> usize {
        self.boundary.iter().filter(|b| b.is_some()).count()
    }
}

/// Runs the plate simulation. Output is a pure function of `params`.
pub fn generate(params: &WorldParams) -> Result<(Heightmap, PlateField), ConfigError> {
    params.validate()?;
    let started = Instant::now();
    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
    let mut ctx = SimContext::new(params, &mut rng);
    for _ in 0..params.tectonics.steps {
        ctx.step();
    }
    let (normalized, field) = ctx.finish();
    let heightmap = Heightmap::from_normalized(
        params.torus(),
        params.height,
        params.sea_level,
        &normalized,
    );
    let (lo, hi) = heightmap.min_max();
    log::info!(
        target: "worldgen",
        "tectonics: {} plates, {} steps, {} boundary cols, elevation {:.1}..{:.1} in {:?}",
        field.plates.len(),
        params.tectonics.steps,
        field.boundary_cells(),
        lo,
        hi,
        started.elapsed()
    );
    Ok((heightmap, field))
}
