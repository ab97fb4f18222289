use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use toroid_blocks::{MaterialRegistry, Voxel};

use crate::chunk_coord::{ChunkCoord, ChunkGrid};
use crate::classify::{MaterialField, classify};
use crate::config::WorldParams;
use crate::error::ConfigError;
use crate::heightmap::Heightmap;
use crate::materialize::{ColumnCtx, ColumnSample, Palette, Volume, materialize_column};
use crate::tectonic::{self, PlateField};
use crate::torus::Torus;

/// Output of one pipeline run: tectonics, classification, and a resolved palette.
/// Read-only once built; chunk buffers are materialized from it on demand.
pub struct Terrain {
    params: WorldParams,
    registry: Arc<MaterialRegistry>,
    palette: Palette,
    heightmap: Heightmap,
    plates: PlateField,
    field: MaterialField,
}

impl Terrain {
    pub fn generate(
        params: &WorldParams,
        registry: Arc<MaterialRegistry>,
    ) -> Result<Self, ConfigError> {
        params.validate()?;
        let palette = Palette::resolve(&registry)?;
        let started = Instant::now();
        let (heightmap, plates) = tectonic::generate(params)?;
        let field = classify(&heightmap, &params.climate);
        log::info!(
            target: "worldgen",
            "terrain {}x{}x{} seed={} classified in {:?}",
            params.width,
            params.depth,
            params.height,
            params.seed,
            started.elapsed()
        );
        for (band, n) in field.band_counts() {
            if n > 0 {
                log::debug!(target: "worldgen", "  {:?}: {} columns", band, n);
            }
        }
        Ok(Self {
            params: params.clone(),
            registry,
            palette,
            heightmap,
            plates,
            field,
        })
    }

    #[inline]
    pub fn params(&self) -> &WorldParams {
        &self.params
    }

    #[inline]
    pub fn torus(&self) -> Torus {
        self.params.torus()
    }

    #[inline]
    pub fn chunk_grid(&self) -> ChunkGrid {
        self.params.chunk_grid()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.params.height
    }

    #[inline]
    pub fn heightmap(&self) -> &Heightmap {
        &self.heightmap
    }

    #[inline]
    pub fn plate_field(&self) -> &PlateField {
        &self.plates
    }

    #[inline]
    pub fn material_field(&self) -> &MaterialField {
        &self.field
    }

    #[inline]
    pub fn registry(&self) -> &Arc<MaterialRegistry> {
        &self.registry
    }

    #[inline]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn sample(&self, x: i32, z: i32) -> ColumnSample {
        ColumnSample {
            band: self.field.band(x, z),
            elevation: self.heightmap.get(x, z),
            frozen: self.field.is_frozen(x, z),
        }
    }

    pub fn column_ctx(&self) -> ColumnCtx {
        ColumnCtx {
            height: self.params.height,
            sea_level: self.params.sea_level,
            palette: self.palette,
        }
    }

    /// Fills a chunk-sized buffer laid out as `(y * S + lz) * S + lx`.
    pub fn materialize_chunk(&self, coord: ChunkCoord, out: &mut [Voxel]) {
        let grid = self.chunk_grid();
        let s = grid.chunk_size as usize;
        let h = self.params.height as usize;
        debug_assert_eq!(out.len(), s * s * h);
        let (ox, oz) = grid.origin(coord);
        let ctx = self.column_ctx();
        let mut column = vec![Voxel::AIR; h];
        for lz in 0..s {
            for lx in 0..s {
                let sample = self.sample(ox + lx as i32, oz + lz as i32);
                materialize_column(sample, &ctx, &mut column);
                for (y, v) in column.iter().enumerate() {
                    out[(y * s + lz) * s + lx] = *v;
                }
            }
        }
    }

    /// Materializes every column in parallel.
    pub fn materialize_volume(&self) -> Volume {
        let torus = self.torus();
        let h = self.params.height as usize;
        let ctx = self.column_ctx();
        let mut data = vec![Voxel::AIR; torus.cells() * h];
        data.par_chunks_mut(h).enumerate().for_each(|(i, col)| {
            let (x, z) = torus.coords(i);
            materialize_column(self.sample(x, z), &ctx, col);
        });
        Volume {
            torus,
            height: self.params.height,
            data,
        }
    }
}
