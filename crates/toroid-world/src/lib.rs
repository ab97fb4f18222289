//! Toroidal world addressing and the terrain generation pipeline.
#![forbid(unsafe_code)]

pub mod chunk_coord;
pub mod classify;
pub mod config;
pub mod error;
pub mod heightmap;
pub mod materialize;
pub mod tectonic;
pub mod terrain;
pub mod torus;

pub use chunk_coord::{ChunkCoord, ChunkGrid, Direction};
pub use classify::{Band, BandProfile, MaterialField, classify};
pub use config::{ClimateParams, TectonicParams, WorldGenConfig, WorldParams, load_config_from_path};
pub use error::{ConfigError, WorldError};
pub use heightmap::Heightmap;
pub use materialize::{ColumnCtx, ColumnSample, Palette, Volume, materialize_column};
pub use tectonic::{BoundaryKind, Plate, PlateField, PlateKind, generate};
pub use terrain::Terrain;
pub use torus::{Torus, wrap};
