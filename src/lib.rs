//! Toroidal voxel world: a facade over tectonic generation, the chunk store and meshing.
#![forbid(unsafe_code)]

pub mod facade;
pub mod raycast;
pub mod report;

pub use facade::{MeshingMode, WorldFacade};
pub use raycast::{RayHit, raycast_first_hit_with_face};
pub use report::{MeshSummary, WorldSummary, ascii_band_map};

pub use toroid_blocks::{MaterialId, MaterialRegistry, Transparency, Voxel};
pub use toroid_mesh_cpu::{ChunkMesh, Face, FaceRef};
pub use toroid_world::{ChunkCoord, ChunkGrid, ConfigError, Direction, WorldError, WorldGenConfig, WorldParams};
