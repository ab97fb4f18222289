//! CPU face-culling mesher for toroidal chunks.
#![forbid(unsafe_code)]

mod build;
mod chunk;
mod emit;
mod face;
mod mesh_build;
mod neighbors;

pub use build::{build_chunk_mesh, face_visible};
pub use chunk::{ChunkMesh, FaceRef};
pub use emit::BuildSink;
pub use face::Face;
pub use mesh_build::MeshBuild;
pub use neighbors::NeighborBorders;
