use std::collections::HashMap;

use toroid_blocks::MaterialId;
use toroid_geom::Aabb;
use toroid_world::ChunkCoord;

use crate::face::Face;
use crate::mesh_build::MeshBuild;

/// One emitted face, addressed by the canonical world voxel it belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceRef {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub face: Face,
    pub material: MaterialId,
}

/// Geometry of one chunk, tagged with the chunk version it was built from.
#[derive(Clone, Debug)]
pub struct ChunkMesh {
    pub coord: ChunkCoord,
    pub version: u64,
    /// World generation the mesh belongs to.
    pub epoch: u64,
    pub bbox: Aabb,
    pub parts: HashMap<MaterialId, MeshBuild>,
    pub faces: Vec<FaceRef>,
}

impl ChunkMesh {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.parts.values().map(MeshBuild::vertex_count).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.parts.values().map(MeshBuild::triangle_count).sum()
    }

    /// Whether the chunk has advanced past the version this mesh was built from.
    #[inline]
    pub fn is_behind(&self, current: u64) -> bool {
        self.version < current
    }
}
