use toroid_blocks::Voxel;
use toroid_world::{ChunkCoord, Terrain};

/// Dense voxels of one full-height chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkBuf {
    pub coord: ChunkCoord,
    pub sx: usize,
    pub sy: usize,
    pub sz: usize,
    pub voxels: Vec<Voxel>,
}

impl ChunkBuf {
    #[inline]
    pub fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        (y * self.sz + z) * self.sx + x
    }

    #[inline]
    pub fn get_local(&self, x: usize, y: usize, z: usize) -> Voxel {
        self.voxels[self.idx(x, y, z)]
    }

    #[inline]
    pub fn set_local(&mut self, x: usize, y: usize, z: usize, v: Voxel) {
        let i = self.idx(x, y, z);
        self.voxels[i] = v;
    }

    /// Neighbour-free lookup; `None` outside the buffer.
    #[inline]
    pub fn get_local_i32(&self, x: i32, y: i32, z: i32) -> Option<Voxel> {
        if x < 0 || y < 0 || z < 0 {
            return None;
        }
        let (x, y, z) = (x as usize, y as usize, z as usize);
        if x >= self.sx || y >= self.sy || z >= self.sz {
            return None;
        }
        Some(self.get_local(x, y, z))
    }

    pub fn from_voxels_local(
        coord: ChunkCoord,
        sx: usize,
        sy: usize,
        sz: usize,
        voxels: Vec<Voxel>,
    ) -> Self {
        let mut v = voxels;
        v.resize(sx * sy * sz, Voxel::AIR);
        ChunkBuf {
            coord,
            sx,
            sy,
            sz,
            voxels: v,
        }
    }
}

/// Materializes chunk `coord` (wrapped) from the generated terrain.
pub fn generate_chunk_buffer(terrain: &Terrain, coord: ChunkCoord) -> ChunkBuf {
    let grid = terrain.chunk_grid();
    let coord = grid.wrap(coord);
    let s = grid.chunk_size as usize;
    let h = terrain.height() as usize;
    let mut voxels = vec![Voxel::AIR; s * h * s];
    terrain.materialize_chunk(coord, &mut voxels);
    ChunkBuf {
        coord,
        sx: s,
        sy: h,
        sz: s,
        voxels,
    }
}
