use toroid_blocks::Voxel;
use toroid_chunk::{BoundaryLayer, ChunkStore};
use toroid_world::{ChunkCoord, Direction};

/// The facing boundary plane of each horizontal neighbour.
///
/// `east` is the east neighbour's west plane, and so on. On the torus a neighbour may
/// be the chunk itself when the grid is one chunk wide.
#[derive(Clone, Debug)]
pub struct NeighborBorders {
    pub east: BoundaryLayer,
    pub west: BoundaryLayer,
    pub south: BoundaryLayer,
    pub north: BoundaryLayer,
}

impl NeighborBorders {
    /// Reads each neighbour's facing plane under that neighbour's own read lock.
    pub fn capture(store: &ChunkStore, coord: ChunkCoord) -> Self {
        let layer = |dir: Direction| store.boundary_layer(store.neighbor_chunk(coord, dir), dir.opposite());
        Self {
            east: layer(Direction::East),
            west: layer(Direction::West),
            south: layer(Direction::South),
            north: layer(Direction::North),
        }
    }

    /// Borders made of a single voxel kind, for isolated builds.
    pub fn uniform(coord: ChunkCoord, size: usize, height: usize, v: Voxel) -> Self {
        let layer = |dir: Direction| BoundaryLayer::filled(coord, dir.opposite(), size, height, v);
        Self {
            east: layer(Direction::East),
            west: layer(Direction::West),
            south: layer(Direction::South),
            north: layer(Direction::North),
        }
    }

    #[inline]
    pub fn get(&self, dir: Direction) -> &BoundaryLayer {
        match dir {
            Direction::East => &self.east,
            Direction::West => &self.west,
            Direction::South => &self.south,
            Direction::North => &self.north,
        }
    }
}
