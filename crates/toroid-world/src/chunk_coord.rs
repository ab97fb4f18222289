use serde::{Deserialize, Serialize};

use crate::torus::wrap;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cz: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cz: i32) -> Self {
        Self { cx, cz }
    }

    #[inline]
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            cx: self.cx + dx,
            cz: self.cz + dz,
        }
    }
}

impl From<(i32, i32)> for ChunkCoord {
    fn from(value: (i32, i32)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl From<ChunkCoord> for (i32, i32) {
    fn from(value: ChunkCoord) -> Self {
        (value.cx, value.cz)
    }
}

/// Horizontal neighbour direction. East is +x, south is +z.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    East,
    West,
    South,
    North,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::East,
        Direction::West,
        Direction::South,
        Direction::North,
    ];

    #[inline]
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::South => (0, 1),
            Direction::North => (0, -1),
        }
    }

    #[inline]
    pub fn opposite(self) -> Direction {
        match self {
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::South => Direction::North,
            Direction::North => Direction::South,
        }
    }
}

/// The toroidal grid of chunks. All chunk addressing wraps through here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkGrid {
    pub chunks_x: i32,
    pub chunks_z: i32,
    pub chunk_size: i32,
}

impl ChunkGrid {
    #[inline]
    pub const fn new(chunks_x: i32, chunks_z: i32, chunk_size: i32) -> Self {
        Self {
            chunks_x,
            chunks_z,
            chunk_size,
        }
    }

    /// Canonical (wrapped) form of a chunk coordinate.
    #[inline]
    pub fn wrap(&self, c: ChunkCoord) -> ChunkCoord {
        ChunkCoord::new(wrap(c.cx, self.chunks_x), wrap(c.cz, self.chunks_z))
    }

    #[inline]
    pub fn neighbor(&self, c: ChunkCoord, dir: Direction) -> ChunkCoord {
        let (dx, dz) = dir.delta();
        self.wrap(c.offset(dx, dz))
    }

    /// Chunk owning world column `(x, z)`.
    #[inline]
    pub fn chunk_of(&self, x: i32, z: i32) -> ChunkCoord {
        let s = self.chunk_size;
        let x = wrap(x, self.chunks_x * s);
        let z = wrap(z, self.chunks_z * s);
        ChunkCoord::new(x / s, z / s)
    }

    /// Position of `(x, z)` inside its owning chunk.
    #[inline]
    pub fn local(&self, x: i32, z: i32) -> (usize, usize) {
        let s = self.chunk_size;
        let x = wrap(x, self.chunks_x * s);
        let z = wrap(z, self.chunks_z * s);
        ((x % s) as usize, (z % s) as usize)
    }

    /// World column of the chunk's minimum corner.
    #[inline]
    pub fn origin(&self, c: ChunkCoord) -> (i32, i32) {
        let c = self.wrap(c);
        (c.cx * self.chunk_size, c.cz * self.chunk_size)
    }

    #[inline]
    pub fn len(&self) -> usize {
        (self.chunks_x as usize) * (self.chunks_z as usize)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        (0..self.chunks_z).flat_map(move |cz| (0..self.chunks_x).map(move |cx| ChunkCoord::new(cx, cz)))
    }
}
