use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use hashbrown::HashMap;
use toroid_blocks::Voxel;
use toroid_world::{ChunkCoord, ChunkGrid, Direction, Terrain, WorldError};

use crate::buf::{ChunkBuf, generate_chunk_buffer};

/// A chunk's voxels and version. One lock guards both.
struct ChunkSlot {
    buf: ChunkBuf,
    version: u64,
    /// Cleared by `unload`; writers that raced the unload retry on the fresh slot.
    live: bool,
}

type SlotRef = Arc<RwLock<ChunkSlot>>;

/// Copy of a chunk taken under a single read lock.
#[derive(Clone, Debug)]
pub struct ChunkSnapshot {
    pub coord: ChunkCoord,
    pub version: u64,
    pub buf: ChunkBuf,
}

/// One vertical face plane of a chunk (`H x S` voxels) taken under a single read lock.
///
/// `t` runs along the face: `z` for east/west planes, `x` for north/south planes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundaryLayer {
    pub coord: ChunkCoord,
    pub side: Direction,
    pub version: u64,
    pub size: usize,
    pub height: usize,
    voxels: Vec<Voxel>,
}

impl BoundaryLayer {
    #[inline]
    pub fn get(&self, t: usize, y: usize) -> Voxel {
        self.voxels[y * self.size + t]
    }

    /// A layer where every voxel is `v`.
    pub fn filled(coord: ChunkCoord, side: Direction, size: usize, height: usize, v: Voxel) -> Self {
        Self {
            coord,
            side,
            version: 0,
            size,
            height,
            voxels: vec![v; size * height],
        }
    }

    /// Copies the `side` face plane out of `buf`.
    pub fn capture(buf: &ChunkBuf, side: Direction, version: u64) -> Self {
        let s = buf.sx;
        let h = buf.sy;
        let mut voxels = Vec::with_capacity(s * h);
        for y in 0..h {
            for t in 0..s {
                let (x, z) = match side {
                    Direction::East => (s - 1, t),
                    Direction::West => (0, t),
                    Direction::South => (t, s - 1),
                    Direction::North => (t, 0),
                };
                voxels.push(buf.get_local(x, y, z));
            }
        }
        Self {
            coord: buf.coord,
            side,
            version,
            size: s,
            height: h,
            voxels,
        }
    }
}

/// Owns every resident chunk of one generated world.
///
/// Chunks are materialized lazily from the terrain and addressed only by wrapped
/// [`ChunkCoord`]. The coordinate map lock is held only for lookup and insert, and
/// no operation holds two chunk locks at once.
pub struct ChunkStore {
    terrain: Arc<Terrain>,
    grid: ChunkGrid,
    height: u32,
    slots: RwLock<HashMap<ChunkCoord, SlotRef>>,
    /// Last version of unloaded chunks, so a reload never reuses a version.
    /// Always locked after `slots`.
    retired: RwLock<HashMap<ChunkCoord, u64>>,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl ChunkStore {
    pub fn new(terrain: Arc<Terrain>) -> Self {
        let grid = terrain.chunk_grid();
        let height = terrain.height();
        Self {
            terrain,
            grid,
            height,
            slots: RwLock::new(HashMap::new()),
            retired: RwLock::new(HashMap::new()),
        }
    }

    #[inline]
    pub fn terrain(&self) -> &Arc<Terrain> {
        &self.terrain
    }

    #[inline]
    pub fn grid(&self) -> ChunkGrid {
        self.grid
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn chunk_of(&self, x: i32, z: i32) -> ChunkCoord {
        self.grid.chunk_of(x, z)
    }

    #[inline]
    pub fn neighbor_chunk(&self, coord: ChunkCoord, dir: Direction) -> ChunkCoord {
        self.grid.neighbor(coord, dir)
    }

    fn check_y(&self, y: i32) -> Result<usize, WorldError> {
        if y < 0 || y >= self.height as i32 {
            return Err(WorldError::OutOfBounds {
                y,
                height: self.height,
            });
        }
        Ok(y as usize)
    }

    fn resident(&self, coord: ChunkCoord) -> Option<SlotRef> {
        read(&self.slots).get(&coord).cloned()
    }

    /// Returns the slot for `coord`, materializing it on first access.
    fn slot(&self, coord: ChunkCoord) -> SlotRef {
        let coord = self.grid.wrap(coord);
        if let Some(slot) = self.resident(coord) {
            return slot;
        }
        // Generate outside the map lock; a racing insert of the same chunk wins.
        let buf = generate_chunk_buffer(&self.terrain, coord);
        let mut slots = write(&self.slots);
        slots
            .entry(coord)
            .or_insert_with(|| {
                let version = write(&self.retired).remove(&coord).map_or(1, |v| v + 1);
                log::debug!(target: "chunks", "materialized chunk ({}, {}) v{}", coord.cx, coord.cz, version);
                Arc::new(RwLock::new(ChunkSlot {
                    buf,
                    version,
                    live: true,
                }))
            })
            .clone()
    }

    /// Runs `f` under the write lock of the live slot for `coord`, materializing it if needed.
    fn with_live_slot<R>(&self, coord: ChunkCoord, f: impl FnOnce(&mut ChunkSlot) -> R) -> R {
        loop {
            let slot = self.slot(coord);
            let mut guard = write(&slot);
            if guard.live {
                return f(&mut guard);
            }
        }
    }

    /// Materializes `coord` if needed and returns its version.
    pub fn ensure_resident(&self, coord: ChunkCoord) -> u64 {
        read(&self.slot(coord)).version
    }

    #[inline]
    pub fn is_resident(&self, coord: ChunkCoord) -> bool {
        read(&self.slots).contains_key(&self.grid.wrap(coord))
    }

    #[inline]
    pub fn resident_count(&self) -> usize {
        read(&self.slots).len()
    }

    /// Current version, or 0 when the chunk is not resident.
    pub fn chunk_version(&self, coord: ChunkCoord) -> u64 {
        self.resident(self.grid.wrap(coord))
            .map_or(0, |slot| read(&slot).version)
    }

    pub fn get_voxel(&self, x: i32, y: i32, z: i32) -> Result<Voxel, WorldError> {
        let y = self.check_y(y)?;
        let slot = self.slot(self.grid.chunk_of(x, z));
        let (lx, lz) = self.grid.local(x, z);
        let guard = read(&slot);
        Ok(guard.buf.get_local(lx, y, lz))
    }

    /// Writes a voxel and bumps the owning chunk plus every face neighbour whose
    /// mesh culls against it, materializing neighbours that are not resident yet.
    /// Returns the chunks whose version advanced.
    pub fn set_voxel(&self, x: i32, y: i32, z: i32, v: Voxel) -> Result<Vec<ChunkCoord>, WorldError> {
        let y = self.check_y(y)?;
        let owner = self.grid.chunk_of(x, z);
        let (lx, lz) = self.grid.local(x, z);
        self.with_live_slot(owner, |slot| {
            slot.buf.set_local(lx, y, lz, v);
            slot.version += 1;
        });
        let mut bumped = vec![owner];
        for coord in self.affected_chunks(x, y as i32, z) {
            if coord == owner {
                continue;
            }
            self.with_live_slot(coord, |slot| slot.version += 1);
            bumped.push(coord);
        }
        Ok(bumped)
    }

    /// The owning chunk followed by every distinct face neighbour adjacent to `(x, z)`.
    pub fn affected_chunks(&self, x: i32, _y: i32, z: i32) -> Vec<ChunkCoord> {
        let owner = self.grid.chunk_of(x, z);
        let (lx, lz) = self.grid.local(x, z);
        let last = self.grid.chunk_size as usize - 1;
        let mut out = vec![owner];
        let mut push = |dir: Direction| {
            let c = self.grid.neighbor(owner, dir);
            if !out.contains(&c) {
                out.push(c);
            }
        };
        if lx == 0 {
            push(Direction::West);
        }
        if lx == last {
            push(Direction::East);
        }
        if lz == 0 {
            push(Direction::North);
        }
        if lz == last {
            push(Direction::South);
        }
        out
    }

    pub fn snapshot(&self, coord: ChunkCoord) -> ChunkSnapshot {
        let slot = self.slot(coord);
        let guard = read(&slot);
        ChunkSnapshot {
            coord: guard.buf.coord,
            version: guard.version,
            buf: guard.buf.clone(),
        }
    }

    /// The `side` face plane of chunk `coord`.
    pub fn boundary_layer(&self, coord: ChunkCoord, side: Direction) -> BoundaryLayer {
        let slot = self.slot(coord);
        let guard = read(&slot);
        BoundaryLayer::capture(&guard.buf, side, guard.version)
    }

    /// Topmost non-air layer of column `(x, z)`.
    pub fn surface_height(&self, x: i32, z: i32) -> Option<i32> {
        let slot = self.slot(self.grid.chunk_of(x, z));
        let (lx, lz) = self.grid.local(x, z);
        let guard = read(&slot);
        (0..guard.buf.sy)
            .rev()
            .find(|&y| !guard.buf.get_local(lx, y, lz).is_air())
            .map(|y| y as i32)
    }

    /// Drops a chunk. Face neighbours are bumped since their culling saw its voxels.
    pub fn unload(&self, coord: ChunkCoord) -> bool {
        let coord = self.grid.wrap(coord);
        let version = {
            let mut slots = write(&self.slots);
            let Some(slot) = slots.remove(&coord) else {
                return false;
            };
            let mut guard = write(&slot);
            guard.live = false;
            write(&self.retired).insert(coord, guard.version);
            guard.version
        };
        for dir in Direction::ALL {
            let n = self.grid.neighbor(coord, dir);
            if n == coord {
                continue;
            }
            if let Some(slot) = self.resident(n) {
                write(&slot).version += 1;
            }
        }
        log::debug!(target: "chunks", "unloaded chunk ({}, {}) at v{}", coord.cx, coord.cz, version);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toroid_blocks::MaterialRegistry;
    use toroid_world::WorldParams;

    fn store() -> ChunkStore {
        let params = WorldParams::new(32, 32, 16, 8, 3, 4);
        let terrain = Terrain::generate(&params, Arc::new(MaterialRegistry::builtin())).unwrap();
        ChunkStore::new(Arc::new(terrain))
    }

    #[test]
    fn chunks_materialize_lazily() {
        let s = store();
        assert_eq!(s.resident_count(), 0);
        assert_eq!(s.chunk_version(ChunkCoord::new(1, 1)), 0);
        s.get_voxel(9, 0, 9).unwrap();
        assert_eq!(s.resident_count(), 1);
        assert_eq!(s.chunk_version(ChunkCoord::new(1, 1)), 1);
        // aliased coordinates hit the same chunk
        s.get_voxel(9 + 32, 0, 9 - 64).unwrap();
        assert_eq!(s.resident_count(), 1);
        assert!(s.is_resident(ChunkCoord::new(5, -3)));
    }

    #[test]
    fn affected_chunks_dedup_on_narrow_grids() {
        let params = WorldParams::new(8, 16, 16, 8, 3, 1);
        let terrain = Terrain::generate(&params, Arc::new(MaterialRegistry::builtin())).unwrap();
        let s = ChunkStore::new(Arc::new(terrain));
        // one chunk wide in x: both x neighbours are the chunk itself
        let a = s.affected_chunks(0, 0, 3);
        assert_eq!(a, vec![ChunkCoord::new(0, 0)]);
        let b = s.affected_chunks(7, 0, 8);
        assert_eq!(b, vec![ChunkCoord::new(0, 1), ChunkCoord::new(0, 0)]);
    }

    #[test]
    fn unload_then_reload_never_reuses_a_version() {
        let s = store();
        let c = ChunkCoord::new(2, 2);
        s.set_voxel(17, 5, 17, Voxel::AIR).unwrap();
        assert_eq!(s.chunk_version(c), 2);
        assert!(s.unload(c));
        assert_eq!(s.chunk_version(c), 0);
        assert_eq!(s.ensure_resident(c), 3);
        assert!(read(&s.retired).is_empty());
    }

    #[test]
    fn unloaded_slot_is_dead_and_later_writes_use_the_reload() {
        let s = store();
        let c = ChunkCoord::new(2, 2);
        let detached = s.slot(c);
        let retired_at = read(&detached).version;
        assert!(s.unload(c));
        assert!(!read(&detached).live);

        s.set_voxel(17, 5, 17, Voxel::AIR).unwrap();
        assert_eq!(read(&detached).version, retired_at);
        assert_eq!(s.chunk_version(c), retired_at + 2);
        assert_eq!(s.get_voxel(17, 5, 17).unwrap(), Voxel::AIR);
    }

    #[test]
    fn versions_stay_unique_under_unload_churn() {
        let s = Arc::new(store());
        let c = ChunkCoord::new(1, 1);
        let writer = {
            let s = Arc::clone(&s);
            std::thread::spawn(move || {
                for i in 0..400 {
                    s.set_voxel(12, 1 + i % 14, 12, Voxel::AIR).unwrap();
                }
            })
        };
        let mut seen = Vec::new();
        for _ in 0..100 {
            seen.push(s.ensure_resident(c));
            s.unload(c);
        }
        writer.join().unwrap();
        seen.push(s.ensure_resident(c));
        // each reload starts past every version the previous incarnation reached
        assert!(seen.windows(2).all(|w| w[0] < w[1]), "{seen:?}");
    }
}
