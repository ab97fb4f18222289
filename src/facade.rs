use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::{Duration, Instant};

use hashbrown::HashMap;
use toroid_blocks::{MaterialRegistry, Voxel};
use toroid_chunk::ChunkStore;
use toroid_geom::Vec3;
use toroid_mesh_cpu::{ChunkMesh, NeighborBorders, build_chunk_mesh};
use toroid_runtime::{MeshJob, MeshOut, Runtime};
use toroid_world::{
    ChunkCoord, ChunkGrid, ConfigError, Direction, Terrain, WorldError, WorldGenConfig, WorldParams,
};

use crate::raycast::{RayHit, raycast_first_hit_with_face};

/// Where chunk meshes get built.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MeshingMode {
    /// Synchronously inside `get_chunk_mesh`.
    #[default]
    Inline,
    /// On a worker pool; `get_chunk_mesh` returns the previous mesh until a newer one lands.
    /// `workers == 0` sizes the pool from available parallelism.
    Background { workers: usize },
}

/// Cached mesh lags the chunk it was built from.
#[derive(Clone, Copy, Debug)]
struct StaleMesh {
    built: u64,
    current: u64,
}

fn check_fresh(mesh: &ChunkMesh, current: u64) -> Result<(), StaleMesh> {
    if mesh.is_behind(current) {
        Err(StaleMesh {
            built: mesh.version,
            current,
        })
    } else {
        Ok(())
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Entry point for renderers and input handling: voxel queries, edits, chunk meshes and
/// regeneration. Horizontal coordinates are always wrapped onto the torus.
pub struct WorldFacade {
    params: WorldParams,
    registry: Arc<MaterialRegistry>,
    store: Arc<ChunkStore>,
    mode: MeshingMode,
    runtime: Option<Runtime>,
    epoch: Arc<AtomicU64>,
    next_job_id: AtomicU64,
    meshes: RwLock<HashMap<ChunkCoord, Arc<ChunkMesh>>>,
    // chunk -> version the outstanding background job was requested for
    pending: Mutex<HashMap<ChunkCoord, u64>>,
}

impl WorldFacade {
    /// Validates `params` and runs the generation pipeline before returning.
    pub fn new(
        params: WorldParams,
        registry: Arc<MaterialRegistry>,
        mode: MeshingMode,
    ) -> Result<Self, ConfigError> {
        let terrain = Terrain::generate(&params, Arc::clone(&registry))?;
        let runtime = match mode {
            MeshingMode::Inline => None,
            MeshingMode::Background { workers } => Some(Runtime::new(workers)),
        };
        let epoch = runtime
            .as_ref()
            .map(Runtime::epoch_handle)
            .unwrap_or_else(|| Arc::new(AtomicU64::new(0)));
        Ok(Self {
            params,
            registry,
            store: Arc::new(ChunkStore::new(Arc::new(terrain))),
            mode,
            runtime,
            epoch,
            next_job_id: AtomicU64::new(1),
            meshes: RwLock::new(HashMap::new()),
            pending: Mutex::new(HashMap::new()),
        })
    }

    pub fn from_config(cfg: &WorldGenConfig) -> Result<Self, ConfigError> {
        let registry = Arc::new(cfg.registry()?);
        let mode = if cfg.runtime.background {
            MeshingMode::Background {
                workers: cfg.runtime.workers,
            }
        } else {
            MeshingMode::Inline
        };
        Self::new(WorldParams::from_config(cfg), registry, mode)
    }

    #[inline]
    pub fn params(&self) -> &WorldParams {
        &self.params
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.params.seed
    }

    #[inline]
    pub fn mode(&self) -> MeshingMode {
        self.mode
    }

    #[inline]
    pub fn registry(&self) -> &Arc<MaterialRegistry> {
        &self.registry
    }

    /// Heightmap, plate field and material field of the current generation.
    #[inline]
    pub fn terrain(&self) -> &Terrain {
        self.store.terrain()
    }

    #[inline]
    pub fn store(&self) -> &Arc<ChunkStore> {
        &self.store
    }

    /// Generation counter, advanced by every `regenerate`.
    #[inline]
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    #[inline]
    pub fn chunk_grid(&self) -> ChunkGrid {
        self.store.grid()
    }

    #[inline]
    pub fn chunk_of(&self, x: i32, z: i32) -> ChunkCoord {
        self.store.chunk_of(x, z)
    }

    #[inline]
    pub fn neighbor_chunk(&self, coord: ChunkCoord, dir: Direction) -> ChunkCoord {
        self.store.neighbor_chunk(coord, dir)
    }

    /// Current version of chunk `(cx, cz)`; 0 when it has not been materialized yet.
    pub fn chunk_version(&self, cx: i32, cz: i32) -> u64 {
        self.store.chunk_version(ChunkCoord::new(cx, cz))
    }

    pub fn get_voxel(&self, x: i32, y: i32, z: i32) -> Result<Voxel, WorldError> {
        self.store.get_voxel(x, y, z)
    }

    /// Writes one voxel and returns every chunk whose version moved.
    pub fn set_voxel(&self, x: i32, y: i32, z: i32, v: Voxel) -> Result<Vec<ChunkCoord>, WorldError> {
        let bumped = self.store.set_voxel(x, y, z, v)?;
        if let Some(rt) = &self.runtime {
            let cached: Vec<ChunkCoord> = {
                let meshes = self.meshes.read().unwrap_or_else(PoisonError::into_inner);
                bumped.iter().copied().filter(|c| meshes.contains_key(c)).collect()
            };
            for coord in cached {
                let current = self.store.chunk_version(coord);
                self.request(rt, coord, current);
            }
        }
        Ok(bumped)
    }

    /// Collision test: opaque voxels and everything below the floor are solid; air, water and
    /// anything above the world are not.
    pub fn is_solid(&self, x: i32, y: i32, z: i32) -> bool {
        if y < 0 {
            return true;
        }
        match self.store.get_voxel(x, y, z) {
            Ok(v) => self.registry.transparency(v).is_solid(),
            Err(_) => false,
        }
    }

    pub fn surface_height(&self, x: i32, z: i32) -> Option<i32> {
        self.store.surface_height(x, z)
    }

    /// First solid voxel hit by the ray, with horizontal coordinates wrapped.
    pub fn raycast(&self, origin: Vec3, dir: Vec3, max_dist: f32) -> Option<RayHit> {
        let torus = self.params.torus();
        raycast_first_hit_with_face(origin, dir, max_dist, |x, y, z| self.is_solid(x, y, z))
            .map(|hit| hit.wrapped(&torus))
    }

    /// Mesh of chunk `(cx, cz)`.
    ///
    /// Inline mode materializes the chunk if needed and always returns a mesh at least as new
    /// as the chunk was on entry. Background mode never blocks: materialization and meshing
    /// both run on the workers, and the call hands back the cached mesh, or `None` before the
    /// first build lands.
    pub fn get_chunk_mesh(&self, cx: i32, cz: i32) -> Option<Arc<ChunkMesh>> {
        let coord = self.store.grid().wrap(ChunkCoord::new(cx, cz));
        let current = match &self.runtime {
            Some(_) => {
                self.poll();
                // 0 until a worker materializes the chunk
                self.store.chunk_version(coord)
            }
            None => self.store.ensure_resident(coord),
        };
        let cached = self
            .meshes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&coord)
            .cloned();
        match cached.as_deref().map(|m| check_fresh(m, current)) {
            Some(Ok(())) => return cached,
            Some(Err(stale)) => log::debug!(
                target: "mesh",
                "chunk ({}, {}) mesh v{} behind v{}",
                coord.cx,
                coord.cz,
                stale.built,
                stale.current
            ),
            None => {}
        }
        match &self.runtime {
            None => Some(self.build_inline(coord)),
            Some(rt) => {
                self.request(rt, coord, current);
                cached
            }
        }
    }

    /// Installs finished background meshes. Returns how many were accepted.
    pub fn poll(&self) -> usize {
        let Some(rt) = &self.runtime else {
            return 0;
        };
        rt.drain_results()
            .into_iter()
            .map(|out| self.accept(out))
            .filter(|&installed| installed)
            .count()
    }

    /// Blocks until every outstanding background build has landed or `timeout` passes.
    /// For batch tools and tests; a render loop should call `poll` instead.
    pub fn flush(&self, timeout: Duration) -> bool {
        let Some(rt) = &self.runtime else {
            return true;
        };
        let deadline = Instant::now() + timeout;
        loop {
            self.poll();
            if lock(&self.pending).is_empty() {
                return true;
            }
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                return false;
            }
            if let Some(out) = rt.wait_result(left.min(Duration::from_millis(50))) {
                self.accept(out);
            }
        }
    }

    /// Discards every chunk and mesh and reruns generation with `seed`. Background builds
    /// still running against the old world are dropped when they finish.
    pub fn regenerate(&mut self, seed: u64) -> Result<(), ConfigError> {
        let params = self.params.with_seed(seed);
        let started = Instant::now();
        let terrain = Terrain::generate(&params, Arc::clone(&self.registry))?;
        let epoch = match &self.runtime {
            Some(rt) => rt.advance_epoch(),
            None => self.epoch.fetch_add(1, Ordering::AcqRel) + 1,
        };
        self.store = Arc::new(ChunkStore::new(Arc::new(terrain)));
        self.params = params;
        self.meshes.get_mut().unwrap_or_else(PoisonError::into_inner).clear();
        self.pending.get_mut().unwrap_or_else(PoisonError::into_inner).clear();
        log::info!(
            target: "worldgen",
            "regenerated world seed={} epoch={} in {:?}",
            seed,
            epoch,
            started.elapsed()
        );
        Ok(())
    }

    pub fn cached_mesh_count(&self) -> usize {
        self.meshes.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Chunks with a background build outstanding.
    pub fn pending_mesh_count(&self) -> usize {
        lock(&self.pending).len()
    }

    /// `(queued, in_flight, skipped_stale)` of the background pool, if any.
    pub fn queue_debug_counts(&self) -> Option<(usize, usize, usize)> {
        self.runtime.as_ref().map(Runtime::queue_debug_counts)
    }

    fn build_inline(&self, coord: ChunkCoord) -> Arc<ChunkMesh> {
        let snapshot = self.store.snapshot(coord);
        let borders = NeighborBorders::capture(&self.store, coord);
        let mut mesh = build_chunk_mesh(&snapshot, &borders, &self.registry);
        mesh.epoch = self.epoch();
        let mesh = Arc::new(mesh);
        self.install(Arc::clone(&mesh));
        mesh
    }

    fn request(&self, rt: &Runtime, coord: ChunkCoord, current: u64) {
        {
            let mut pending = lock(&self.pending);
            if pending.get(&coord).is_some_and(|&v| v >= current) {
                return;
            }
            pending.insert(coord, current);
        }
        rt.submit(MeshJob {
            coord,
            job_id: self.next_job_id.fetch_add(1, Ordering::Relaxed),
            epoch: self.epoch(),
            current_epoch: Arc::clone(&self.epoch),
            store: Arc::clone(&self.store),
            reg: Arc::clone(&self.registry),
        });
    }

    fn accept(&self, out: MeshOut) -> bool {
        log::debug!(
            target: "mesh",
            "job {} chunk ({}, {}) v{} meshed in {}ms",
            out.job_id,
            out.coord.cx,
            out.coord.cz,
            out.mesh.version,
            out.t_mesh_ms
        );
        {
            let mut pending = lock(&self.pending);
            if pending.get(&out.coord).is_some_and(|&v| v <= out.mesh.version) {
                pending.remove(&out.coord);
            }
        }
        self.install(Arc::new(out.mesh))
    }

    /// Caches `mesh` unless it belongs to an older generation or an equal-or-newer mesh is
    /// already cached.
    fn install(&self, mesh: Arc<ChunkMesh>) -> bool {
        if mesh.epoch != self.epoch() {
            return false;
        }
        let mut meshes = self.meshes.write().unwrap_or_else(PoisonError::into_inner);
        match meshes.get(&mesh.coord) {
            Some(existing) if existing.version > mesh.version => false,
            _ => {
                meshes.insert(mesh.coord, mesh);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> WorldFacade {
        let params = WorldParams::new(32, 32, 16, 8, 5, 4);
        WorldFacade::new(params, Arc::new(MaterialRegistry::builtin()), MeshingMode::Inline).unwrap()
    }

    #[test]
    fn cached_mesh_is_reused_until_an_edit() {
        let w = world();
        let a = w.get_chunk_mesh(1, 1).unwrap();
        let b = w.get_chunk_mesh(1, 1).unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        let top = w.surface_height(10, 10).unwrap();
        w.set_voxel(10, top, 10, Voxel::AIR).unwrap();
        let c = w.get_chunk_mesh(1, 1).unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
        assert!(c.version > a.version);
    }

    #[test]
    fn stale_check_compares_versions() {
        let w = world();
        let m = w.get_chunk_mesh(0, 0).unwrap();
        assert!(check_fresh(&m, m.version).is_ok());
        let err = check_fresh(&m, m.version + 1).unwrap_err();
        assert_eq!((err.built, err.current), (m.version, m.version + 1));
    }

    #[test]
    fn older_epoch_meshes_are_not_installed() {
        let mut w = world();
        let old = w.get_chunk_mesh(0, 0).unwrap();
        w.regenerate(6).unwrap();
        assert_eq!(w.cached_mesh_count(), 0);
        assert!(!w.install(old));
        assert_eq!(w.cached_mesh_count(), 0);
    }

    #[test]
    fn below_floor_is_solid_above_ceiling_is_not() {
        let w = world();
        assert!(w.is_solid(3, -1, 3));
        assert!(!w.is_solid(3, 16, 3));
        assert!(!w.is_solid(3, 400, 3));
    }
}
