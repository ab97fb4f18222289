//! Background mesh workers with epoch-based cancellation.
#![forbid(unsafe_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use rayon::{ThreadPool, ThreadPoolBuilder};
use toroid_blocks::MaterialRegistry;
use toroid_chunk::ChunkStore;
use toroid_mesh_cpu::{ChunkMesh, NeighborBorders, build_chunk_mesh};
use toroid_world::ChunkCoord;

#[derive(Clone)]
pub struct MeshJob {
    pub coord: ChunkCoord,
    pub job_id: u64,
    /// Epoch the job was issued under.
    pub epoch: u64,
    /// Shared current epoch; the job is stale once this moves past `epoch`.
    pub current_epoch: Arc<AtomicU64>,
    pub store: Arc<ChunkStore>,
    pub reg: Arc<MaterialRegistry>,
}

impl MeshJob {
    #[inline]
    pub fn is_stale(&self) -> bool {
        self.current_epoch.load(Ordering::Acquire) != self.epoch
    }
}

pub struct MeshOut {
    pub coord: ChunkCoord,
    pub job_id: u64,
    pub epoch: u64,
    pub mesh: ChunkMesh,
    pub t_mesh_ms: u32,
}

fn process_mesh_job(job: MeshJob, tx: &Sender<MeshOut>, skipped: &AtomicUsize) {
    if job.is_stale() {
        skipped.fetch_add(1, Ordering::Relaxed);
        log::debug!(target: "runtime", "skip stale mesh job {} for ({}, {})", job.job_id, job.coord.cx, job.coord.cz);
        return;
    }
    let t0 = Instant::now();
    let snapshot = job.store.snapshot(job.coord);
    let borders = NeighborBorders::capture(&job.store, job.coord);
    let mut mesh = build_chunk_mesh(&snapshot, &borders, &job.reg);
    mesh.epoch = job.epoch;
    let t_mesh_ms = t0.elapsed().as_millis().min(u128::from(u32::MAX)) as u32;
    if job.is_stale() {
        skipped.fetch_add(1, Ordering::Relaxed);
        log::debug!(target: "runtime", "discard mesh for ({}, {}) built under epoch {}", job.coord.cx, job.coord.cz, job.epoch);
        return;
    }
    let _ = tx.send(MeshOut {
        coord: mesh.coord,
        job_id: job.job_id,
        epoch: job.epoch,
        mesh,
        t_mesh_ms,
    });
}

/// Worker pool draining a single mesh job queue.
pub struct Runtime {
    job_tx: Sender<MeshJob>,
    res_rx: Receiver<MeshOut>,
    _pool: Arc<ThreadPool>,
    epoch: Arc<AtomicU64>,
    queued: Arc<AtomicUsize>,
    inflight: Arc<AtomicUsize>,
    skipped: Arc<AtomicUsize>,
    workers: usize,
}

impl Runtime {
    /// Spawns `workers` mesh loops; 0 means available parallelism minus one, at least one.
    pub fn new(workers: usize) -> Self {
        let workers = if workers == 0 {
            thread::available_parallelism()
                .map(|n| n.get().saturating_sub(1))
                .unwrap_or(1)
                .max(1)
        } else {
            workers
        };
        let (job_tx, job_rx) = unbounded::<MeshJob>();
        let (res_tx, res_rx) = unbounded::<MeshOut>();
        let epoch = Arc::new(AtomicU64::new(0));
        let queued = Arc::new(AtomicUsize::new(0));
        let inflight = Arc::new(AtomicUsize::new(0));
        let skipped = Arc::new(AtomicUsize::new(0));

        let pool = Arc::new(
            ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("toroid-mesh-{i}"))
                .build()
                .expect("mesh pool"),
        );
        for _ in 0..workers {
            let rx = job_rx.clone();
            let tx = res_tx.clone();
            let queued = queued.clone();
            let inflight = inflight.clone();
            let skipped = skipped.clone();
            pool.spawn(move || {
                while let Ok(job) = rx.recv() {
                    queued.fetch_sub(1, Ordering::Relaxed);
                    inflight.fetch_add(1, Ordering::Relaxed);
                    process_mesh_job(job, &tx, &skipped);
                    inflight.fetch_sub(1, Ordering::Relaxed);
                }
            });
        }
        log::info!(target: "runtime", "mesh runtime started with {} workers", workers);

        Self {
            job_tx,
            res_rx,
            _pool: pool,
            epoch,
            queued,
            inflight,
            skipped,
            workers,
        }
    }

    #[inline]
    pub fn workers(&self) -> usize {
        self.workers
    }

    #[inline]
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    /// Handle for building [`MeshJob`]s against this runtime.
    pub fn epoch_handle(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.epoch)
    }

    /// Moves to a new epoch; every queued or running job from older epochs is dropped.
    pub fn advance_epoch(&self) -> u64 {
        let next = self.epoch.fetch_add(1, Ordering::AcqRel) + 1;
        log::debug!(target: "runtime", "epoch -> {}", next);
        next
    }

    pub fn submit(&self, job: MeshJob) {
        self.queued.fetch_add(1, Ordering::Relaxed);
        if self.job_tx.send(job).is_err() {
            self.queued.fetch_sub(1, Ordering::Relaxed);
        }
    }

    /// Completed meshes of the current epoch. Older results are discarded.
    pub fn drain_results(&self) -> Vec<MeshOut> {
        let current = self.epoch();
        self.res_rx
            .try_iter()
            .filter(|out| self.keep(out, current))
            .collect()
    }

    /// Blocks up to `timeout` for the next current-epoch result.
    pub fn wait_result(&self, timeout: Duration) -> Option<MeshOut> {
        let deadline = Instant::now() + timeout;
        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            match self.res_rx.recv_timeout(left) {
                Ok(out) if self.keep(&out, self.epoch()) => return Some(out),
                Ok(_) => continue,
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    fn keep(&self, out: &MeshOut, current: u64) -> bool {
        if out.epoch == current {
            return true;
        }
        self.skipped.fetch_add(1, Ordering::Relaxed);
        log::debug!(target: "runtime", "drop result for ({}, {}) from epoch {}", out.coord.cx, out.coord.cz, out.epoch);
        false
    }

    /// `(queued, in_flight, skipped_stale)`.
    pub fn queue_debug_counts(&self) -> (usize, usize, usize) {
        (
            self.queued.load(Ordering::Relaxed),
            self.inflight.load(Ordering::Relaxed),
            self.skipped.load(Ordering::Relaxed),
        )
    }
}
