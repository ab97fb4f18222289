use std::sync::Arc;
use std::time::Duration;

use toroid_blocks::MaterialRegistry;
use toroid_chunk::ChunkStore;
use toroid_runtime::{MeshJob, Runtime};
use toroid_world::{ChunkCoord, Terrain, WorldParams};

fn store() -> Arc<ChunkStore> {
    let params = WorldParams::new(32, 32, 16, 16, 1, 4);
    let terrain = Terrain::generate(&params, Arc::new(MaterialRegistry::builtin())).unwrap();
    Arc::new(ChunkStore::new(Arc::new(terrain)))
}

fn job(rt: &Runtime, store: &Arc<ChunkStore>, coord: ChunkCoord, job_id: u64) -> MeshJob {
    MeshJob {
        coord,
        job_id,
        epoch: rt.epoch(),
        current_epoch: rt.epoch_handle(),
        store: Arc::clone(store),
        reg: Arc::clone(store.terrain().registry()),
    }
}

#[test]
fn builds_every_submitted_chunk() {
    let rt = Runtime::new(2);
    let store = store();
    for (i, c) in store.grid().iter().enumerate() {
        rt.submit(job(&rt, &store, c, i as u64));
    }
    let mut got = Vec::new();
    while got.len() < 4 {
        let out = rt
            .wait_result(Duration::from_secs(30))
            .expect("mesh result");
        assert_eq!(out.mesh.version, store.chunk_version(out.coord));
        assert_eq!(out.mesh.epoch, 0);
        got.push(out.coord);
    }
    got.sort();
    let mut all: Vec<_> = store.grid().iter().collect();
    all.sort();
    assert_eq!(got, all);
}

#[test]
fn stale_epoch_jobs_are_dropped() {
    let rt = Runtime::new(1);
    let store = store();
    let old = job(&rt, &store, ChunkCoord::new(0, 0), 1);
    rt.advance_epoch();
    rt.submit(old);
    rt.submit(job(&rt, &store, ChunkCoord::new(1, 1), 2));
    let out = rt
        .wait_result(Duration::from_secs(30))
        .expect("current epoch result");
    assert_eq!(out.job_id, 2);
    assert_eq!(out.epoch, 1);
    assert!(rt.wait_result(Duration::from_millis(200)).is_none());
    let (_, _, skipped) = rt.queue_debug_counts();
    assert_eq!(skipped, 1);
}

#[test]
fn zero_workers_picks_at_least_one() {
    assert!(Runtime::new(0).workers() >= 1);
}
