use std::sync::Arc;
use std::thread;

use toroid_blocks::{MaterialRegistry, Voxel};
use toroid_chunk::{ChunkStore, generate_chunk_buffer};
use toroid_world::{ChunkCoord, Direction, Terrain, WorldError, WorldParams};

fn store() -> ChunkStore {
    let params = WorldParams::new(64, 64, 32, 16, 1, 6);
    let terrain = Terrain::generate(&params, Arc::new(MaterialRegistry::builtin())).unwrap();
    ChunkStore::new(Arc::new(terrain))
}

fn rock(s: &ChunkStore) -> Voxel {
    s.terrain().palette().rock
}

#[test]
fn voxels_are_periodic() {
    let s = store();
    for &(x, z) in &[(0, 0), (15, 16), (63, 63), (31, 2)] {
        for y in 0..32 {
            let v = s.get_voxel(x, y, z).unwrap();
            assert_eq!(v, s.get_voxel(x + 64, y, z).unwrap());
            assert_eq!(v, s.get_voxel(x, y, z + 64).unwrap());
            assert_eq!(v, s.get_voxel(x - 128, y, z - 64).unwrap());
        }
    }
}

#[test]
fn vertical_bounds_are_enforced() {
    let s = store();
    assert!(matches!(
        s.get_voxel(0, -1, 0),
        Err(WorldError::OutOfBounds { y: -1, height: 32 })
    ));
    assert!(matches!(
        s.get_voxel(0, 32, 0),
        Err(WorldError::OutOfBounds { y: 32, .. })
    ));
    assert!(s.set_voxel(0, 40, 0, Voxel::AIR).is_err());
    assert_eq!(s.resident_count(), 0);
}

#[test]
fn set_voxel_bumps_owner() {
    let s = store();
    let c = ChunkCoord::new(1, 1);
    s.ensure_resident(c);
    let before = s.chunk_version(c);
    s.set_voxel(20, 10, 20, rock(&s)).unwrap();
    assert_eq!(s.get_voxel(20, 10, 20).unwrap(), rock(&s));
    assert!(s.chunk_version(c) > before);
}

#[test]
fn seam_edit_bumps_wrapped_neighbour() {
    let s = store();
    let west_edge = ChunkCoord::new(0, 2);
    let across_seam = ChunkCoord::new(3, 2);
    let v0 = s.ensure_resident(west_edge);
    let v3 = s.ensure_resident(across_seam);
    let bumped = s.set_voxel(0, 12, 40, Voxel::AIR).unwrap();
    assert_eq!(bumped, vec![west_edge, across_seam]);
    assert!(s.chunk_version(west_edge) > v0);
    assert!(s.chunk_version(across_seam) > v3);
    // the interior neighbour is untouched
    assert_eq!(s.chunk_version(ChunkCoord::new(1, 2)), 0);
}

#[test]
fn edge_edit_advances_non_resident_neighbour() {
    let s = store();
    let across_seam = ChunkCoord::new(0, 0);
    let before = s.chunk_version(across_seam);
    assert_eq!(before, 0);
    let bumped = s.set_voxel(63, 10, 5, Voxel::AIR).unwrap();
    assert_eq!(bumped, vec![ChunkCoord::new(3, 0), across_seam]);
    assert!(s.is_resident(across_seam));
    assert!(s.chunk_version(across_seam) > before);
    assert_eq!(s.chunk_version(across_seam), 2);
}

#[test]
fn boundary_layer_matches_snapshot() {
    let s = store();
    let c = ChunkCoord::new(3, 1);
    let snap = s.snapshot(c);
    let east = s.boundary_layer(c, Direction::East);
    let north = s.boundary_layer(c, Direction::North);
    assert_eq!(east.version, snap.version);
    for y in 0..32 {
        for t in 0..16 {
            assert_eq!(east.get(t, y), snap.buf.get_local(15, y, t));
            assert_eq!(north.get(t, y), snap.buf.get_local(t, y, 0));
        }
    }
}

#[test]
fn snapshot_matches_fresh_generation() {
    let s = store();
    let c = ChunkCoord::new(2, 3);
    let snap = s.snapshot(ChunkCoord::new(6, -1));
    assert_eq!(snap.coord, c);
    assert_eq!(snap.buf, generate_chunk_buffer(s.terrain(), c));
}

#[test]
fn surface_height_tracks_edits() {
    let s = store();
    let top = s.surface_height(7, 7).unwrap();
    assert!(top >= 0);
    s.set_voxel(7, 31, 7, rock(&s)).unwrap();
    assert_eq!(s.surface_height(7 + 64, 7), Some(31));
}

#[test]
fn concurrent_writers_on_distinct_chunks() {
    let s = Arc::new(store());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let s = Arc::clone(&s);
            thread::spawn(move || {
                let x = i * 16 + 5;
                for y in 1..20 {
                    s.set_voxel(x, y, 5, Voxel::AIR).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    for i in 0..4 {
        assert_eq!(s.chunk_version(ChunkCoord::new(i, 0)), 1 + 19);
    }
}
