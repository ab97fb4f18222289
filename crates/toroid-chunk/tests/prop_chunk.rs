use proptest::prelude::*;
use toroid_blocks::{MaterialId, Voxel};
use toroid_chunk::ChunkBuf;
use toroid_world::ChunkCoord;

fn dim() -> impl Strategy<Value = usize> {
    1usize..=8
}

proptest! {
    // idx maps each (x,y,z) within bounds to unique in-range indices
    #[test]
    fn idx_is_unique_and_in_range(cx in -64i32..64, cz in -64i32..64, sx in dim(), sy in dim(), sz in dim()) {
        let expect = sx * sy * sz;
        let buf = ChunkBuf::from_voxels_local(ChunkCoord::new(cx, cz), sx, sy, sz, Vec::new());
        prop_assert_eq!(buf.voxels.len(), expect);
        let mut seen = vec![false; expect];
        for y in 0..sy { for z in 0..sz { for x in 0..sx {
            let i = buf.idx(x, y, z);
            prop_assert!(i < expect);
            prop_assert!(!seen[i]);
            seen[i] = true;
        }}}
        prop_assert!(seen.into_iter().all(|b| b));
    }

    // signed lookup agrees with get_local inside and rejects everything outside
    #[test]
    fn signed_lookup_matches_local(sx in dim(), sy in dim(), sz in dim(), x in -2i32..10, y in -2i32..10, z in -2i32..10) {
        let voxels = (0..sx * sy * sz).map(|i| Voxel::new(MaterialId(i as u16))).collect();
        let buf = ChunkBuf::from_voxels_local(ChunkCoord::new(0, 0), sx, sy, sz, voxels);
        let inside = x >= 0 && y >= 0 && z >= 0
            && (x as usize) < sx && (y as usize) < sy && (z as usize) < sz;
        match buf.get_local_i32(x, y, z) {
            Some(v) => {
                prop_assert!(inside);
                prop_assert_eq!(v, buf.get_local(x as usize, y as usize, z as usize));
            }
            None => prop_assert!(!inside),
        }
    }
}
