use std::collections::HashMap;

use toroid_blocks::{MaterialRegistry, Transparency};
use toroid_chunk::{ChunkBuf, ChunkSnapshot};
use toroid_geom::{Aabb, Vec3};

use crate::chunk::{ChunkMesh, FaceRef};
use crate::emit::emit_voxel_face;
use crate::face::Face;
use crate::neighbors::NeighborBorders;

/// Whether a voxel of class `here` shows its face toward a voxel of class `there`.
#[inline]
pub fn face_visible(here: Transparency, there: Transparency) -> bool {
    !here.is_empty() && (there.is_empty() || there != here)
}

/// Class of the voxel one step out of `face` from local `(x, y, z)`.
///
/// Above the world is empty and below it is opaque. Steps off the chunk's
/// horizontal edge read the neighbour's captured plane, which on the torus
/// includes the neighbour across the seam.
#[inline]
fn neighbor_class(
    buf: &ChunkBuf,
    borders: &NeighborBorders,
    reg: &MaterialRegistry,
    x: usize,
    y: usize,
    z: usize,
    face: Face,
) -> Transparency {
    let (dx, dy, dz) = face.delta();
    let ny = y as i32 + dy;
    if ny >= buf.sy as i32 {
        return Transparency::Empty;
    }
    if ny < 0 {
        return Transparency::Opaque;
    }
    let ny = ny as usize;
    let nx = x as i32 + dx;
    let nz = z as i32 + dz;
    let off_edge = nx < 0 || nx >= buf.sx as i32 || nz < 0 || nz >= buf.sz as i32;
    let v = match face.direction() {
        Some(dir) if off_edge => {
            let t = if dx != 0 { z } else { x };
            borders.get(dir).get(t, ny)
        }
        _ => buf.get_local(nx as usize, ny, nz as usize),
    };
    reg.transparency(v)
}

/// Builds the mesh of one chunk from a snapshot and its neighbours' boundary planes.
///
/// Pure: it never touches the store, so it can run on any thread. Positions are in
/// world space from the chunk's canonical origin. The result carries the snapshot's
/// version and epoch 0; callers stamp the epoch.
pub fn build_chunk_mesh(
    snapshot: &ChunkSnapshot,
    borders: &NeighborBorders,
    reg: &MaterialRegistry,
) -> ChunkMesh {
    let buf = &snapshot.buf;
    let ox = snapshot.coord.cx * buf.sx as i32;
    let oz = snapshot.coord.cz * buf.sz as i32;
    let mut parts = HashMap::new();
    let mut faces = Vec::new();
    let mut bbox = Aabb::EMPTY;
    for y in 0..buf.sy {
        for z in 0..buf.sz {
            for x in 0..buf.sx {
                let here = buf.get_local(x, y, z);
                let class = reg.transparency(here);
                if class.is_empty() {
                    continue;
                }
                let rgba = reg.color(here.id);
                let (wx, wy, wz) = (ox + x as i32, y as i32, oz + z as i32);
                let min = Vec3::from_voxel(wx, wy, wz);
                let mut emitted = false;
                for face in Face::ALL {
                    let there = neighbor_class(buf, borders, reg, x, y, z, face);
                    if !face_visible(class, there) {
                        continue;
                    }
                    emit_voxel_face(&mut parts, here.id, face, min, rgba);
                    faces.push(FaceRef {
                        x: wx,
                        y: wy,
                        z: wz,
                        face,
                        material: here.id,
                    });
                    emitted = true;
                }
                if emitted {
                    bbox.include(min);
                    bbox.include(min + Vec3::new(1.0, 1.0, 1.0));
                }
            }
        }
    }
    log::trace!(
        target: "mesh",
        "built chunk ({}, {}) v{}: {} faces",
        snapshot.coord.cx,
        snapshot.coord.cz,
        snapshot.version,
        faces.len()
    );
    ChunkMesh {
        coord: snapshot.coord,
        version: snapshot.version,
        epoch: 0,
        bbox,
        parts,
        faces,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toroid_blocks::{MaterialId, Voxel};
    use toroid_world::ChunkCoord;

    fn reg() -> MaterialRegistry {
        MaterialRegistry::builtin()
    }

    fn id(name: &str) -> Voxel {
        Voxel::new(reg().id_by_name(name).unwrap())
    }

    fn snapshot_with(voxels: &[((usize, usize, usize), Voxel)]) -> ChunkSnapshot {
        let mut buf = ChunkBuf::from_voxels_local(ChunkCoord::new(1, 2), 4, 8, 4, Vec::new());
        for &((x, y, z), v) in voxels {
            buf.set_local(x, y, z, v);
        }
        ChunkSnapshot {
            coord: buf.coord,
            version: 7,
            buf,
        }
    }

    #[test]
    fn lone_voxel_has_six_faces() {
        let snap = snapshot_with(&[((1, 3, 2), id("rock"))]);
        let borders = NeighborBorders::uniform(snap.coord, 4, 8, Voxel::AIR);
        let mesh = build_chunk_mesh(&snap, &borders, &reg());
        assert_eq!(mesh.face_count(), 6);
        assert_eq!(mesh.version, 7);
        assert_eq!(mesh.triangle_count(), 12);
        // world-space placement from the canonical origin
        assert!(mesh.faces.iter().all(|f| (f.x, f.y, f.z) == (5, 3, 10)));
        assert_eq!(mesh.bbox.min, Vec3::new(5.0, 3.0, 10.0));
    }

    #[test]
    fn floor_has_no_bottom_faces() {
        let snap = snapshot_with(&[((0, 0, 0), id("rock"))]);
        let borders = NeighborBorders::uniform(snap.coord, 4, 8, Voxel::AIR);
        let mesh = build_chunk_mesh(&snap, &borders, &reg());
        assert_eq!(mesh.face_count(), 5);
        assert!(mesh.faces.iter().all(|f| f.face != Face::NegY));
    }

    #[test]
    fn edge_voxel_culls_against_border() {
        let snap = snapshot_with(&[((3, 4, 0), id("rock"))]);
        let borders = NeighborBorders::uniform(snap.coord, 4, 8, id("dirt"));
        let mesh = build_chunk_mesh(&snap, &borders, &reg());
        let faces: Vec<Face> = mesh.faces.iter().map(|f| f.face).collect();
        assert!(!faces.contains(&Face::PosX));
        assert!(!faces.contains(&Face::NegZ));
        assert!(faces.contains(&Face::NegX));
        assert!(faces.contains(&Face::PosZ));
    }

    #[test]
    fn same_class_neighbours_share_no_face() {
        let water = id("water");
        let ice = id("ice");
        let snap = snapshot_with(&[((1, 1, 1), water), ((2, 1, 1), ice), ((1, 2, 1), id("rock"))]);
        let borders = NeighborBorders::uniform(snap.coord, 4, 8, Voxel::AIR);
        let mesh = build_chunk_mesh(&snap, &borders, &reg());
        let has = |x, y, face| {
            mesh.faces
                .iter()
                .any(|f| (f.x - 4, f.y, f.z - 8, f.face) == (x, y, 1, face))
        };
        // water and ice are both translucent
        assert!(!has(1, 1, Face::PosX));
        assert!(!has(2, 1, Face::NegX));
        // water under rock: each side sees a different class
        assert!(has(1, 1, Face::PosY));
        assert!(has(1, 2, Face::NegY));
    }

    #[test]
    fn empty_chunk_builds_empty_mesh() {
        let snap = snapshot_with(&[]);
        let borders = NeighborBorders::uniform(snap.coord, 4, 8, Voxel::new(MaterialId(3)));
        let mesh = build_chunk_mesh(&snap, &borders, &reg());
        assert!(mesh.is_empty());
        assert!(mesh.bbox.is_empty());
    }
}
