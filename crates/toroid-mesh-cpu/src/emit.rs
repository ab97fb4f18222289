use std::collections::HashMap;

use toroid_blocks::MaterialId;
use toroid_geom::Vec3;

use crate::face::Face;
use crate::mesh_build::MeshBuild;

/// Destination for per-material geometry.
pub trait BuildSink {
    fn get_build_mut(&mut self, mid: MaterialId) -> &mut MeshBuild;
}

impl BuildSink for HashMap<MaterialId, MeshBuild> {
    #[inline]
    fn get_build_mut(&mut self, mid: MaterialId) -> &mut MeshBuild {
        self.entry(mid).or_insert_with(|| {
            let mut mb = MeshBuild::default();
            // Lazy small reserve when a material is first used in a chunk
            mb.reserve_quads(64);
            mb
        })
    }
}

/// Emits a unit face of the voxel whose minimum corner is `min`.
#[inline]
pub(crate) fn emit_voxel_face(
    builds: &mut impl BuildSink,
    mid: MaterialId,
    face: Face,
    min: Vec3,
    rgba: [u8; 4],
) {
    let origin = match face {
        Face::PosY => min + Vec3::new(0.0, 1.0, 0.0),
        Face::PosX => min + Vec3::new(1.0, 0.0, 0.0),
        Face::PosZ => min + Vec3::new(0.0, 0.0, 1.0),
        Face::NegY | Face::NegX | Face::NegZ => min,
    };
    builds
        .get_build_mut(mid)
        .add_face_rect(face, origin, 1.0, 1.0, rgba);
}
