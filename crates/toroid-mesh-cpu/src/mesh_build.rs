use toroid_geom::Vec3;

use crate::face::Face;

/// Vertex streams for one material: positions and normals (xyz), RGBA colours, u32 indices.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct MeshBuild {
    pub pos: Vec<f32>,
    pub norm: Vec<f32>,
    pub idx: Vec<u32>,
    pub col: Vec<u8>,
}

impl MeshBuild {
    /// Pre-reserve capacity for approximately `n_quads` quads worth of data.
    #[inline]
    pub fn reserve_quads(&mut self, n_quads: usize) {
        // 4 vertices per quad
        self.pos.reserve(n_quads * 4 * 3);
        self.norm.reserve(n_quads * 4 * 3);
        self.col.reserve(n_quads * 4 * 4);
        self.idx.reserve(n_quads * 6);
    }

    /// Appends a quad as two triangles, wound counter-clockwise around `n`.
    pub fn add_quad(&mut self, a: Vec3, b: Vec3, c: Vec3, d: Vec3, n: Vec3, rgba: [u8; 4]) {
        let base = (self.pos.len() / 3) as u32;
        let mut vs = [a, d, c, b];
        let cross = (vs[1] - vs[0]).cross(vs[2] - vs[0]);
        if cross.dot(n) < 0.0 {
            vs.swap(1, 3);
        }
        for v in vs {
            self.pos.extend_from_slice(&[v.x, v.y, v.z]);
            self.norm.extend_from_slice(&[n.x, n.y, n.z]);
            self.col.extend_from_slice(&rgba);
        }
        self.idx
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    /// Emits a face-aligned rectangle for the given face at `origin` with size `(u1,v1)`.
    pub fn add_face_rect(&mut self, face: Face, origin: Vec3, u1: f32, v1: f32, rgba: [u8; 4]) {
        let o = origin;
        let (a, b, c, d) = match face {
            Face::PosY => (
                o,
                o + Vec3::new(u1, 0.0, 0.0),
                o + Vec3::new(u1, 0.0, v1),
                o + Vec3::new(0.0, 0.0, v1),
            ),
            Face::NegY => (
                o + Vec3::new(0.0, 0.0, v1),
                o + Vec3::new(u1, 0.0, v1),
                o + Vec3::new(u1, 0.0, 0.0),
                o,
            ),
            Face::PosX => (
                o + Vec3::new(0.0, v1, u1),
                o + Vec3::new(0.0, v1, 0.0),
                o,
                o + Vec3::new(0.0, 0.0, u1),
            ),
            Face::NegX => (
                o + Vec3::new(0.0, v1, 0.0),
                o + Vec3::new(0.0, v1, u1),
                o + Vec3::new(0.0, 0.0, u1),
                o,
            ),
            Face::PosZ => (
                o + Vec3::new(u1, v1, 0.0),
                o + Vec3::new(0.0, v1, 0.0),
                o,
                o + Vec3::new(u1, 0.0, 0.0),
            ),
            Face::NegZ => (
                o + Vec3::new(0.0, v1, 0.0),
                o + Vec3::new(u1, v1, 0.0),
                o + Vec3::new(u1, 0.0, 0.0),
                o,
            ),
        };
        self.add_quad(a, b, c, d, face.normal(), rgba);
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.idx.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.idx.is_empty()
    }
}
