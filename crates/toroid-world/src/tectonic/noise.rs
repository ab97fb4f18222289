use fastnoise_lite::{FastNoiseLite, NoiseType};

use crate::torus::{Torus, wrap_f32};

/// 2D noise that repeats exactly with the world's period.
///
/// Samples are blended from the four periodic images of the point, weighted by
/// its position inside the period.
pub(crate) struct TileableNoise {
    noise: FastNoiseLite,
    width: f32,
    depth: f32,
}

impl TileableNoise {
    /// `features` is the rough number of noise cells across the world width.
    pub(crate) fn new(seed: i32, features: f32, torus: Torus) -> Self {
        let mut noise = FastNoiseLite::with_seed(seed);
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        noise.set_frequency(Some(features / torus.width as f32));
        Self {
            noise,
            width: torus.width as f32,
            depth: torus.depth as f32,
        }
    }

    pub(crate) fn sample(&self, x: f32, z: f32) -> f32 {
        let (w, d) = (self.width, self.depth);
        let x = wrap_f32(x, w);
        let z = wrap_f32(z, d);
        let u = x / w;
        let v = z / d;
        let a = self.noise.get_noise_2d(x, z);
        let b = self.noise.get_noise_2d(x - w, z);
        let c = self.noise.get_noise_2d(x, z - d);
        let e = self.noise.get_noise_2d(x - w, z - d);
        lerp(lerp(a, b, u), lerp(c, e, u), v)
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Derives a per-layer noise seed from the world seed.
pub(crate) fn noise_seed(seed: u64, salt: u32) -> i32 {
    let folded = (seed ^ (seed >> 32)) as u32;
    (folded ^ salt) as i32
}
