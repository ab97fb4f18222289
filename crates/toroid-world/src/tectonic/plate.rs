use rand::Rng;

use crate::config::WorldParams;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlateKind {
    Oceanic,
    Continental,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plate {
    pub id: u16,
    /// Position on the torus in column units, always wrapped.
    pub centroid: [f32; 2],
    /// Columns per simulation step.
    pub velocity: [f32; 2],
    pub kind: PlateKind,
    /// Normalized elevation the plate relaxes toward.
    pub bias: f32,
}

/// Creates plates in id order from the seeded generator.
pub(crate) fn spawn_plates<R: Rng>(params: &WorldParams, rng: &mut R) -> Vec<Plate> {
    let t = &params.tectonics;
    let (w, d) = (params.width as f32, params.depth as f32);
    (0..t.plate_count)
        .map(|id| {
            let centroid = [rng.gen_range(0.0..w), rng.gen_range(0.0..d)];
            let heading = rng.gen_range(0.0..std::f32::consts::TAU);
            let speed = rng.gen_range(t.speed_min..=t.speed_max);
            let kind = if rng.gen_bool(f64::from(t.continental_ratio)) {
                PlateKind::Continental
            } else {
                PlateKind::Oceanic
            };
            let jitter = rng.gen_range(-t.bias_jitter..=t.bias_jitter);
            let base = match kind {
                PlateKind::Continental => t.continental_bias,
                PlateKind::Oceanic => t.oceanic_bias,
            };
            Plate {
                id: id as u16,
                centroid,
                velocity: [heading.cos() * speed, heading.sin() * speed],
                kind,
                bias: base + jitter,
            }
        })
        .collect()
}
