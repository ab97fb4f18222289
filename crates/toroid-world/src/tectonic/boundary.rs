use crate::config::TectonicParams;
use crate::torus::Torus;

use super::plate::{Plate, PlateKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoundaryKind {
    /// Plates closing on each other.
    Convergent,
    /// Plates pulling apart.
    Divergent,
    /// Plates sliding past each other.
    Transform,
}

/// Classifies the contact between plate `a` and plate `b`.
///
/// The relative velocity of `a` with respect to `b` is projected onto the toroidal
/// displacement from `a`'s centroid to `b`'s. A positive projection means the plates
/// close on each other. Small projections relative to the sliding speed count as transform.
pub fn classify_pair(a: &Plate, b: &Plate, torus: &Torus) -> BoundaryKind {
    let [nx, nz] = torus.delta(a.centroid, b.centroid);
    let len = (nx * nx + nz * nz).sqrt();
    if len < 1e-6 {
        return BoundaryKind::Transform;
    }
    let (nx, nz) = (nx / len, nz / len);
    let rel = [a.velocity[0] - b.velocity[0], a.velocity[1] - b.velocity[1]];
    let rel_speed = (rel[0] * rel[0] + rel[1] * rel[1]).sqrt();
    if rel_speed < 1e-6 {
        return BoundaryKind::Transform;
    }
    let closing = rel[0] * nx + rel[1] * nz;
    let threshold = 0.005_f32.max(rel_speed * 0.02);
    if closing > threshold {
        BoundaryKind::Convergent
    } else if closing < -threshold {
        BoundaryKind::Divergent
    } else {
        BoundaryKind::Transform
    }
}

/// Elevation change per unit time on `own`'s side of a contact with `other`.
pub(crate) fn boundary_effect(
    own: &Plate,
    other: &Plate,
    kind: BoundaryKind,
    t: &TectonicParams,
) -> f32 {
    match kind {
        BoundaryKind::Convergent => match (own.kind, other.kind) {
            (PlateKind::Continental, PlateKind::Continental) => t.convergent_uplift,
            (PlateKind::Continental, PlateKind::Oceanic) => t.convergent_uplift * 0.6,
            // subducting side
            (PlateKind::Oceanic, PlateKind::Continental) => -t.trench_depth,
            (PlateKind::Oceanic, PlateKind::Oceanic) => t.convergent_uplift * 0.35,
        },
        BoundaryKind::Divergent => -t.divergent_subsidence,
        BoundaryKind::Transform => 0.0,
    }
}

/// Combines every contact a column has with foreign plates.
///
/// The largest uplift wins. Without uplift the deepest subsidence wins. Equal
/// effects keep the first neighbour in `+x, -x, +z, -z` order.
pub(crate) fn resolve_cell(
    torus: &Torus,
    owner: &[u16],
    plates: &[Plate],
    t: &TectonicParams,
    x: i32,
    z: i32,
) -> Option<(BoundaryKind, f32)> {
    let own = &plates[owner[torus.index(x, z)] as usize];
    let mut best_up: Option<(BoundaryKind, f32)> = None;
    let mut best_down: Option<(BoundaryKind, f32)> = None;
    let mut any = false;
    for (nx, nz) in torus.neighbors4(x, z) {
        let other_id = owner[torus.index(nx, nz)];
        if other_id == own.id {
            continue;
        }
        any = true;
        let other = &plates[other_id as usize];
        let kind = classify_pair(own, other, torus);
        let effect = boundary_effect(own, other, kind, t);
        if effect > 0.0 && best_up.is_none_or(|(_, e)| effect > e) {
            best_up = Some((kind, effect));
        } else if effect < 0.0 && best_down.is_none_or(|(_, e)| effect < e) {
            best_down = Some((kind, effect));
        }
    }
    best_up
        .or(best_down)
        .or(any.then_some((BoundaryKind::Transform, 0.0)))
}
