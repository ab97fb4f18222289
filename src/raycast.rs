use toroid_geom::Vec3;
use toroid_world::Torus;

/// First solid voxel along a ray. `b*` is the hit voxel, `p*` the empty voxel the ray
/// came from, `n*` the normal of the face it entered through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RayHit {
    pub bx: i32,
    pub by: i32,
    pub bz: i32,
    pub px: i32,
    pub py: i32,
    pub pz: i32,
    pub nx: i32,
    pub ny: i32,
    pub nz: i32,
}

impl RayHit {
    /// Folds the horizontal coordinates back into the canonical range.
    pub fn wrapped(self, torus: &Torus) -> RayHit {
        let (bx, bz) = torus.wrap_xz(self.bx, self.bz);
        let (px, pz) = torus.wrap_xz(self.px, self.pz);
        RayHit { bx, bz, px, pz, ..self }
    }

    /// Voxel an edit should place a block into.
    #[inline]
    pub fn place_target(&self) -> (i32, i32, i32) {
        (self.px, self.py, self.pz)
    }
}

#[inline]
fn inv_or_max(v: f32) -> f32 {
    if v.abs() < 1e-8 { f32::MAX } else { 1.0 / v.abs() }
}

#[inline]
fn step_of(v: f32) -> i32 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

/// Amanatides-Woo voxel walk. Coordinates handed to `is_solid` are unwrapped; the caller
/// decides how space repeats.
pub fn raycast_first_hit_with_face<F>(
    origin: Vec3,
    dir: Vec3,
    max_dist: f32,
    mut is_solid: F,
) -> Option<RayHit>
where
    F: FnMut(i32, i32, i32) -> bool,
{
    let d = dir.try_normalized()?;
    if max_dist.is_nan() || max_dist < 0.0 {
        return None;
    }

    let mut vx = origin.x.floor() as i32;
    let mut vy = origin.y.floor() as i32;
    let mut vz = origin.z.floor() as i32;

    let stepx = step_of(d.x);
    let stepy = step_of(d.y);
    let stepz = step_of(d.z);

    let invx = inv_or_max(d.x);
    let invy = inv_or_max(d.y);
    let invz = inv_or_max(d.z);
    let tdx = if stepx == 0 { f32::MAX } else { invx };
    let tdy = if stepy == 0 { f32::MAX } else { invy };
    let tdz = if stepz == 0 { f32::MAX } else { invz };

    let fx = origin.x - origin.x.floor();
    let fy = origin.y - origin.y.floor();
    let fz = origin.z - origin.z.floor();
    let first = |step: i32, frac: f32, inv: f32| match step {
        1 => (1.0 - frac) * inv,
        -1 => frac * inv,
        _ => f32::MAX,
    };
    let mut tmx = first(stepx, fx, invx);
    let mut tmy = first(stepy, fy, invy);
    let mut tmz = first(stepz, fz, invz);

    let (mut prevx, mut prevy, mut prevz) = (vx, vy, vz);
    let mut t = 0.0f32;
    // each step crosses one voxel boundary; a unit of distance crosses at most three
    let max_steps = (max_dist.min(1.0e6).ceil() as usize + 1) * 3;

    for _ in 0..max_steps {
        if t > max_dist {
            break;
        }
        if is_solid(vx, vy, vz) {
            let (dx, dy, dz) = (vx - prevx, vy - prevy, vz - prevz);
            let (nx, ny, nz) = if dx != 0 {
                (-dx, 0, 0)
            } else if dy != 0 {
                (0, -dy, 0)
            } else if dz != 0 {
                (0, 0, -dz)
            } else {
                (0, 0, 0)
            };
            return Some(RayHit { bx: vx, by: vy, bz: vz, px: prevx, py: prevy, pz: prevz, nx, ny, nz });
        }
        prevx = vx;
        prevy = vy;
        prevz = vz;
        if tmx < tmy {
            if tmx < tmz {
                vx += stepx;
                t = tmx;
                tmx += tdx;
            } else {
                vz += stepz;
                t = tmz;
                tmz += tdz;
            }
        } else if tmy < tmz {
            vy += stepy;
            t = tmy;
            tmy += tdy;
        } else {
            vz += stepz;
            t = tmz;
            tmz += tdz;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor_at(level: i32) -> impl FnMut(i32, i32, i32) -> bool {
        move |_, y, _| y <= level
    }

    #[test]
    fn straight_down_hits_top_face() {
        let hit = raycast_first_hit_with_face(
            Vec3::new(2.5, 10.5, 2.5),
            Vec3::new(0.0, -1.0, 0.0),
            32.0,
            floor_at(4),
        )
        .unwrap();
        assert_eq!((hit.bx, hit.by, hit.bz), (2, 4, 2));
        assert_eq!((hit.nx, hit.ny, hit.nz), (0, 1, 0));
        assert_eq!(hit.place_target(), (2, 5, 2));
    }

    #[test]
    fn stops_at_max_distance() {
        let hit = raycast_first_hit_with_face(
            Vec3::new(0.5, 10.5, 0.5),
            Vec3::new(0.0, -1.0, 0.0),
            3.0,
            floor_at(4),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn zero_direction_misses() {
        let hit = raycast_first_hit_with_face(Vec3::new(0.5, 0.5, 0.5), Vec3::ZERO, 8.0, |_, _, _| true);
        assert!(hit.is_none());
    }

    #[test]
    fn starting_inside_solid_reports_origin_voxel() {
        let hit = raycast_first_hit_with_face(
            Vec3::new(1.5, 1.5, 1.5),
            Vec3::new(1.0, 0.0, 0.0),
            4.0,
            |_, _, _| true,
        )
        .unwrap();
        assert_eq!((hit.bx, hit.by, hit.bz), (1, 1, 1));
        assert_eq!((hit.nx, hit.ny, hit.nz), (0, 0, 0));
    }

    #[test]
    fn sideways_hit_reports_entry_face() {
        let hit = raycast_first_hit_with_face(
            Vec3::new(0.5, 0.5, 0.5),
            Vec3::new(-1.0, 0.0, 0.0),
            16.0,
            |x, _, _| x == -3,
        )
        .unwrap();
        assert_eq!(hit.bx, -3);
        assert_eq!((hit.nx, hit.ny, hit.nz), (1, 0, 0));
        let torus = Torus::new(8, 8);
        let w = hit.wrapped(&torus);
        assert_eq!((w.bx, w.px), (5, 6));
    }
}
