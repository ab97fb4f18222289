//! Toroidal addressing. Every horizontal coordinate in the workspace is normalized here.

/// Floor-modulo of `v` into `[0, period)`.
#[inline]
pub fn wrap(v: i32, period: i32) -> i32 {
    debug_assert!(period > 0);
    v.rem_euclid(period)
}

/// Continuous counterpart of [`wrap`] for plate centroids and warped sample points.
#[inline]
pub fn wrap_f32(v: f32, period: f32) -> f32 {
    let r = v.rem_euclid(period);
    // rem_euclid can round up to `period` for tiny negative inputs
    if r >= period { 0.0 } else { r }
}

/// Signed shortest displacement from `a` to `b` on a circle of length `period`.
#[inline]
pub fn delta_f32(a: f32, b: f32, period: f32) -> f32 {
    let d = wrap_f32(b - a, period);
    if d > period * 0.5 { d - period } else { d }
}

/// The horizontal `W x D` grid. Columns are stored row-major with `z` as the row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Torus {
    pub width: i32,
    pub depth: i32,
}

impl Torus {
    #[inline]
    pub const fn new(width: i32, depth: i32) -> Self {
        Self { width, depth }
    }

    #[inline]
    pub fn wrap_x(&self, x: i32) -> i32 {
        wrap(x, self.width)
    }

    #[inline]
    pub fn wrap_z(&self, z: i32) -> i32 {
        wrap(z, self.depth)
    }

    #[inline]
    pub fn wrap_xz(&self, x: i32, z: i32) -> (i32, i32) {
        (self.wrap_x(x), self.wrap_z(z))
    }

    /// Flat index of the column at `(x, z)` after wrapping.
    #[inline]
    pub fn index(&self, x: i32, z: i32) -> usize {
        let (x, z) = self.wrap_xz(x, z);
        (z as usize) * (self.width as usize) + (x as usize)
    }

    #[inline]
    pub fn coords(&self, idx: usize) -> (i32, i32) {
        let w = self.width as usize;
        ((idx % w) as i32, (idx / w) as i32)
    }

    #[inline]
    pub fn cells(&self) -> usize {
        (self.width as usize) * (self.depth as usize)
    }

    /// The four wrapped face neighbours in +x, -x, +z, -z order.
    #[inline]
    pub fn neighbors4(&self, x: i32, z: i32) -> [(i32, i32); 4] {
        [
            self.wrap_xz(x + 1, z),
            self.wrap_xz(x - 1, z),
            self.wrap_xz(x, z + 1),
            self.wrap_xz(x, z - 1),
        ]
    }

    /// Shortest displacement from `a` to `b` along both axes.
    #[inline]
    pub fn delta(&self, a: [f32; 2], b: [f32; 2]) -> [f32; 2] {
        [
            delta_f32(a[0], b[0], self.width as f32),
            delta_f32(a[1], b[1], self.depth as f32),
        ]
    }

    #[inline]
    pub fn distance_sq(&self, a: [f32; 2], b: [f32; 2]) -> f32 {
        let [dx, dz] = self.delta(a, b);
        dx * dx + dz * dz
    }

    #[inline]
    pub fn wrap_point(&self, p: [f32; 2]) -> [f32; 2] {
        [
            wrap_f32(p[0], self.width as f32),
            wrap_f32(p[1], self.depth as f32),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_is_floor_modulo() {
        assert_eq!(wrap(-1, 64), 63);
        assert_eq!(wrap(64, 64), 0);
        assert_eq!(wrap(-129, 64), 63);
        assert_eq!(wrap(5, 64), 5);
    }

    #[test]
    fn delta_takes_the_short_way_round() {
        assert_eq!(delta_f32(1.0, 63.0, 64.0), -2.0);
        assert_eq!(delta_f32(63.0, 1.0, 64.0), 2.0);
        assert_eq!(delta_f32(10.0, 20.0, 64.0), 10.0);
    }

    #[test]
    fn neighbors_cross_the_seam() {
        let t = Torus::new(8, 4);
        let n = t.neighbors4(7, 0);
        assert_eq!(n[0], (0, 0));
        assert_eq!(n[3], (7, 3));
        assert_eq!(t.index(-1, -1), t.index(7, 3));
    }
}
