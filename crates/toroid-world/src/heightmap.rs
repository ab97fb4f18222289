use crate::torus::Torus;

/// Column elevations in voxel layers, indexed toroidally. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct Heightmap {
    torus: Torus,
    height: u32,
    sea_level: u32,
    data: Vec<f32>,
}

impl Heightmap {
    /// Wraps raw layer elevations; values are clamped to `[0, height - 1]`.
    pub fn from_elevations(torus: Torus, height: u32, sea_level: u32, mut data: Vec<f32>) -> Self {
        debug_assert_eq!(data.len(), torus.cells());
        let top = (height.saturating_sub(1)) as f32;
        for e in &mut data {
            *e = e.clamp(0.0, top);
        }
        Self {
            torus,
            height,
            sea_level,
            data,
        }
    }

    /// Maps normalized tectonic elevation (0 = sea level) onto voxel layers.
    pub fn from_normalized(torus: Torus, height: u32, sea_level: u32, normalized: &[f32]) -> Self {
        let data = normalized
            .iter()
            .map(|&e| normalized_to_layers(e, height, sea_level))
            .collect();
        Self::from_elevations(torus, height, sea_level, data)
    }

    pub fn flat(torus: Torus, height: u32, sea_level: u32, elevation: f32) -> Self {
        Self::from_elevations(torus, height, sea_level, vec![elevation; torus.cells()])
    }

    #[inline]
    pub fn torus(&self) -> Torus {
        self.torus
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn sea_level(&self) -> u32 {
        self.sea_level
    }

    #[inline]
    pub fn get(&self, x: i32, z: i32) -> f32 {
        self.data[self.torus.index(x, z)]
    }

    /// Topmost solid layer of the column.
    #[inline]
    pub fn surface(&self, x: i32, z: i32) -> i32 {
        surface_of(self.get(x, z), self.height)
    }

    #[inline]
    pub fn surface_at(&self, idx: usize) -> i32 {
        surface_of(self.data[idx], self.height)
    }

    #[inline]
    pub fn is_underwater(&self, x: i32, z: i32) -> bool {
        self.surface(x, z) < self.sea_level as i32
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn min_max(&self) -> (f32, f32) {
        self.data
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &e| {
                (lo.min(e), hi.max(e))
            })
    }
}

#[inline]
pub fn surface_of(elevation: f32, height: u32) -> i32 {
    let top = height.saturating_sub(1) as i32;
    (elevation.round() as i32).clamp(0, top)
}

pub fn normalized_to_layers(e: f32, height: u32, sea_level: u32) -> f32 {
    let sea = sea_level as f32;
    let top = height.saturating_sub(1) as f32;
    let layers = if e >= 0.0 {
        sea + e * (top - sea)
    } else {
        sea + e * sea
    };
    layers.clamp(0.0, top)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_zero_is_sea_level() {
        assert_eq!(normalized_to_layers(0.0, 32, 12), 12.0);
        assert_eq!(normalized_to_layers(1.0, 32, 12), 31.0);
        assert_eq!(normalized_to_layers(-1.0, 32, 12), 0.0);
        assert_eq!(normalized_to_layers(5.0, 32, 12), 31.0);
    }

    #[test]
    fn lookups_wrap() {
        let t = Torus::new(4, 4);
        let mut data = vec![0.0; 16];
        data[t.index(3, 0)] = 7.4;
        let hm = Heightmap::from_elevations(t, 16, 4, data);
        assert_eq!(hm.surface(-1, 4), 7);
        assert!(hm.is_underwater(0, 0));
        assert!(!hm.is_underwater(3, 0));
    }
}
