//! Climate bands derived from the heightmap.

use std::collections::VecDeque;

use crate::config::ClimateParams;
use crate::heightmap::Heightmap;
use crate::torus::Torus;

/// Material band, in evaluation priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Band {
    DeepOcean,
    Ocean,
    Beach,
    Snow,
    Rock,
    Tundra,
    Desert,
    Forest,
    Grassland,
}

/// Surface layering for a band.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BandProfile {
    pub surface: &'static str,
    pub subsurface: &'static str,
    /// Layers from the surface (inclusive) down to where rock starts.
    pub depth: u8,
}

impl Band {
    pub const ALL: [Band; 9] = [
        Band::DeepOcean,
        Band::Ocean,
        Band::Beach,
        Band::Snow,
        Band::Rock,
        Band::Tundra,
        Band::Desert,
        Band::Forest,
        Band::Grassland,
    ];

    pub fn profile(self) -> BandProfile {
        let (surface, subsurface, depth) = match self {
            Band::DeepOcean => ("gravel", "rock", 2),
            Band::Ocean => ("sand", "gravel", 3),
            Band::Beach => ("sand", "sand", 4),
            Band::Snow => ("snow", "rock", 1),
            Band::Rock => ("rock", "rock", 1),
            Band::Tundra => ("gravel", "dirt", 2),
            Band::Desert => ("sand", "sand", 5),
            Band::Forest => ("grass", "dirt", 4),
            Band::Grassland => ("grass", "dirt", 3),
        };
        BandProfile {
            surface,
            subsurface,
            depth,
        }
    }

    /// One-character tag for text maps.
    pub fn glyph(self) -> char {
        match self {
            Band::DeepOcean => '~',
            Band::Ocean => '-',
            Band::Beach => '.',
            Band::Snow => '*',
            Band::Rock => '^',
            Band::Tundra => ':',
            Band::Desert => '_',
            Band::Forest => '#',
            Band::Grassland => ',',
        }
    }

    #[inline]
    pub fn is_water(self) -> bool {
        matches!(self, Band::DeepOcean | Band::Ocean)
    }
}

/// Per-column band and climate signals. Same indexing as the heightmap.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialField {
    torus: Torus,
    bands: Vec<Band>,
    moisture: Vec<f32>,
    temperature: Vec<f32>,
    water_distance: Vec<u16>,
    freeze_temperature: f32,
}

impl MaterialField {
    #[inline]
    pub fn band(&self, x: i32, z: i32) -> Band {
        self.bands[self.torus.index(x, z)]
    }

    #[inline]
    pub fn moisture(&self, x: i32, z: i32) -> f32 {
        self.moisture[self.torus.index(x, z)]
    }

    #[inline]
    pub fn temperature(&self, x: i32, z: i32) -> f32 {
        self.temperature[self.torus.index(x, z)]
    }

    #[inline]
    pub fn water_distance(&self, x: i32, z: i32) -> u16 {
        self.water_distance[self.torus.index(x, z)]
    }

    /// Whether standing water on this column freezes at the top.
    #[inline]
    pub fn is_frozen(&self, x: i32, z: i32) -> bool {
        self.temperature(x, z) < self.freeze_temperature
    }

    pub fn band_counts(&self) -> [(Band, usize); 9] {
        let mut counts = Band::ALL.map(|b| (b, 0usize));
        for b in &self.bands {
            counts[*b as usize].1 += 1;
        }
        counts
    }
}

/// Assigns every column the first band whose rule matches. Pure, deterministic.
pub fn classify(hm: &Heightmap, params: &ClimateParams) -> MaterialField {
    let torus = hm.torus();
    let cells = torus.cells();
    let sea = hm.sea_level() as i32;
    let top = hm.height() as i32 - 1;
    let land_range = (top - sea).max(1) as f32;
    let snow_line = sea + (params.snow_height * land_range).round() as i32;
    let rock_line = sea + (params.rock_height * land_range).round() as i32;

    let water_distance = water_distance(hm, params.water_distance_cap);
    let any_water = water_distance.contains(&0);

    let mut bands = Vec::with_capacity(cells);
    let mut moisture = Vec::with_capacity(cells);
    let mut temperature = Vec::with_capacity(cells);
    for i in 0..cells {
        let (x, z) = torus.coords(i);
        let surface = hm.surface_at(i);
        let slope = torus
            .neighbors4(x, z)
            .iter()
            .map(|&(nx, nz)| (hm.surface(nx, nz) - surface).unsigned_abs())
            .max()
            .unwrap_or(0);
        let dist = water_distance[i];
        let m = if any_water {
            (-(f32::from(dist)) / params.moisture_range).exp()
        } else {
            0.0
        };
        let phase = std::f32::consts::TAU * z as f32 / torus.depth as f32;
        let latitude = 0.5 - 0.5 * phase.cos();
        let t = latitude - params.lapse * (surface - sea).max(0) as f32 / land_range;

        let underwater = surface < sea;
        let band = if underwater && (sea - surface) as u32 > params.deep_ocean_depth {
            Band::DeepOcean
        } else if underwater {
            Band::Ocean
        } else if surface <= sea + params.beach_height as i32 && dist <= params.beach_width {
            Band::Beach
        } else if surface >= snow_line || (t < params.tundra_temperature && surface >= rock_line) {
            Band::Snow
        } else if slope >= params.rock_slope || surface >= rock_line {
            Band::Rock
        } else if t < params.tundra_temperature {
            Band::Tundra
        } else if m < params.desert_moisture {
            Band::Desert
        } else if m >= params.forest_moisture {
            Band::Forest
        } else {
            Band::Grassland
        };
        bands.push(band);
        moisture.push(m);
        temperature.push(t);
    }

    MaterialField {
        torus,
        bands,
        moisture,
        temperature,
        water_distance,
        freeze_temperature: params.freeze_temperature,
    }
}

/// Steps from each column to the nearest underwater column, saturating at `cap`.
fn water_distance(hm: &Heightmap, cap: u16) -> Vec<u16> {
    let torus = hm.torus();
    let sea = hm.sea_level() as i32;
    let mut dist = vec![cap; torus.cells()];
    let mut queue = VecDeque::new();
    for (i, d) in dist.iter_mut().enumerate() {
        if hm.surface_at(i) < sea {
            *d = 0;
            queue.push_back(i);
        }
    }
    while let Some(i) = queue.pop_front() {
        let next = dist[i].saturating_add(1);
        if next >= cap {
            continue;
        }
        let (x, z) = torus.coords(i);
        for (nx, nz) in torus.neighbors4(x, z) {
            let j = torus.index(nx, nz);
            if dist[j] > next {
                dist[j] = next;
                queue.push_back(j);
            }
        }
    }
    dist
}
