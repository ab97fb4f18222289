use std::collections::VecDeque;

use rand::Rng;
use rayon::prelude::*;

use crate::config::{TectonicParams, WorldParams};
use crate::torus::Torus;

use super::PlateField;
use super::boundary::{BoundaryKind, resolve_cell};
use super::noise::{TileableNoise, noise_seed};
use super::plate::{Plate, spawn_plates};

const ELEVATION_LIMIT: f32 = 2.0;

/// Mutable state for one tectonic run. Dropped when generation returns.
pub struct SimContext {
    params: TectonicParams,
    torus: Torus,
    plates: Vec<Plate>,
    /// Static per-column offset applied before the nearest-centroid search.
    warp: Vec<[f32; 2]>,
    roughness: TileableNoise,
    owner: Vec<u16>,
    elevation: Vec<f32>,
    scratch: Vec<f32>,
    step: u32,
}

impl SimContext {
    pub fn new<R: Rng>(params: &WorldParams, rng: &mut R) -> Self {
        let torus = params.torus();
        let t = params.tectonics;
        let plates = spawn_plates(params, rng);
        let spacing = (torus.cells() as f32 / plates.len().max(1) as f32).sqrt();
        let amplitude = t.warp_strength * spacing;
        let warp_x = TileableNoise::new(noise_seed(params.seed, 0x5A17_0001), t.warp_frequency, torus);
        let warp_z = TileableNoise::new(noise_seed(params.seed, 0x5A17_0002), t.warp_frequency, torus);
        let warp = (0..torus.cells())
            .map(|i| {
                let (x, z) = torus.coords(i);
                let (x, z) = (x as f32, z as f32);
                [
                    warp_x.sample(x, z) * amplitude,
                    warp_z.sample(x, z) * amplitude,
                ]
            })
            .collect();
        let roughness = TileableNoise::new(
            noise_seed(params.seed, 0x7E11_0003),
            t.roughness_frequency,
            torus,
        );
        let mut ctx = Self {
            params: t,
            torus,
            plates,
            warp,
            roughness,
            owner: vec![0; torus.cells()],
            elevation: vec![0.0; torus.cells()],
            scratch: vec![0.0; torus.cells()],
            step: 0,
        };
        ctx.assign_cells();
        for (e, &id) in ctx.elevation.iter_mut().zip(&ctx.owner) {
            *e = ctx.plates[id as usize].bias;
        }
        ctx
    }

    pub fn step(&mut self) {
        self.advance_plates();
        self.assign_cells();
        self.apply_boundaries();
        self.relax_isostasy();
        self.diffuse();
        self.step += 1;
        log::debug!(
            target: "worldgen",
            "tectonic step {}: mean elevation {:.3}",
            self.step,
            self.elevation.iter().sum::<f32>() / self.elevation.len() as f32
        );
    }

    fn advance_plates(&mut self) {
        let dt = self.params.dt;
        for p in &mut self.plates {
            let moved = [
                p.centroid[0] + p.velocity[0] * dt,
                p.centroid[1] + p.velocity[1] * dt,
            ];
            p.centroid = self.torus.wrap_point(moved);
        }
    }

    /// Nearest centroid by toroidal distance from the warped column position.
    fn assign_cells(&mut self) {
        let torus = self.torus;
        let plates = &self.plates;
        let warp = &self.warp;
        let w = torus.width as usize;
        self.owner
            .par_chunks_mut(w)
            .enumerate()
            .for_each(|(z, row)| {
                for (x, slot) in row.iter_mut().enumerate() {
                    let [ox, oz] = warp[z * w + x];
                    let p = [x as f32 + ox, z as f32 + oz];
                    *slot = nearest_plate(plates, &torus, p);
                }
            });
    }

    fn apply_boundaries(&mut self) {
        let torus = self.torus;
        let params = self.params;
        let plates = &self.plates;
        let owner = &self.owner;
        let elevation = &self.elevation;
        let w = torus.width as usize;
        self.scratch
            .par_chunks_mut(w)
            .enumerate()
            .for_each(|(z, row)| {
                for (x, out) in row.iter_mut().enumerate() {
                    let i = z * w + x;
                    let delta = resolve_cell(&torus, owner, plates, &params, x as i32, z as i32)
                        .map_or(0.0, |(_, effect)| effect * params.dt);
                    *out = (elevation[i] + delta).clamp(-ELEVATION_LIMIT, ELEVATION_LIMIT);
                }
            });
        std::mem::swap(&mut self.elevation, &mut self.scratch);
    }

    fn relax_isostasy(&mut self) {
        let k = self.params.isostasy;
        let plates = &self.plates;
        self.elevation
            .par_iter_mut()
            .zip(self.owner.par_iter())
            .for_each(|(e, &id)| {
                *e += (plates[id as usize].bias - *e) * k;
            });
    }

    /// Moves each column toward its wrapped 4-neighbour mean, reading only the previous buffer.
    fn diffuse(&mut self) {
        let torus = self.torus;
        let k = self.params.diffusion;
        let elevation = &self.elevation;
        let w = torus.width as usize;
        self.scratch
            .par_chunks_mut(w)
            .enumerate()
            .for_each(|(z, row)| {
                for (x, out) in row.iter_mut().enumerate() {
                    let e = elevation[z * w + x];
                    let sum: f32 = torus
                        .neighbors4(x as i32, z as i32)
                        .iter()
                        .map(|&(nx, nz)| elevation[torus.index(nx, nz)])
                        .sum();
                    *out = e + k * (sum * 0.25 - e);
                }
            });
        std::mem::swap(&mut self.elevation, &mut self.scratch);
    }

    /// Final boundary pass, distance field, and roughness. Returns normalized elevation.
    pub fn finish(self) -> (Vec<f32>, PlateField) {
        let torus = self.torus;
        let cells = torus.cells();
        let mut boundary: Vec<Option<BoundaryKind>> = vec![None; cells];
        boundary.par_iter_mut().enumerate().for_each(|(i, b)| {
            let (x, z) = torus.coords(i);
            *b = resolve_cell(&torus, &self.owner, &self.plates, &self.params, x, z)
                .map(|(kind, _)| kind);
        });
        let distance = boundary_distance(&torus, &boundary, self.params.boundary_distance_cap);

        let amp = self.params.roughness;
        let mut elevation = self.elevation;
        let roughness = &self.roughness;
        elevation.par_iter_mut().enumerate().for_each(|(i, e)| {
            let (x, z) = torus.coords(i);
            *e += roughness.sample(x as f32, z as f32) * amp;
        });

        let field = PlateField {
            torus,
            plates: self.plates,
            owner: self.owner,
            boundary,
            distance,
        };
        (elevation, field)
    }
}

/// Lowest id wins ties.
fn nearest_plate(plates: &[Plate], torus: &Torus, p: [f32; 2]) -> u16 {
    let mut best = 0u16;
    let mut best_d = f32::INFINITY;
    for plate in plates {
        let d = torus.distance_sq(p, plate.centroid);
        if d < best_d {
            best_d = d;
            best = plate.id;
        }
    }
    best
}

/// Multi-source BFS on the torus from every boundary column.
fn boundary_distance(torus: &Torus, boundary: &[Option<BoundaryKind>], cap: u16) -> Vec<u16> {
    let mut dist = vec![cap; boundary.len()];
    let mut queue = VecDeque::new();
    for (i, b) in boundary.iter().enumerate() {
        if b.is_some() {
            dist[i] = 0;
            queue.push_back(i);
        }
    }
    while let Some(i) = queue.pop_front() {
        let next = dist[i] + 1;
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
