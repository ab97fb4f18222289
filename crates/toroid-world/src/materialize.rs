//! Turns one column of the 2D field into `H` voxels.

use toroid_blocks::{MaterialRegistry, Voxel};

use crate::classify::Band;
use crate::error::ConfigError;
use crate::heightmap::surface_of;
use crate::torus::Torus;

/// Material ids the materializer needs, resolved once per generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub rock: Voxel,
    pub water: Voxel,
    pub ice: Voxel,
    bands: [(Voxel, Voxel); 9],
}

impl Palette {
    pub fn resolve(reg: &MaterialRegistry) -> Result<Self, ConfigError> {
        let lookup = |name: &str| {
            reg.id_by_name(name)
                .map(Voxel::new)
                .ok_or_else(|| ConfigError::MissingMaterial(name.to_string()))
        };
        let mut bands = [(Voxel::AIR, Voxel::AIR); 9];
        for band in Band::ALL {
            let p = band.profile();
            bands[band as usize] = (lookup(p.surface)?, lookup(p.subsurface)?);
        }
        Ok(Self {
            rock: lookup("rock")?,
            water: lookup("water")?,
            ice: lookup("ice")?,
            bands,
        })
    }

    /// Surface and subsurface voxels for a band.
    #[inline]
    pub fn band(&self, band: Band) -> (Voxel, Voxel) {
        self.bands[band as usize]
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ColumnCtx {
    pub height: u32,
    pub sea_level: u32,
    pub palette: Palette,
}

/// Everything a column needs from the 2D field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnSample {
    pub band: Band,
    pub elevation: f32,
    pub frozen: bool,
}

/// Fills `out[y]` for `y` in `0..H`. Depends only on the sample, so columns are independent.
pub fn materialize_column(sample: ColumnSample, ctx: &ColumnCtx, out: &mut [Voxel]) {
    debug_assert_eq!(out.len(), ctx.height as usize);
    let surface = surface_of(sample.elevation, ctx.height);
    let depth = i32::from(sample.band.profile().depth.max(1));
    let (top, sub) = ctx.palette.band(sample.band);
    let sea = ctx.sea_level as i32;
    for (y, v) in out.iter_mut().enumerate() {
        let y = y as i32;
        *v = if y == 0 || y <= surface - depth {
            ctx.palette.rock
        } else if y < surface {
            sub
        } else if y == surface {
            top
        } else if y <= sea {
            if sample.frozen && y == sea {
                ctx.palette.ice
            } else {
                ctx.palette.water
            }
        } else {
            Voxel::AIR
        };
    }
}

/// Whole-world voxel volume, column-major (`y` fastest).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Volume {
    pub torus: Torus,
    pub height: u32,
    pub data: Vec<Voxel>,
}

impl Volume {
    /// `None` when `y` is outside `[0, H)`; `x` and `z` wrap.
    pub fn get(&self, x: i32, y: i32, z: i32) -> Option<Voxel> {
        if y < 0 || y >= self.height as i32 {
            return None;
        }
        let col = self.torus.index(x, z);
        Some(self.data[col * self.height as usize + y as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ColumnCtx {
        ColumnCtx {
            height: 16,
            sea_level: 8,
            palette: Palette::resolve(&MaterialRegistry::builtin()).unwrap(),
        }
    }

    #[test]
    fn land_column_layers() {
        let ctx = ctx();
        let mut col = vec![Voxel::AIR; 16];
        let sample = ColumnSample {
            band: Band::Grassland,
            elevation: 11.2,
            frozen: false,
        };
        materialize_column(sample, &ctx, &mut col);
        let (grass, dirt) = ctx.palette.band(Band::Grassland);
        assert_eq!(col[11], grass);
        assert_eq!(col[10], dirt);
        assert_eq!(col[9], dirt);
        assert_eq!(col[8], ctx.palette.rock);
        assert_eq!(col[0], ctx.palette.rock);
        assert!(col[12..].iter().all(|v| v.is_air()));
    }

    #[test]
    fn sunken_column_fills_to_sea_level() {
        let ctx = ctx();
        let mut col = vec![Voxel::AIR; 16];
        let sample = ColumnSample {
            band: Band::Ocean,
            elevation: 3.0,
            frozen: false,
        };
        materialize_column(sample, &ctx, &mut col);
        assert!(col[..=3].iter().all(|v| !v.is_air()));
        assert!(col[4..=8].iter().all(|&v| v == ctx.palette.water));
        assert!(col[9..].iter().all(|v| v.is_air()));
    }

    #[test]
    fn frozen_sea_caps_with_ice() {
        let ctx = ctx();
        let mut col = vec![Voxel::AIR; 16];
        let sample = ColumnSample {
            band: Band::DeepOcean,
            elevation: 0.0,
            frozen: true,
        };
        materialize_column(sample, &ctx, &mut col);
        assert_eq!(col[0], ctx.palette.rock);
        assert_eq!(col[7], ctx.palette.water);
        assert_eq!(col[8], ctx.palette.ice);
    }
}
