use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use toroid_blocks::material::{MaterialEntry, MaterialsConfig};
use toroid_blocks::MaterialRegistry;

use crate::chunk_coord::ChunkGrid;
use crate::error::ConfigError;
use crate::torus::Torus;

pub const MAX_HEIGHT: u32 = 1024;
pub const MIN_HEIGHT: u32 = 2;
pub const MAX_CHUNK_SIZE: u32 = 128;
pub const MAX_HORIZONTAL: u32 = 1 << 16;
/// A plate must own at least this many columns on average.
pub const MIN_CELLS_PER_PLATE: u32 = 64;
pub const MAX_STEPS: u32 = 4096;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct WorldGenConfig {
    #[serde(default)]
    pub world: WorldSection,
    #[serde(default)]
    pub tectonics: TectonicParams,
    #[serde(default)]
    pub climate: ClimateParams,
    #[serde(default)]
    pub runtime: RuntimeSection,
    #[serde(default)]
    pub materials: HashMap<String, MaterialEntry>,
}

impl WorldGenConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Builtin registry with this config's `[materials.*]` overrides applied.
    pub fn registry(&self) -> Result<MaterialRegistry, ConfigError> {
        let mut reg = MaterialRegistry::builtin();
        reg.apply(MaterialsConfig {
            materials: self.materials.clone(),
        })?;
        Ok(reg)
    }
}

pub fn load_config_from_path(path: &Path) -> Result<WorldGenConfig, ConfigError> {
    let s = fs::read_to_string(path)?;
    WorldGenConfig::from_toml_str(&s)
}

#[derive(Clone, Debug, Deserialize)]
pub struct WorldSection {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_depth")]
    pub depth: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u32,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_sea_level")]
    pub sea_level: u32,
}
fn default_width() -> u32 {
    256
}
fn default_depth() -> u32 {
    256
}
fn default_height() -> u32 {
    64
}
fn default_chunk_size() -> u32 {
    16
}
fn default_seed() -> u64 {
    1
}
fn default_sea_level() -> u32 {
    24
}
impl Default for WorldSection {
    fn default() -> Self {
        Self {
            width: default_width(),
            depth: default_depth(),
            height: default_height(),
            chunk_size: default_chunk_size(),
            seed: default_seed(),
            sea_level: default_sea_level(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RuntimeSection {
    /// Background mesh workers; 0 picks from available parallelism.
    #[serde(default)]
    pub workers: usize,
    #[serde(default)]
    pub background: bool,
}
/// Plate simulation knobs. Elevations are normalized: 0 is sea level, +-1 the extremes.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct TectonicParams {
    #[serde(default = "default_plate_count")]
    pub plate_count: u32,
    #[serde(default = "default_steps")]
    pub steps: u32,
    #[serde(default = "default_dt")]
    pub dt: f32,
    #[serde(default = "default_speed_min")]
    pub speed_min: f32,
    #[serde(default = "default_speed_max")]
    pub speed_max: f32,
    #[serde(default = "default_continental_ratio")]
    pub continental_ratio: f32,
    #[serde(default = "default_continental_bias")]
    pub continental_bias: f32,
    #[serde(default = "default_oceanic_bias")]
    pub oceanic_bias: f32,
    #[serde(default = "default_bias_jitter")]
    pub bias_jitter: f32,
    #[serde(default = "default_convergent_uplift")]
    pub convergent_uplift: f32,
    #[serde(default = "default_trench_depth")]
    pub trench_depth: f32,
    #[serde(default = "default_divergent_subsidence")]
    pub divergent_subsidence: f32,
    #[serde(default = "default_isostasy")]
    pub isostasy: f32,
    #[serde(default = "default_diffusion")]
    pub diffusion: f32,
    /// Boundary warp amplitude as a fraction of the mean plate spacing.
    #[serde(default = "default_warp_strength")]
    pub warp_strength: f32,
    /// Warp noise features per world width.
    #[serde(default = "default_warp_frequency")]
    pub warp_frequency: f32,
    #[serde(default = "default_roughness")]
    pub roughness: f32,
    #[serde(default = "default_roughness_frequency")]
    pub roughness_frequency: f32,
    #[serde(default = "default_boundary_distance_cap")]
    pub boundary_distance_cap: u16,
}
fn default_plate_count() -> u32 {
    12
}
fn default_steps() -> u32 {
    24
}
fn default_dt() -> f32 {
    1.0
}
fn default_speed_min() -> f32 {
    0.2
}
fn default_speed_max() -> f32 {
    1.2
}
fn default_continental_ratio() -> f32 {
    0.45
}
fn default_continental_bias() -> f32 {
    0.2
}
fn default_oceanic_bias() -> f32 {
    -0.45
}
fn default_bias_jitter() -> f32 {
    0.1
}
fn default_convergent_uplift() -> f32 {
    0.06
}
fn default_trench_depth() -> f32 {
    0.04
}
fn default_divergent_subsidence() -> f32 {
    0.03
}
fn default_isostasy() -> f32 {
    0.08
}
fn default_diffusion() -> f32 {
    0.2
}
fn default_warp_strength() -> f32 {
    0.25
}
fn default_warp_frequency() -> f32 {
    3.0
}
fn default_roughness() -> f32 {
    0.06
}
fn default_roughness_frequency() -> f32 {
    8.0
}
fn default_boundary_distance_cap() -> u16 {
    32
}
impl Default for TectonicParams {
    fn default() -> Self {
        Self {
            plate_count: default_plate_count(),
            steps: default_steps(),
            dt: default_dt(),
            speed_min: default_speed_min(),
            speed_max: default_speed_max(),
            continental_ratio: default_continental_ratio(),
            continental_bias: default_continental_bias(),
            oceanic_bias: default_oceanic_bias(),
            bias_jitter: default_bias_jitter(),
            convergent_uplift: default_convergent_uplift(),
            trench_depth: default_trench_depth(),
            divergent_subsidence: default_divergent_subsidence(),
            isostasy: default_isostasy(),
            diffusion: default_diffusion(),
            warp_strength: default_warp_strength(),
            warp_frequency: default_warp_frequency(),
            roughness: default_roughness(),
            roughness_frequency: default_roughness_frequency(),
            boundary_distance_cap: default_boundary_distance_cap(),
        }
    }
}

/// Band thresholds. Heights are in voxel layers unless noted.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct ClimateParams {
    #[serde(default = "default_deep_ocean_depth")]
    pub deep_ocean_depth: u32,
    #[serde(default = "default_beach_height")]
    pub beach_height: u32,
    #[serde(default = "default_beach_width")]
    pub beach_width: u16,
    /// Fraction of the land range above sea level where permanent snow starts.
    #[serde(default = "default_snow_height")]
    pub snow_height: f32,
    /// Fraction of the land range above sea level where bare rock starts.
    #[serde(default = "default_rock_height")]
    pub rock_height: f32,
    #[serde(default = "default_rock_slope")]
    pub rock_slope: u32,
    #[serde(default = "default_lapse")]
    pub lapse: f32,
    #[serde(default = "default_tundra_temperature")]
    pub tundra_temperature: f32,
    #[serde(default = "default_freeze_temperature")]
    pub freeze_temperature: f32,
    #[serde(default = "default_desert_moisture")]
    pub desert_moisture: f32,
    #[serde(default = "default_forest_moisture")]
    pub forest_moisture: f32,
    #[serde(default = "default_moisture_range")]
    pub moisture_range: f32,
    #[serde(default = "default_water_distance_cap")]
    pub water_distance_cap: u16,
}
fn default_deep_ocean_depth() -> u32 {
    8
}
fn default_beach_height() -> u32 {
    2
}
fn default_beach_width() -> u16 {
    3
}
fn default_snow_height() -> f32 {
    0.8
}
fn default_rock_height() -> f32 {
    0.6
}
fn default_rock_slope() -> u32 {
    4
}
fn default_lapse() -> f32 {
    0.6
}
fn default_tundra_temperature() -> f32 {
    0.15
}
fn default_freeze_temperature() -> f32 {
    0.08
}
fn default_desert_moisture() -> f32 {
    0.05
}
fn default_forest_moisture() -> f32 {
    0.4
}
fn default_moisture_range() -> f32 {
    24.0
}
fn default_water_distance_cap() -> u16 {
    255
}
impl Default for ClimateParams {
    fn default() -> Self {
        Self {
            deep_ocean_depth: default_deep_ocean_depth(),
            beach_height: default_beach_height(),
            beach_width: default_beach_width(),
            snow_height: default_snow_height(),
            rock_height: default_rock_height(),
            rock_slope: default_rock_slope(),
            lapse: default_lapse(),
            tundra_temperature: default_tundra_temperature(),
            freeze_temperature: default_freeze_temperature(),
            desert_moisture: default_desert_moisture(),
            forest_moisture: default_forest_moisture(),
            moisture_range: default_moisture_range(),
            water_distance_cap: default_water_distance_cap(),
        }
    }
}

/// Flattened, validated snapshot of the config used by the pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldParams {
    pub width: u32,
    pub depth: u32,
    pub height: u32,
    pub chunk_size: u32,
    pub seed: u64,
    pub sea_level: u32,
    pub tectonics: TectonicParams,
    pub climate: ClimateParams,
}

impl Default for WorldParams {
    fn default() -> Self {
        Self::from_config(&WorldGenConfig::default())
    }
}

impl WorldParams {
    /// Params with default tectonic and climate tuning.
    pub fn new(
        width: u32,
        depth: u32,
        height: u32,
        chunk_size: u32,
        seed: u64,
        plate_count: u32,
    ) -> Self {
        let sea_level = height * 3 / 8;
        Self {
            width,
            depth,
            height,
            chunk_size,
            seed,
            sea_level,
            tectonics: TectonicParams {
                plate_count,
                ..TectonicParams::default()
            },
            climate: ClimateParams::default(),
        }
    }

    pub fn from_config(cfg: &WorldGenConfig) -> Self {
        Self {
            width: cfg.world.width,
            depth: cfg.world.depth,
            height: cfg.world.height,
            chunk_size: cfg.world.chunk_size,
            seed: cfg.world.seed,
            sea_level: cfg.world.sea_level,
            tectonics: cfg.tectonics,
            climate: cfg.climate,
        }
    }

    pub fn with_seed(&self, seed: u64) -> Self {
        Self {
            seed,
            ..self.clone()
        }
    }

    #[inline]
    pub fn plate_count(&self) -> u32 {
        self.tectonics.plate_count
    }

    #[inline]
    pub fn torus(&self) -> Torus {
        Torus::new(self.width as i32, self.depth as i32)
    }

    #[inline]
    pub fn chunk_grid(&self) -> ChunkGrid {
        let s = self.chunk_size.max(1);
        ChunkGrid::new(
            (self.width / s) as i32,
            (self.depth / s) as i32,
            s as i32,
        )
    }

    pub fn max_plates(&self) -> u32 {
        let cells = u64::from(self.width) * u64::from(self.depth);
        (cells / u64::from(MIN_CELLS_PER_PLATE)).min(u64::from(u16::MAX)) as u32
    }

    /// Checks every invariant the pipeline relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (axis, size) in [("width", self.width), ("depth", self.depth)] {
            if size == 0 {
                return Err(ConfigError::ZeroDimension { axis });
            }
            if size > MAX_HORIZONTAL {
                return Err(ConfigError::InvalidParam {
                    name: axis,
                    reason: format!("{size} exceeds {MAX_HORIZONTAL}"),
                });
            }
        }
        if self.height == 0 {
            return Err(ConfigError::ZeroDimension { axis: "height" });
        }
        if !(MIN_HEIGHT..=MAX_HEIGHT).contains(&self.height) {
            return Err(ConfigError::HeightOutOfRange {
                height: self.height,
                min: MIN_HEIGHT,
                max: MAX_HEIGHT,
            });
        }
        if self.chunk_size == 0 || self.chunk_size > MAX_CHUNK_SIZE {
            return Err(ConfigError::ChunkSizeOutOfRange {
                chunk_size: self.chunk_size,
                max: MAX_CHUNK_SIZE,
            });
        }
        for (axis, size) in [("width", self.width), ("depth", self.depth)] {
            if size % self.chunk_size != 0 {
                return Err(ConfigError::NotChunkAligned {
                    axis,
                    size,
                    chunk_size: self.chunk_size,
                });
            }
        }
        if self.sea_level >= self.height {
            return Err(ConfigError::SeaLevel {
                sea_level: self.sea_level,
                height: self.height,
            });
        }
        let max = self.max_plates();
        let count = self.tectonics.plate_count;
        if count == 0 || count > max {
            return Err(ConfigError::PlateCount { count, max });
        }
        self.validate_tectonics()?;
        self.validate_climate()
    }

    fn validate_tectonics(&self) -> Result<(), ConfigError> {
        let t = &self.tectonics;
        if t.steps > MAX_STEPS {
            return Err(invalid("steps", format!("{} exceeds {MAX_STEPS}", t.steps)));
        }
        if !(t.dt.is_finite() && t.dt > 0.0) {
            return Err(invalid("dt", "must be positive".into()));
        }
        if !(t.speed_min >= 0.0 && t.speed_min <= t.speed_max && t.speed_max.is_finite()) {
            return Err(invalid(
                "speed_min",
                "needs 0 <= speed_min <= speed_max".into(),
            ));
        }
        for (name, v) in [
            ("continental_ratio", t.continental_ratio),
            ("isostasy", t.isostasy),
            ("diffusion", t.diffusion),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(invalid(name, format!("{v} outside [0, 1]")));
            }
        }
        for (name, v) in [
            ("continental_bias", t.continental_bias),
            ("oceanic_bias", t.oceanic_bias),
            ("bias_jitter", t.bias_jitter),
            ("convergent_uplift", t.convergent_uplift),
            ("trench_depth", t.trench_depth),
            ("divergent_subsidence", t.divergent_subsidence),
            ("warp_strength", t.warp_strength),
            ("warp_frequency", t.warp_frequency),
            ("roughness", t.roughness),
            ("roughness_frequency", t.roughness_frequency),
        ] {
            if !v.is_finite() {
                return Err(invalid(name, "must be finite".into()));
            }
        }
        if t.bias_jitter < 0.0 {
            return Err(invalid("bias_jitter", "must be non-negative".into()));
        }
        Ok(())
    }

    fn validate_climate(&self) -> Result<(), ConfigError> {
        let c = &self.climate;
        for (name, v) in [("snow_height", c.snow_height), ("rock_height", c.rock_height)] {
            if !(0.0..=1.0).contains(&v) {
                return Err(invalid(name, format!("{v} outside [0, 1]")));
            }
        }
        if !(c.moisture_range.is_finite() && c.moisture_range > 0.0) {
            return Err(invalid("moisture_range", "must be positive".into()));
        }
        // a zero cap would put every land column at distance 0 from water
        if c.water_distance_cap == 0 {
            return Err(invalid("water_distance_cap", "must be at least 1".into()));
        }
        for (name, v) in [
            ("lapse", c.lapse),
            ("tundra_temperature", c.tundra_temperature),
            ("freeze_temperature", c.freeze_temperature),
            ("desert_moisture", c.desert_moisture),
            ("forest_moisture", c.forest_moisture),
        ] {
            if !v.is_finite() {
                return Err(invalid(name, "must be finite".into()));
            }
        }
        Ok(())
    }
}

fn invalid(name: &'static str, reason: String) -> ConfigError {
    ConfigError::InvalidParam { name, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        WorldParams::default().validate().unwrap();
        let p = WorldParams::default();
        assert_eq!((p.width, p.depth, p.height, p.chunk_size), (256, 256, 64, 16));
        assert_eq!((p.seed, p.plate_count(), p.sea_level), (1, 12, 24));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = WorldGenConfig::from_toml_str(
            r#"
            [world]
            width = 64
            depth = 32
            seed = 9

            [tectonics]
            plate_count = 4
            "#,
        )
        .unwrap();
        let p = WorldParams::from_config(&cfg);
        assert_eq!((p.width, p.depth, p.height, p.seed), (64, 32, 64, 9));
        assert_eq!(p.plate_count(), 4);
        assert_eq!(p.tectonics.steps, default_steps());
        p.validate().unwrap();
    }

    #[test]
    fn rejects_misaligned_and_degenerate_worlds() {
        let mut p = WorldParams::new(60, 64, 32, 16, 1, 4);
        assert!(matches!(
            p.validate(),
            Err(ConfigError::NotChunkAligned { axis: "width", .. })
        ));
        p.width = 0;
        assert!(matches!(
            p.validate(),
            Err(ConfigError::ZeroDimension { axis: "width" })
        ));
        let p = WorldParams::new(64, 64, 32, 16, 1, 65);
        assert!(matches!(
            p.validate(),
            Err(ConfigError::PlateCount { count: 65, max: 64 })
        ));
        let mut p = WorldParams::new(64, 64, 32, 16, 1, 4);
        p.sea_level = 32;
        assert!(matches!(p.validate(), Err(ConfigError::SeaLevel { .. })));
        let p = WorldParams::new(64, 64, 32, 0, 1, 4);
        assert!(matches!(
            p.validate(),
            Err(ConfigError::ChunkSizeOutOfRange { .. })
        ));
        let p = WorldParams::new(64, 64, 1, 16, 1, 4);
        assert!(matches!(
            p.validate(),
            Err(ConfigError::HeightOutOfRange { height: 1, min: MIN_HEIGHT, max: MAX_HEIGHT })
        ));
        let p = WorldParams::new(64, 64, MAX_HEIGHT + 1, 16, 1, 4);
        assert!(matches!(
            p.validate(),
            Err(ConfigError::HeightOutOfRange { .. })
        ));
        let mut p = WorldParams::new(64, 64, 32, 16, 1, 4);
        p.climate.water_distance_cap = 0;
        assert!(matches!(
            p.validate(),
            Err(ConfigError::InvalidParam { name: "water_distance_cap", .. })
        ));
    }

    #[test]
    fn material_overrides_flow_into_registry() {
        let cfg = WorldGenConfig::from_toml_str(
            r#"
            [materials.sand]
            color = [1, 2, 3, 255]
            "#,
        )
        .unwrap();
        let reg = cfg.registry().unwrap();
        let sand = reg.id_by_name("sand").unwrap();
        assert_eq!(reg.color(sand), [1, 2, 3, 255]);
    }
}
