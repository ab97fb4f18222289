use thiserror::Error;
use toroid_blocks::RegistryError;

/// Bad world parameters. Raised before any generation work starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("world {axis} must be greater than zero")]
    ZeroDimension { axis: &'static str },
    #[error("world {axis} ({size}) is not a multiple of the chunk size ({chunk_size})")]
    NotChunkAligned {
        axis: &'static str,
        size: u32,
        chunk_size: u32,
    },
    #[error("world height {height} outside [{min}, {max}]")]
    HeightOutOfRange { height: u32, min: u32, max: u32 },
    #[error("chunk size {chunk_size} outside [1, {max}]")]
    ChunkSizeOutOfRange { chunk_size: u32, max: u32 },
    #[error("plate count {count} outside [1, {max}] for this grid")]
    PlateCount { count: u32, max: u32 },
    #[error("sea level {sea_level} must be below world height {height}")]
    SeaLevel { sea_level: u32, height: u32 },
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParam { name: &'static str, reason: String },
    #[error("material `{0}` is not registered")]
    MissingMaterial(String),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
}

impl From<RegistryError> for ConfigError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::Parse(p) => ConfigError::Parse(p),
            other => ConfigError::InvalidParam {
                name: "materials",
                reason: other.to_string(),
            },
        }
    }
}

/// Errors surfaced by world queries.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    #[error("y = {y} is outside the world's vertical range [0, {height})")]
    OutOfBounds { y: i32, height: u32 },
}
