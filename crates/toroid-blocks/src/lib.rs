//! Voxel, material, and registry crate.
#![forbid(unsafe_code)]

pub mod material;
pub mod types;

pub use material::{MaterialDef, MaterialRegistry, RegistryError};
pub use types::{MaterialId, Transparency, Voxel};
