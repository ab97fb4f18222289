//! Chunk buffers and the toroidal chunk store.
#![forbid(unsafe_code)]

mod buf;
mod store;

pub use buf::{ChunkBuf, generate_chunk_buffer};
pub use store::{BoundaryLayer, ChunkSnapshot, ChunkStore};
