//! Storage module: bounded chunk memory and the linked text list.
//!
//! This module contains:
//! - [`ChunkPool`]: the fixed arena every chunk comes from
//! - [`Chunk`]: a fixed-capacity byte node
//! - [`ChunkedBuffer`]: the doubly-linked chunk list holding the text

mod chunk;
mod list;
mod pool;

pub use chunk::{Chunk, ChunkId};
pub use list::{Bytes, ChunkIds, ChunkPos, ChunkedBuffer};
pub use pool::ChunkPool;
