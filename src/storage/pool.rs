//! Chunk pool: a fixed arena of chunks handed out from a free list.
//!
//! The pool is the only source of chunk memory. Every chunk is allocated
//! when the pool is built; afterwards `allocate` and `release` only move
//! handles on and off the free list.

use super::chunk::{Chunk, ChunkId};
use crate::error::{BufferError, Result};

/// Fixed-size free-list allocator of chunks.
#[derive(Debug)]
pub struct ChunkPool {
    /// Arena of every chunk slot.
    chunks: Vec<Chunk>,
    /// Free handles, popped from the end.
    free: Vec<ChunkId>,
    /// Whether each slot is currently handed out.
    live: Vec<bool>,
    /// Bytes per chunk.
    chunk_capacity: usize,
}

impl ChunkPool {
    /// Build a pool of `chunk_count` chunks of `chunk_capacity` bytes each.
    pub fn new(chunk_capacity: usize, chunk_count: usize) -> Self {
        let chunks = (0..chunk_count)
            .map(|_| Chunk::with_capacity(chunk_capacity))
            .collect();
        // Reversed so that the lowest slot is handed out first.
        let free = (0..chunk_count).rev().map(ChunkId::new).collect();

        Self {
            chunks,
            free,
            live: vec![false; chunk_count],
            chunk_capacity,
        }
    }

    /// Bytes per chunk.
    #[inline]
    pub const fn chunk_capacity(&self) -> usize {
        self.chunk_capacity
    }

    /// Total chunks in the pool.
    #[inline]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Chunks currently available.
    #[inline]
    pub fn free_chunks(&self) -> usize {
        self.free.len()
    }

    /// Chunks currently handed out.
    #[inline]
    pub fn chunks_in_use(&self) -> usize {
        self.chunks.len() - self.free.len()
    }

    /// Take a chunk off the free list with `used = 0` and no links.
    pub fn allocate(&mut self) -> Result<ChunkId> {
        let Some(id) = self.free.pop() else {
            tracing::warn!(chunks = self.chunks.len(), "chunk pool exhausted");
            return Err(BufferError::PoolExhausted {
                chunks: self.chunks.len(),
            });
        };
        self.chunks[id.index()].reset();
        self.live[id.index()] = true;
        tracing::trace!(chunk = id.index(), free = self.free.len(), "allocated chunk");
        Ok(id)
    }

    /// Return a chunk to the free list.
    ///
    /// The caller must already have unlinked it from any buffer.
    pub fn release(&mut self, id: ChunkId) {
        debug_assert!(self.live[id.index()], "double release of chunk {}", id.index());
        self.live[id.index()] = false;
        self.chunks[id.index()].reset();
        self.free.push(id);
        tracing::trace!(chunk = id.index(), free = self.free.len(), "released chunk");
    }

    /// Check if a handle is currently allocated.
    #[inline]
    pub fn is_live(&self, id: ChunkId) -> bool {
        self.live.get(id.index()).copied().unwrap_or(false)
    }

    /// Borrow a chunk.
    #[inline]
    pub fn get(&self, id: ChunkId) -> &Chunk {
        &self.chunks[id.index()]
    }

    /// Mutably borrow a chunk.
    #[inline]
    pub fn get_mut(&mut self, id: ChunkId) -> &mut Chunk {
        &mut self.chunks[id.index()]
    }

    /// Mutably borrow two distinct chunks at once.
    pub fn pair_mut(&mut self, a: ChunkId, b: ChunkId) -> (&mut Chunk, &mut Chunk) {
        assert_ne!(a, b, "pair_mut requires two distinct chunks");
        let (i, j) = (a.index(), b.index());
        if i < j {
            let (left, right) = self.chunks.split_at_mut(j);
            (&mut left[i], &mut right[0])
        } else {
            let (left, right) = self.chunks.split_at_mut(i);
            (&mut right[0], &mut left[j])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_allocate_until_exhausted() {
        let mut pool = ChunkPool::new(4, 2);
        assert_eq!(pool.free_chunks(), 2);

        let a = pool.allocate().unwrap();
        let b = pool.allocate().unwrap();
        assert_ne!(a, b);
        assert_eq!(pool.chunks_in_use(), 2);

        assert!(matches!(
            pool.allocate(),
            Err(BufferError::PoolExhausted { chunks: 2 })
        ));
    }

    #[test]
    fn test_pool_release_reuses_slot() {
        let mut pool = ChunkPool::new(4, 2);
        let a = pool.allocate().unwrap();
        pool.get_mut(a).extend_from_slice(b"ab");
        pool.release(a);
        assert!(!pool.is_live(a));

        let again = pool.allocate().unwrap();
        assert_eq!(again, a);
        assert_eq!(pool.get(again).used(), 0);
    }

    #[test]
    fn test_pool_pair_mut_either_order() {
        let mut pool = ChunkPool::new(4, 3);
        let a = pool.allocate().unwrap();
        let b = pool.allocate().unwrap();

        let (x, y) = pool.pair_mut(b, a);
        x.extend_from_slice(b"b");
        y.extend_from_slice(b"a");
        assert_eq!(pool.get(a).bytes(), b"a");
        assert_eq!(pool.get(b).bytes(), b"b");
    }
}
