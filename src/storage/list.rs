//! Chunked buffer: the doubly-linked sequence of chunks holding the text.
//!
//! Links are [`ChunkId`] handles into the owning [`ChunkPool`]. The list
//! keeps itself compacted after every mutation:
//!
//! - no chunk has `used > capacity`
//! - no chunk is empty unless it is the only chunk
//! - no two neighbours could fit into a single chunk

use super::chunk::{Chunk, ChunkId};
use super::pool::ChunkPool;
use crate::error::{BufferError, Result};
use std::ops::Range;

/// A location inside the list: a chunk and an intra-chunk offset.
///
/// `offset` may equal the chunk's `used` length, meaning "just past its
/// last byte".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPos {
    /// Chunk holding the position.
    pub chunk: ChunkId,
    /// Offset within the chunk.
    pub offset: usize,
}

impl ChunkPos {
    /// Create a new position.
    pub const fn new(chunk: ChunkId, offset: usize) -> Self {
        Self { chunk, offset }
    }
}

/// The full text as a linked list of pool chunks.
#[derive(Debug)]
pub struct ChunkedBuffer {
    pool: ChunkPool,
    head: ChunkId,
    tail: ChunkId,
    /// Sum of `used` over every linked chunk.
    size: usize,
    /// Bumped whenever chunk boundaries move (split, merge, release).
    layout_epoch: u64,
}

impl ChunkedBuffer {
    /// Create an empty buffer backed by a fresh pool.
    pub fn new(chunk_capacity: usize, chunk_count: usize) -> Result<Self> {
        let mut pool = ChunkPool::new(chunk_capacity, chunk_count);
        let head = pool.allocate()?;
        Ok(Self {
            pool,
            head,
            tail: head,
            size: 0,
            layout_epoch: 0,
        })
    }

    /// Total bytes stored.
    #[inline]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Check if the buffer holds no bytes.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// First chunk.
    #[inline]
    pub const fn head(&self) -> ChunkId {
        self.head
    }

    /// Last chunk.
    #[inline]
    pub const fn tail(&self) -> ChunkId {
        self.tail
    }

    /// Bytes per chunk.
    #[inline]
    pub const fn chunk_capacity(&self) -> usize {
        self.pool.chunk_capacity()
    }

    /// The backing pool.
    #[inline]
    pub const fn pool(&self) -> &ChunkPool {
        &self.pool
    }

    /// Counter that changes whenever chunk boundaries move.
    ///
    /// A `(chunk, offset)` pair recorded under one epoch may name a
    /// released chunk or a shifted offset under another.
    #[inline]
    pub const fn layout_epoch(&self) -> u64 {
        self.layout_epoch
    }

    /// Borrow a chunk.
    #[inline]
    pub fn chunk(&self, id: ChunkId) -> &Chunk {
        self.pool.get(id)
    }

    /// Iterate over the linked chunk handles in order.
    pub fn chunk_ids(&self) -> ChunkIds<'_> {
        ChunkIds {
            buffer: self,
            next: Some(self.head),
        }
    }

    /// Number of linked chunks.
    pub fn chunk_count(&self) -> usize {
        self.chunk_ids().count()
    }

    /// Iterate over the live bytes of each chunk, in list order.
    pub fn slices(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.chunk_ids().map(|id| self.chunk(id).bytes())
    }

    /// Translate an absolute offset into a chunk position.
    ///
    /// `abs == size` maps to the end of the tail chunk; any other offset
    /// maps to the chunk holding the byte at `abs`.
    pub fn locate(&self, abs: usize) -> Result<ChunkPos> {
        if abs > self.size {
            return Err(BufferError::OutOfRange {
                offset: abs,
                size: self.size,
            });
        }
        if abs == self.size {
            return Ok(ChunkPos::new(self.tail, self.chunk(self.tail).used()));
        }

        let mut base = 0;
        for id in self.chunk_ids() {
            let used = self.chunk(id).used();
            if abs < base + used {
                return Ok(ChunkPos::new(id, abs - base));
            }
            base += used;
        }
        Err(BufferError::InconsistentState("chunk sizes do not sum to buffer size"))
    }

    /// Move a position sitting just past a chunk's last byte onto the start
    /// of the following chunk.
    ///
    /// Only the very end of the buffer is left as "end of chunk".
    pub fn normalize(&self, pos: ChunkPos) -> ChunkPos {
        let chunk = self.chunk(pos.chunk);
        match chunk.next() {
            Some(next) if pos.offset >= chunk.used() => ChunkPos::new(next, 0),
            _ => pos,
        }
    }

    /// Absolute offset of the first byte of `id`.
    pub fn offset_of(&self, id: ChunkId) -> Result<usize> {
        let mut base = 0;
        for current in self.chunk_ids() {
            if current == id {
                return Ok(base);
            }
            base += self.chunk(current).used();
        }
        Err(BufferError::InconsistentState("chunk is not linked into the buffer"))
    }

    /// Absolute offset of a chunk position.
    pub fn abs_of(&self, pos: ChunkPos) -> Result<usize> {
        Ok(self.offset_of(pos.chunk)? + pos.offset)
    }

    /// The byte at `abs`, if any.
    pub fn byte_at(&self, abs: usize) -> Option<u8> {
        if abs >= self.size {
            return None;
        }
        let pos = self.locate(abs).ok()?;
        self.chunk(pos.chunk).bytes().get(pos.offset).copied()
    }

    /// Iterate over the bytes in `range`.
    pub fn bytes(&self, range: Range<usize>) -> Result<Bytes<'_>> {
        if range.start > range.end || range.end > self.size {
            return Err(BufferError::OutOfRange {
                offset: range.end.max(range.start),
                size: self.size,
            });
        }
        let start = self.locate(range.start)?;
        Ok(self.bytes_at(start, range.end - range.start))
    }

    /// Iterate over up to `len` bytes starting at a known position.
    pub fn bytes_at(&self, pos: ChunkPos, len: usize) -> Bytes<'_> {
        Bytes {
            buffer: self,
            chunk: Some(pos.chunk),
            offset: pos.offset,
            remaining: len,
        }
    }

    /// Find the next occurrence of `needle` at or after `from`.
    ///
    /// `from_abs` is the absolute offset of `from`. Returns the absolute
    /// offset of the match and the normalized position just after it.
    pub fn find_byte(&self, from: ChunkPos, from_abs: usize, needle: u8) -> Option<(usize, ChunkPos)> {
        let mut abs = from_abs;
        let mut offset = from.offset;
        let mut next = Some(from.chunk);

        while let Some(id) = next {
            let chunk = self.chunk(id);
            let bytes = chunk.bytes();
            if let Some(found) = bytes.get(offset..).and_then(|rest| rest.iter().position(|&b| b == needle)) {
                let at = offset + found;
                return Some((abs + found, self.normalize(ChunkPos::new(id, at + 1))));
            }
            abs += bytes.len().saturating_sub(offset);
            offset = 0;
            next = chunk.next();
        }
        None
    }

    /// Insert `byte` at `pos`, returning the position just after it.
    ///
    /// A full chunk is split by allocating a successor. If the pool is
    /// exhausted the buffer is left untouched.
    pub fn insert(&mut self, pos: ChunkPos, byte: u8) -> Result<ChunkPos> {
        let ChunkPos { chunk, offset } = self.normalize(pos);

        if !self.chunk(chunk).is_full() {
            self.pool.get_mut(chunk).insert(offset, byte);
            self.size += 1;
            return Ok(ChunkPos::new(chunk, offset + 1));
        }

        let fresh = self.pool.allocate()?;
        self.link_after(chunk, fresh);
        self.layout_epoch += 1;
        let capacity = self.chunk_capacity();

        let after = if offset == capacity {
            self.pool.get_mut(fresh).insert(0, byte);
            ChunkPos::new(fresh, 1)
        } else {
            let (full, spill) = self.pool.pair_mut(chunk, fresh);
            spill.extend_from_slice(&full.bytes()[offset..]);
            full.truncate(offset);
            full.insert(offset, byte);
            tracing::trace!(
                chunk = chunk.index(),
                fresh = fresh.index(),
                at = offset,
                "split full chunk"
            );
            ChunkPos::new(chunk, offset + 1)
        };
        self.size += 1;

        let after = self.compact_around(after);
        if self.pool.is_live(fresh) && after.chunk != fresh {
            self.merge_next(fresh);
        }
        Ok(after)
    }

    /// Remove the byte at `at`, returning the position it occupied.
    ///
    /// Afterwards an emptied chunk is released, then the surviving chunk is
    /// merged with its neighbours wherever both fit in one chunk.
    pub fn remove(&mut self, at: ChunkPos) -> Result<(u8, ChunkPos)> {
        let ChunkPos { chunk, offset } = at;
        if offset >= self.chunk(chunk).used() {
            return Err(BufferError::InconsistentState("remove past end of chunk"));
        }

        let byte = self.pool.get_mut(chunk).remove(offset);
        self.size -= 1;
        let mut pos = ChunkPos::new(chunk, offset);

        if self.chunk(chunk).is_empty() && self.head != self.tail {
            let (prev, next) = (self.chunk(chunk).prev(), self.chunk(chunk).next());
            self.unlink(chunk);
            self.pool.release(chunk);
            self.layout_epoch += 1;
            pos = match (prev, next) {
                (Some(prev), _) => ChunkPos::new(prev, self.chunk(prev).used()),
                (None, Some(next)) => ChunkPos::new(next, 0),
                (None, None) => {
                    return Err(BufferError::InconsistentState("emptied chunk had no neighbours"))
                }
            };
        }

        Ok((byte, self.compact_around(pos)))
    }

    /// Release every chunk and start over with one empty chunk.
    pub fn clear(&mut self) -> Result<()> {
        let mut next = Some(self.head);
        while let Some(id) = next {
            next = self.chunk(id).next();
            self.pool.release(id);
        }
        self.head = self.pool.allocate()?;
        self.tail = self.head;
        self.size = 0;
        self.layout_epoch += 1;
        Ok(())
    }

    /// Walk the list and check every structural invariant.
    pub fn verify(&self) -> Result<()> {
        let capacity = self.chunk_capacity();
        let mut total = 0;
        let mut seen = 0;
        let mut prev: Option<ChunkId> = None;
        let mut current = Some(self.head);

        while let Some(id) = current {
            seen += 1;
            if seen > self.pool.chunk_count() {
                return Err(BufferError::InconsistentState("chunk list contains a cycle"));
            }
            if !self.pool.is_live(id) {
                return Err(BufferError::InconsistentState("linked chunk is on the free list"));
            }
            let chunk = self.chunk(id);
            if chunk.prev() != prev {
                return Err(BufferError::InconsistentState("back link does not match"));
            }
            if chunk.used() > capacity {
                return Err(BufferError::InconsistentState("chunk over capacity"));
            }
            if chunk.is_empty() && (self.head != self.tail) {
                return Err(BufferError::InconsistentState("empty chunk in multi-chunk list"));
            }
            if let Some(next) = chunk.next() {
                if chunk.used() + self.chunk(next).used() <= capacity {
                    return Err(BufferError::InconsistentState("adjacent chunks not compacted"));
                }
            }
            total += chunk.used();
            prev = Some(id);
            current = chunk.next();
        }

        if prev != Some(self.tail) {
            return Err(BufferError::InconsistentState("tail is not the last chunk"));
        }
        if total != self.size {
            return Err(BufferError::InconsistentState("chunk sizes do not sum to buffer size"));
        }
        if seen != self.pool.chunks_in_use() {
            return Err(BufferError::InconsistentState("allocated chunk is not linked"));
        }
        Ok(())
    }

    /// Link `fresh` directly after `anchor`.
    fn link_after(&mut self, anchor: ChunkId, fresh: ChunkId) {
        let next = self.chunk(anchor).next();
        {
            let chunk = self.pool.get_mut(fresh);
            chunk.prev = Some(anchor);
            chunk.next = next;
        }
        match next {
            Some(next) => self.pool.get_mut(next).prev = Some(fresh),
            None => self.tail = fresh,
        }
        self.pool.get_mut(anchor).next = Some(fresh);
    }

    /// Detach `id` from its neighbours, fixing `head` and `tail`.
    fn unlink(&mut self, id: ChunkId) {
        let (prev, next) = (self.chunk(id).prev(), self.chunk(id).next());
        match prev {
            Some(prev) => self.pool.get_mut(prev).next = next,
            None => {
                if let Some(next) = next {
                    self.head = next;
                }
            }
        }
        match next {
            Some(next) => self.pool.get_mut(next).prev = prev,
            None => {
                if let Some(prev) = prev {
                    self.tail = prev;
                }
            }
        }
    }

    /// Fold the successor of `id` into it if both fit in one chunk.
    fn merge_next(&mut self, id: ChunkId) -> bool {
        let Some(next) = self.chunk(id).next() else {
            return false;
        };
        if self.chunk(id).used() + self.chunk(next).used() > self.chunk_capacity() {
            return false;
        }

        let (into, from) = self.pool.pair_mut(id, next);
        into.extend_from_slice(from.bytes());
        self.unlink(next);
        self.pool.release(next);
        self.layout_epoch += 1;
        tracing::trace!(chunk = id.index(), merged = next.index(), "merged chunks");
        true
    }

    /// Merge the chunk holding `pos` with either neighbour where they fit,
    /// returning `pos` translated into the surviving chunk.
    fn compact_around(&mut self, pos: ChunkPos) -> ChunkPos {
        let mut pos = pos;
        if let Some(prev) = self.chunk(pos.chunk).prev() {
            let prev_used = self.chunk(prev).used();
            if self.merge_next(prev) {
                pos = ChunkPos::new(prev, prev_used + pos.offset);
            }
        }
        self.merge_next(pos.chunk);
        pos
    }
}

/// Iterator over linked chunk handles.
#[derive(Debug, Clone)]
pub struct ChunkIds<'a> {
    buffer: &'a ChunkedBuffer,
    next: Option<ChunkId>,
}

impl Iterator for ChunkIds<'_> {
    type Item = ChunkId;

    fn next(&mut self) -> Option<ChunkId> {
        let id = self.next?;
        self.next = self.buffer.chunk(id).next();
        Some(id)
    }
}

/// Iterator over a run of buffer bytes.
#[derive(Debug, Clone)]
pub struct Bytes<'a> {
    buffer: &'a ChunkedBuffer,
    chunk: Option<ChunkId>,
    offset: usize,
    remaining: usize,
}

impl Iterator for Bytes<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        while self.remaining > 0 {
            let chunk = self.buffer.chunk(self.chunk?);
            if let Some(&byte) = chunk.bytes().get(self.offset) {
                self.offset += 1;
                self.remaining -= 1;
                return Some(byte);
            }
            self.chunk = chunk.next();
            self.offset = 0;
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}
