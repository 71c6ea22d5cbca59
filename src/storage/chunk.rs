//! Chunk: a fixed-capacity byte node in the buffer's linked storage.

/// Handle to a chunk slot in a [`ChunkPool`](super::ChunkPool).
///
/// Handles are plain indices into the pool's arena; they stay valid for
/// the pool's lifetime but only name live content while the chunk is
/// linked into a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId(u32);

impl ChunkId {
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) const fn new(index: usize) -> Self {
        Self(index as u32)
    }

    /// Arena index of this chunk.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A fixed-capacity byte array with list links.
///
/// Only `data[..used]` is meaningful. Bytes past `used` are stale and are
/// always overwritten before being read.
#[derive(Debug, Clone)]
pub struct Chunk {
    data: Box<[u8]>,
    used: usize,
    pub(crate) prev: Option<ChunkId>,
    pub(crate) next: Option<ChunkId>,
}

impl Chunk {
    /// Create an empty chunk with `capacity` bytes of storage.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity].into_boxed_slice(),
            used: 0,
            prev: None,
            next: None,
        }
    }

    /// Number of bytes in use.
    #[inline]
    pub const fn used(&self) -> usize {
        self.used
    }

    /// Storage capacity in bytes.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Check if no bytes are in use.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.used == 0
    }

    /// Check if the chunk has no spare capacity.
    #[inline]
    pub const fn is_full(&self) -> bool {
        self.used == self.data.len()
    }

    /// The live bytes of this chunk.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.data[..self.used]
    }

    /// Following chunk in the list.
    #[inline]
    pub const fn next(&self) -> Option<ChunkId> {
        self.next
    }

    /// Preceding chunk in the list.
    #[inline]
    pub const fn prev(&self) -> Option<ChunkId> {
        self.prev
    }

    /// Reset to the freshly allocated state. Payload bytes are left as-is.
    pub(crate) fn reset(&mut self) {
        self.used = 0;
        self.prev = None;
        self.next = None;
    }

    /// Insert `byte` at `offset`, shifting `[offset, used)` right by one.
    pub(crate) fn insert(&mut self, offset: usize, byte: u8) {
        debug_assert!(!self.is_full() && offset <= self.used);
        self.data.copy_within(offset..self.used, offset + 1);
        self.data[offset] = byte;
        self.used += 1;
    }

    /// Remove the byte at `offset`, shifting `[offset + 1, used)` left by one.
    pub(crate) fn remove(&mut self, offset: usize) -> u8 {
        debug_assert!(offset < self.used);
        let byte = self.data[offset];
        self.data.copy_within(offset + 1..self.used, offset);
        self.used -= 1;
        byte
    }

    /// Append `bytes` after the live content.
    pub(crate) fn extend_from_slice(&mut self, bytes: &[u8]) {
        let end = self.used + bytes.len();
        debug_assert!(end <= self.capacity());
        self.data[self.used..end].copy_from_slice(bytes);
        self.used = end;
    }

    /// Drop every byte at or after `offset`.
    pub(crate) fn truncate(&mut self, offset: usize) {
        debug_assert!(offset <= self.used);
        self.used = offset;
    }
}
