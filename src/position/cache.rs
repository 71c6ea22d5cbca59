//! Line-start cache: a remembered line start used as a scan shortcut.

use super::line_start::LineStart;
use crate::storage::ChunkedBuffer;

#[derive(Debug, Clone, Copy)]
struct Entry {
    start: LineStart,
    /// Layout epoch the chunk position was recorded under.
    epoch: u64,
}

/// Remembers where one line begins.
///
/// The line number and absolute offset stay true until an edit lands at
/// or before the cached offset. The chunk position additionally goes stale
/// whenever chunk boundaries move, so it is re-resolved from the absolute
/// offset on lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineStartCache {
    entry: Option<Entry>,
}

impl LineStartCache {
    /// Create an empty cache.
    pub const fn new() -> Self {
        Self { entry: None }
    }

    /// Remember `start` as recorded against `buffer`'s current layout.
    pub fn store(&mut self, start: LineStart, buffer: &ChunkedBuffer) {
        self.entry = Some(Entry {
            start,
            epoch: buffer.layout_epoch(),
        });
    }

    /// Forget the cached line start.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Invalidate if an edit at `edit_abs` could move the cached line start.
    ///
    /// Returns `true` if the entry was dropped.
    pub fn invalidate_from(&mut self, edit_abs: usize) -> bool {
        match self.entry {
            Some(entry) if edit_abs <= entry.start.abs => {
                tracing::trace!(edit_abs, cached = entry.start.abs, "line-start cache invalidated");
                self.entry = None;
                true
            }
            _ => false,
        }
    }

    /// Check if a line start is cached.
    pub const fn is_valid(&self) -> bool {
        self.entry.is_some()
    }

    /// The cached line start as stored, without re-resolving its chunk.
    pub fn peek(&self) -> Option<LineStart> {
        self.entry.map(|entry| entry.start)
    }

    /// The cached line start, if its chunk position is still current.
    pub fn get(&self, buffer: &ChunkedBuffer) -> Option<LineStart> {
        self.entry
            .filter(|entry| entry.epoch == buffer.layout_epoch())
            .map(|entry| entry.start)
    }

    /// The cached line start with a chunk position valid for `buffer`.
    pub fn lookup(&mut self, buffer: &ChunkedBuffer) -> Option<LineStart> {
        let entry = self.entry?;
        if entry.epoch == buffer.layout_epoch() {
            return Some(entry.start);
        }

        let Ok(pos) = buffer.locate(entry.start.abs) else {
            self.entry = None;
            return None;
        };
        let pos = buffer.normalize(pos);
        let start = LineStart {
            chunk: pos.chunk,
            offset: pos.offset,
            ..entry.start
        };
        self.store(start, buffer);
        Some(start)
    }
}

#[cfg(test)]
mod tests {
    use super::super::find_line_start;
    use super::*;
    use crate::storage::ChunkPos;

    fn buffer_with(capacity: usize, text: &[u8]) -> ChunkedBuffer {
        let mut buffer = ChunkedBuffer::new(capacity, 64).unwrap();
        let mut pos = ChunkPos::new(buffer.head(), 0);
        for &byte in text {
            pos = buffer.insert(pos, byte).unwrap();
        }
        buffer
    }

    #[test]
    fn test_invalidate_from_edit_position() {
        let buffer = buffer_with(8, b"ab\ncd\nef");
        let mut cache = LineStartCache::new();
        cache.store(find_line_start(&buffer, 2, None).unwrap(), &buffer);

        assert!(!cache.invalidate_from(7));
        assert!(cache.is_valid());
        assert!(cache.invalidate_from(6));
        assert!(!cache.is_valid());
    }

    #[test]
    fn test_lookup_re_resolves_after_layout_change() {
        let mut buffer = buffer_with(4, b"ab\ncdef");
        let mut cache = LineStartCache::new();
        let start = find_line_start(&buffer, 1, None).unwrap();
        cache.store(start, &buffer);

        // Split the first chunk after the cached position.
        let end = buffer.locate(buffer.size()).unwrap();
        buffer.insert(end, b'g').unwrap();
        let pos = buffer.locate(5).unwrap();
        buffer.insert(pos, b'X').unwrap();

        let refreshed = cache.lookup(&buffer).unwrap();
        assert_eq!(refreshed.abs, 3);
        assert_eq!(refreshed.line, 1);
        assert_eq!(refreshed, find_line_start(&buffer, 1, None).unwrap());
    }
}
