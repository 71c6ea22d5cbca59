//! Line starts: locating the first byte of a line by counting newlines.

use crate::error::{BufferError, Result};
use crate::storage::{ChunkId, ChunkPos, ChunkedBuffer};

/// The exact location where a line begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineStart {
    /// Chunk holding the first byte of the line.
    pub chunk: ChunkId,
    /// Offset of that byte within the chunk.
    pub offset: usize,
    /// Absolute offset of the line start.
    pub abs: usize,
    /// Zero-based line number.
    pub line: usize,
}

impl LineStart {
    /// Start of line 0.
    pub const fn origin(buffer: &ChunkedBuffer) -> Self {
        Self {
            chunk: buffer.head(),
            offset: 0,
            abs: 0,
            line: 0,
        }
    }

    /// The line start as a chunk position.
    #[inline]
    pub const fn pos(&self) -> ChunkPos {
        ChunkPos::new(self.chunk, self.offset)
    }
}

/// Find where `line` begins.
///
/// Scanning starts from `hint` when it names an earlier (or the same)
/// line, otherwise from the head. On failure the error carries the
/// end-of-buffer position as a fallback.
pub fn find_line_start(
    buffer: &ChunkedBuffer,
    line: usize,
    hint: Option<LineStart>,
) -> Result<LineStart> {
    let start = match hint {
        Some(hint) if hint.line <= line => hint,
        _ => LineStart::origin(buffer),
    };
    if start.line == line {
        return Ok(start);
    }

    let mut current = start.line;
    let mut abs = start.abs;
    let mut offset = start.offset;
    let mut next = Some(start.chunk);

    while let Some(id) = next {
        let chunk = buffer.chunk(id);
        let bytes = chunk.bytes();
        for (i, &byte) in bytes.iter().enumerate().skip(offset) {
            if byte != b'\n' {
                continue;
            }
            current += 1;
            if current == line {
                let pos = buffer.normalize(ChunkPos::new(id, i + 1));
                return Ok(LineStart {
                    chunk: pos.chunk,
                    offset: pos.offset,
                    abs: abs + (i + 1 - offset),
                    line,
                });
            }
        }
        abs += bytes.len().saturating_sub(offset);
        offset = 0;
        next = chunk.next();
    }

    let tail = buffer.tail();
    Err(BufferError::LineOutOfRange {
        line,
        lines: current + 1,
        fallback: LineStart {
            chunk: tail,
            offset: buffer.chunk(tail).used(),
            abs: buffer.size(),
            line: current,
        },
    })
}

/// Number of lines: newlines plus one.
pub fn line_count(buffer: &ChunkedBuffer) -> usize {
    buffer
        .slices()
        .map(|bytes| bytes.iter().filter(|&&b| b == b'\n').count())
        .sum::<usize>()
        + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_with(capacity: usize, text: &[u8]) -> ChunkedBuffer {
        let mut buffer = ChunkedBuffer::new(capacity, 64).unwrap();
        let mut pos = ChunkPos::new(buffer.head(), 0);
        for &byte in text {
            pos = buffer.insert(pos, byte).unwrap();
        }
        buffer
    }

    #[test]
    fn test_line_zero_is_origin() {
        let buffer = buffer_with(4, b"abc\ndef");
        let start = find_line_start(&buffer, 0, None).unwrap();
        assert_eq!(start, LineStart::origin(&buffer));
    }

    #[test]
    fn test_find_line_start_after_newline() {
        let buffer = buffer_with(4, b"ab\ncdef\ng");
        let first = find_line_start(&buffer, 1, None).unwrap();
        assert_eq!(first.abs, 3);
        assert_eq!(buffer.byte_at(first.abs), Some(b'c'));

        let second = find_line_start(&buffer, 2, None).unwrap();
        assert_eq!(second.abs, 8);
        assert_eq!(second.line, 2);
        assert_eq!(buffer.abs_of(second.pos()).unwrap(), 8);
    }

    #[test]
    fn test_line_start_on_chunk_boundary_is_normalized() {
        // "abc\n" fills the first chunk exactly; line 1 starts in the next one.
        let buffer = buffer_with(4, b"abc\nxy");
        let start = find_line_start(&buffer, 1, None).unwrap();
        assert_eq!(start.chunk, buffer.tail());
        assert_eq!(start.offset, 0);
        assert_eq!(start.abs, 4);
    }

    #[test]
    fn test_trailing_newline_starts_empty_last_line() {
        let buffer = buffer_with(8, b"abc\n");
        let start = find_line_start(&buffer, 1, None).unwrap();
        assert_eq!(start.abs, 4);
        assert_eq!(start.offset, 4);
    }

    #[test]
    fn test_missing_line_reports_fallback() {
        let buffer = buffer_with(4, b"one\ntwo");
        let err = find_line_start(&buffer, 5, None).unwrap_err();
        match err {
            BufferError::LineOutOfRange {
                line,
                lines,
                fallback,
            } => {
                assert_eq!(line, 5);
                assert_eq!(lines, 2);
                assert_eq!(fallback.abs, buffer.size());
                assert_eq!(fallback.chunk, buffer.tail());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_hint_gives_same_answer() {
        let buffer = buffer_with(4, b"a\nbb\nccc\ndddd\ne");
        let hint = find_line_start(&buffer, 2, None).unwrap();
        for line in 2..5 {
            assert_eq!(
                find_line_start(&buffer, line, Some(hint)).unwrap(),
                find_line_start(&buffer, line, None).unwrap()
            );
        }
        // A hint past the target is ignored.
        assert_eq!(find_line_start(&buffer, 1, Some(hint)).unwrap().abs, 2);
    }

    #[test]
    fn test_line_count() {
        assert_eq!(line_count(&buffer_with(4, b"")), 1);
        assert_eq!(line_count(&buffer_with(4, b"abc\n")), 2);
        assert_eq!(line_count(&buffer_with(4, b"a\nb\nc")), 3);
    }
}
