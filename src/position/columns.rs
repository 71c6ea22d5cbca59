//! Visual columns: tab expansion and control-byte width.

use super::line_start::LineStart;
use crate::error::{BufferError, Result};
use crate::storage::{ChunkPos, ChunkedBuffer};

/// Width of a control byte rendered as `^X`.
pub const CONTROL_WIDTH: usize = 2;

/// Columns occupied by `byte` when it starts at `column`.
///
/// Newlines are not handled here; callers end the line on them.
#[inline]
pub const fn display_width(byte: u8, column: usize, tab_stop: usize) -> usize {
    match byte {
        b'\t' => tab_stop - column % tab_stop,
        0..=0x1f => CONTROL_WIDTH,
        _ => 1,
    }
}

/// Visual column of `target_abs`, measured from `line_start`.
///
/// Stops early at a newline, so a target past the end of the line
/// reports the line's full width.
pub fn visual_column_of(
    buffer: &ChunkedBuffer,
    line_start: &LineStart,
    target_abs: usize,
    tab_stop: usize,
) -> usize {
    if target_abs <= line_start.abs {
        return 0;
    }
    let mut column = 0;
    for byte in buffer.bytes_at(line_start.pos(), target_abs - line_start.abs) {
        if byte == b'\n' {
            break;
        }
        column += display_width(byte, column, tab_stop);
    }
    column
}

/// Line, column and normalized chunk position of an absolute offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coords {
    /// Zero-based line.
    pub line: usize,
    /// Visual column on that line.
    pub column: usize,
    /// Chunk position of the offset, normalized.
    pub pos: ChunkPos,
}

/// Compute [`Coords`] for `abs`.
///
/// Scans from `anchor` when it lies at or before `abs`, otherwise from the
/// head. The result does not depend on which start was used.
pub fn coords_of(
    buffer: &ChunkedBuffer,
    abs: usize,
    anchor: Option<LineStart>,
    tab_stop: usize,
) -> Result<Coords> {
    if abs > buffer.size() {
        return Err(BufferError::OutOfRange {
            offset: abs,
            size: buffer.size(),
        });
    }
    let start = match anchor {
        Some(anchor) if anchor.abs <= abs => anchor,
        _ => LineStart::origin(buffer),
    };

    let mut line = start.line;
    let mut column = 0;
    let mut remaining = abs - start.abs;
    let mut id = start.chunk;
    let mut offset = start.offset;

    loop {
        let chunk = buffer.chunk(id);
        let take = remaining.min(chunk.used().saturating_sub(offset));
        for &byte in &chunk.bytes()[offset..offset + take] {
            if byte == b'\n' {
                line += 1;
                column = 0;
            } else {
                column += display_width(byte, column, tab_stop);
            }
        }
        remaining -= take;
        offset += take;
        if remaining == 0 {
            break;
        }
        match chunk.next() {
            Some(next) => {
                id = next;
                offset = 0;
            }
            None => return Err(BufferError::InconsistentState("coordinate scan ran off the tail")),
        }
    }

    Ok(Coords {
        line,
        column,
        pos: buffer.normalize(ChunkPos::new(id, offset)),
    })
}
