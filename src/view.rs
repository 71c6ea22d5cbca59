//! Viewport: scroll offsets that keep the cursor on screen.
//!
//! The first visible line is anchored in the buffer's line-start cache, so
//! drawing a screen and moving near it start their scans there instead of
//! at the head of the buffer.

use crate::error::Result;
use crate::position::LineStart;
use crate::storage::{ChunkPos, ChunkedBuffer};
use crate::text_buffer::TextBuffer;
use std::ops::Range;

/// A window of `rows` lines by `cols` columns onto a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    row_offset: usize,
    col_offset: usize,
    rows: usize,
    cols: usize,
}

impl Viewport {
    /// Create a viewport at the top-left corner. Zero sizes are treated as 1.
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self {
            row_offset: 0,
            col_offset: 0,
            rows: if rows == 0 { 1 } else { rows },
            cols: if cols == 0 { 1 } else { cols },
        }
    }

    /// First visible line.
    #[inline]
    pub const fn row_offset(&self) -> usize {
        self.row_offset
    }

    /// First visible column.
    #[inline]
    pub const fn col_offset(&self) -> usize {
        self.col_offset
    }

    /// Visible lines.
    #[inline]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Visible columns.
    #[inline]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Change the window size, e.g. after a terminal resize.
    ///
    /// Call [`Viewport::scroll_to_cursor`] afterwards to bring the cursor
    /// back into view.
    pub fn resize(&mut self, rows: usize, cols: usize) {
        self.rows = rows.max(1);
        self.cols = cols.max(1);
    }

    /// Scroll just far enough that the cursor is visible.
    ///
    /// Re-anchors the buffer's line-start cache at the first visible line
    /// when it moved or the cache no longer holds it. Returns `true` if
    /// either offset changed.
    pub fn scroll_to_cursor(&mut self, buffer: &mut TextBuffer) -> Result<bool> {
        let position = buffer.current_position();
        let (row_offset, col_offset) = (self.row_offset, self.col_offset);

        if position.line < self.row_offset {
            self.row_offset = position.line;
        }
        if position.line >= self.row_offset + self.rows {
            self.row_offset = position.line + 1 - self.rows;
        }
        if position.column < self.col_offset {
            self.col_offset = position.column;
        }
        if position.column >= self.col_offset + self.cols {
            self.col_offset = position.column + 1 - self.cols;
        }

        let anchored = buffer.line_start_cache().map(|start| start.line);
        if self.row_offset != row_offset || anchored != Some(self.row_offset) {
            buffer.anchor_line(self.row_offset)?;
        }

        let changed = self.row_offset != row_offset || self.col_offset != col_offset;
        if changed {
            tracing::debug!(
                row_offset = self.row_offset,
                col_offset = self.col_offset,
                "viewport scrolled"
            );
        }
        Ok(changed)
    }

    /// Cursor position relative to the top-left corner of the viewport.
    ///
    /// Only meaningful after [`Viewport::scroll_to_cursor`].
    pub const fn cursor_on_screen(&self, buffer: &TextBuffer) -> (usize, usize) {
        let position = buffer.current_position();
        (
            position.line.saturating_sub(self.row_offset),
            position.column.saturating_sub(self.col_offset),
        )
    }

    /// The lines currently in view, without their newlines.
    pub fn visible_lines<'a>(&self, buffer: &'a TextBuffer) -> VisibleLines<'a> {
        let storage = buffer.storage();
        let start = buffer.find_line_start(self.row_offset).ok();
        VisibleLines {
            storage,
            next: start.map(|start: LineStart| (start.pos(), start.abs)),
            number: self.row_offset,
            remaining: self.rows,
        }
    }
}

/// One line inside the viewport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleLine {
    /// Zero-based line number.
    pub number: usize,
    /// Byte range of the line's content, excluding its newline.
    pub range: Range<usize>,
}

/// Iterator over the lines visible in a [`Viewport`].
#[derive(Debug, Clone)]
pub struct VisibleLines<'a> {
    storage: &'a ChunkedBuffer,
    next: Option<(ChunkPos, usize)>,
    number: usize,
    remaining: usize,
}

impl Iterator for VisibleLines<'_> {
    type Item = VisibleLine;

    fn next(&mut self) -> Option<VisibleLine> {
        if self.remaining == 0 {
            return None;
        }
        let (pos, abs) = self.next.take()?;

        let range = match self.storage.find_byte(pos, abs, b'\n') {
            Some((newline, after)) => {
                self.next = Some((after, newline + 1));
                abs..newline
            }
            None => abs..self.storage.size(),
        };
        let line = VisibleLine {
            number: self.number,
            range,
        };
        self.number += 1;
        self.remaining -= 1;
        Some(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BufferConfig;
    use crate::cursor::Direction;

    fn buffer_with(text: &[u8]) -> TextBuffer {
        let mut buffer = TextBuffer::new(BufferConfig::new(4, 128)).unwrap();
        buffer.insert_bytes(text).unwrap();
        buffer.move_cursor_to(0).unwrap();
        buffer
    }

    fn numbered(count: usize) -> Vec<u8> {
        (0..count).flat_map(|n| format!("line {n}\n").into_bytes()).collect()
    }

    #[test]
    fn test_scroll_down_follows_cursor() {
        let mut buffer = buffer_with(&numbered(20));
        let mut view = Viewport::new(5, 80);

        assert!(!view.scroll_to_cursor(&mut buffer).unwrap());
        buffer.page_down(7).unwrap();
        assert!(view.scroll_to_cursor(&mut buffer).unwrap());
        assert_eq!(view.row_offset(), 3);
        assert_eq!(view.cursor_on_screen(&buffer), (4, 0));

        let anchored = buffer.line_start_cache().unwrap();
        assert_eq!(anchored.line, 3);
        assert_eq!(anchored.abs, buffer.find_line_start(3).unwrap().abs);
    }

    #[test]
    fn test_scroll_up_follows_cursor() {
        let mut buffer = buffer_with(&numbered(20));
        let mut view = Viewport::new(5, 80);
        buffer.page_down(15).unwrap();
        view.scroll_to_cursor(&mut buffer).unwrap();
        assert_eq!(view.row_offset(), 11);

        buffer.page_up(4).unwrap();
        view.scroll_to_cursor(&mut buffer).unwrap();
        assert_eq!(view.row_offset(), 11);

        buffer.move_cursor_relative(Direction::Up).unwrap();
        view.scroll_to_cursor(&mut buffer).unwrap();
        assert_eq!(view.row_offset(), 10);
    }

    #[test]
    fn test_horizontal_scroll() {
        let mut buffer = buffer_with(b"0123456789abcdef");
        let mut view = Viewport::new(3, 4);
        buffer.move_cursor_to(10).unwrap();
        view.scroll_to_cursor(&mut buffer).unwrap();
        assert_eq!(view.col_offset(), 7);
        assert_eq!(view.cursor_on_screen(&buffer), (0, 3));

        buffer.move_cursor_to(2).unwrap();
        view.scroll_to_cursor(&mut buffer).unwrap();
        assert_eq!(view.col_offset(), 2);
    }

    #[test]
    fn test_visible_lines_ranges() {
        let buffer = buffer_with(b"ab\n\ncdef\ng");
        let view = Viewport::new(10, 80);
        let lines: Vec<VisibleLine> = view.visible_lines(&buffer).collect();
        assert_eq!(
            lines,
            vec![
                VisibleLine { number: 0, range: 0..2 },
                VisibleLine { number: 1, range: 3..3 },
                VisibleLine { number: 2, range: 4..8 },
                VisibleLine { number: 3, range: 9..10 },
            ]
        );
    }

    #[test]
    fn test_visible_lines_trailing_newline_and_limit() {
        let mut buffer = buffer_with(&numbered(3));
        let mut view = Viewport::new(2, 80);
        buffer.page_down(3).unwrap();
        view.scroll_to_cursor(&mut buffer).unwrap();

        let lines: Vec<VisibleLine> = view.visible_lines(&buffer).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].number, 2);
        let last = &lines[1];
        assert_eq!(last.number, 3);
        assert!(last.range.is_empty());
        assert_eq!(last.range.start, buffer.total_size());
    }

    #[test]
    fn test_zero_sized_viewport_is_clamped() {
        let mut view = Viewport::new(0, 0);
        assert_eq!((view.rows(), view.cols()), (1, 1));
        view.resize(0, 40);
        assert_eq!((view.rows(), view.cols()), (1, 40));
    }
}
