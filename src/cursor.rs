//! Cursor state: one position kept in three agreeing representations.
//!
//! The cursor records the absolute offset, the normalized chunk position
//! and the `(line, column)` pair together. They are only ever written as a
//! unit by [`Cursor::place`], so they cannot drift apart.

use crate::position::Coords;
use crate::storage::{ChunkId, ChunkPos};

/// Arrow-key direction for relative movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// One byte back.
    Left,
    /// One byte forward.
    Right,
    /// Previous line, at the goal column.
    Up,
    /// Next line, at the goal column.
    Down,
}

/// Where the cursor is, as reported to the view layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Absolute byte offset.
    pub abs: usize,
    /// Zero-based line.
    pub line: usize,
    /// Visual column on that line.
    pub column: usize,
}

/// The visual column vertical movement tries to return to.
///
/// Horizontal moves and edits redefine it; vertical moves only read it,
/// so passing through a short line does not lose the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GoalColumn(usize);

impl GoalColumn {
    /// The remembered column.
    #[inline]
    pub const fn get(self) -> usize {
        self.0
    }

    /// Redefine the goal after a horizontal move or an edit.
    #[inline]
    pub(crate) fn set_from_move(&mut self, column: usize) {
        self.0 = column;
    }
}

/// Cursor position and goal column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    abs: usize,
    pos: ChunkPos,
    line: usize,
    column: usize,
    goal: GoalColumn,
}

impl Cursor {
    /// A cursor at the start of a buffer whose head chunk is `head`.
    pub(crate) const fn origin(head: ChunkId) -> Self {
        Self {
            abs: 0,
            pos: ChunkPos::new(head, 0),
            line: 0,
            column: 0,
            goal: GoalColumn(0),
        }
    }

    /// Absolute byte offset.
    #[inline]
    pub const fn abs(&self) -> usize {
        self.abs
    }

    /// Normalized chunk position.
    #[inline]
    pub const fn pos(&self) -> ChunkPos {
        self.pos
    }

    /// Zero-based line.
    #[inline]
    pub const fn line(&self) -> usize {
        self.line
    }

    /// Visual column.
    #[inline]
    pub const fn column(&self) -> usize {
        self.column
    }

    /// Goal column for vertical movement.
    #[inline]
    pub const fn goal(&self) -> GoalColumn {
        self.goal
    }

    /// Offset, line and column together.
    pub const fn position(&self) -> Position {
        Position {
            abs: self.abs,
            line: self.line,
            column: self.column,
        }
    }

    /// Move to `abs`, described by `coords`. The goal column is untouched.
    pub(crate) fn place(&mut self, abs: usize, coords: Coords) {
        self.abs = abs;
        self.pos = coords.pos;
        self.line = coords.line;
        self.column = coords.column;
    }

    /// Adopt the current column as the goal column.
    pub(crate) fn settle_goal(&mut self) {
        self.goal.set_from_move(self.column);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_keeps_goal() {
        let head = ChunkId::new(0);
        let mut cursor = Cursor::origin(head);
        cursor.place(
            5,
            Coords {
                line: 0,
                column: 5,
                pos: ChunkPos::new(head, 5),
            },
        );
        cursor.settle_goal();
        assert_eq!(cursor.goal().get(), 5);

        cursor.place(
            8,
            Coords {
                line: 1,
                column: 2,
                pos: ChunkPos::new(head, 8),
            },
        );
        assert_eq!(cursor.goal().get(), 5);
        assert_eq!(
            cursor.position(),
            Position {
                abs: 8,
                line: 1,
                column: 2
            }
        );
    }
}
