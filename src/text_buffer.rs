//! Text buffer: the editing and navigation API over the chunked storage.
//!
//! [`TextBuffer`] owns the chunk list, the cursor and the line-start cache.
//! Every operation either completes or leaves all three untouched.

use crate::config::BufferConfig;
use crate::cursor::{Cursor, Direction, Position};
use crate::error::{BufferError, Result};
use crate::position::{
    self, coords_of, display_width, find_line_start, Coords, LineStart, LineStartCache,
};
use crate::storage::{Bytes, ChunkPos, ChunkedBuffer};
use std::io::{self, Read, Write};
use std::ops::Range;

/// Read buffer size used when loading content.
const LOAD_BUF_SIZE: usize = 4096;

/// A bounded-memory text buffer with a cursor.
#[derive(Debug)]
pub struct TextBuffer {
    storage: ChunkedBuffer,
    cursor: Cursor,
    cache: LineStartCache,
    config: BufferConfig,
    dirty: bool,
}

impl TextBuffer {
    /// Create an empty buffer, reserving the whole chunk pool up front.
    pub fn new(config: BufferConfig) -> Result<Self> {
        config.validate()?;
        let storage = ChunkedBuffer::new(config.chunk_capacity, config.chunk_count)?;
        let cursor = Cursor::origin(storage.head());
        Ok(Self {
            storage,
            cursor,
            cache: LineStartCache::new(),
            config,
            dirty: false,
        })
    }

    /// The configuration this buffer was built with.
    pub const fn config(&self) -> &BufferConfig {
        &self.config
    }

    /// The underlying chunk list.
    pub const fn storage(&self) -> &ChunkedBuffer {
        &self.storage
    }

    /// The cursor, including its chunk position and goal column.
    pub const fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Cursor offset, line and visual column.
    pub const fn current_position(&self) -> Position {
        self.cursor.position()
    }

    /// Remembered column for vertical movement.
    pub const fn goal_column(&self) -> usize {
        self.cursor.goal().get()
    }

    /// Total bytes stored.
    pub const fn total_size(&self) -> usize {
        self.storage.size()
    }

    /// Check if the buffer holds no bytes.
    pub const fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Check if the buffer was modified since it was loaded or marked clean.
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Forget pending modifications, e.g. after a save.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Chunks still available in the pool.
    pub fn free_chunks(&self) -> usize {
        self.storage.pool().free_chunks()
    }

    /// Chunks linked into the buffer.
    pub fn chunks_in_use(&self) -> usize {
        self.storage.pool().chunks_in_use()
    }

    /// Number of lines (newlines plus one).
    pub fn line_count(&self) -> usize {
        position::line_count(&self.storage)
    }

    /// The byte at `abs`, if any.
    pub fn byte_at(&self, abs: usize) -> Option<u8> {
        self.storage.byte_at(abs)
    }

    /// Iterate over the bytes in `range`.
    pub fn bytes(&self, range: Range<usize>) -> Result<Bytes<'_>> {
        self.storage.bytes(range)
    }

    /// Copy the whole buffer out.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.storage.size());
        for slice in self.storage.slices() {
            out.extend_from_slice(slice);
        }
        out
    }

    /// Find where `line` begins.
    ///
    /// On [`BufferError::LineOutOfRange`] the error carries the end of the
    /// buffer as a fallback, which is not the requested line.
    pub fn find_line_start(&self, line: usize) -> Result<LineStart> {
        find_line_start(&self.storage, line, self.cache.get(&self.storage))
    }

    /// Visual column of `target_abs` on the line beginning at `line_start`.
    pub fn visual_column_of(&self, line_start: &LineStart, target_abs: usize) -> usize {
        position::visual_column_of(&self.storage, line_start, target_abs, self.config.tab_stop)
    }

    /// Record where `line` begins so later scans can start there.
    ///
    /// Used by the view layer for the first visible row.
    pub fn anchor_line(&mut self, line: usize) -> Result<LineStart> {
        let start = find_line_start(&self.storage, line, self.cache.lookup(&self.storage))?;
        self.cache.store(start, &self.storage);
        tracing::debug!(line, abs = start.abs, "anchored line start");
        Ok(start)
    }

    /// The cached line start, if one is still valid.
    pub fn line_start_cache(&self) -> Option<LineStart> {
        self.cache.get(&self.storage).or_else(|| {
            // Still true after a layout change, only its chunk position is stale.
            self.cache
                .peek()
                .and_then(|start| self.storage.locate(start.abs).ok().map(|pos| (start, pos)))
                .map(|(start, pos)| {
                    let pos = self.storage.normalize(pos);
                    LineStart {
                        chunk: pos.chunk,
                        offset: pos.offset,
                        ..start
                    }
                })
        })
    }

    /// Drop the cached line start.
    pub fn invalidate_line_cache(&mut self) {
        self.cache.invalidate();
    }

    /// Insert `byte` at the cursor and move past it.
    ///
    /// Fails with [`BufferError::PoolExhausted`] when no chunk is left for a
    /// split; the buffer is then unchanged.
    pub fn insert(&mut self, byte: u8) -> Result<()> {
        let at = self.cursor.abs();
        let after = self.storage.insert(self.cursor.pos(), byte)?;
        self.dirty = true;
        self.cache.invalidate_from(at);

        let (line, column) = (self.cursor.line(), self.cursor.column());
        let coords = if byte == b'\n' {
            Coords {
                line: line + 1,
                column: 0,
                pos: self.storage.normalize(after),
            }
        } else {
            Coords {
                line,
                column: column + display_width(byte, column, self.config.tab_stop),
                pos: self.storage.normalize(after),
            }
        };
        debug_assert!(
            self.scan_coords(at + 1).is_ok_and(|scanned| scanned == coords),
            "incremental coordinates diverged from a full scan"
        );
        self.commit_horizontal(at + 1, coords);
        Ok(())
    }

    /// Insert every byte of `bytes`, stopping at the first failure.
    ///
    /// Bytes inserted before a failure stay in the buffer.
    pub fn insert_bytes(&mut self, bytes: &[u8]) -> Result<usize> {
        for (count, &byte) in bytes.iter().enumerate() {
            if let Err(err) = self.insert(byte) {
                tracing::debug!(inserted = count, "bulk insert stopped early");
                return Err(err);
            }
        }
        Ok(bytes.len())
    }

    /// Delete the byte before the cursor. A no-op at the start of the buffer.
    ///
    /// Emptied chunks go back to the pool and neighbouring chunks that fit
    /// together are merged.
    pub fn delete_before_cursor(&mut self) -> Result<()> {
        let abs = self.cursor.abs();
        if abs == 0 {
            return Ok(());
        }

        let target = self.pos_before_cursor()?;
        let (_, pos) = self.storage.remove(target)?;
        self.dirty = true;
        self.cache.invalidate_from(abs - 1);

        let coords = self.scan_coords(abs - 1)?;
        debug_assert_eq!(coords.pos, self.storage.normalize(pos));
        self.commit_horizontal(abs - 1, coords);
        Ok(())
    }

    /// Delete the byte under the cursor. Returns `false` at the end of the buffer.
    pub fn delete_at_cursor(&mut self) -> Result<bool> {
        if self.cursor.abs() >= self.storage.size() {
            return Ok(false);
        }
        self.move_cursor_relative(Direction::Right)?;
        self.delete_before_cursor()?;
        Ok(true)
    }

    /// Delete from the cursor to the end of its line, keeping the newline.
    ///
    /// Returns the number of bytes removed.
    pub fn delete_to_line_end(&mut self) -> Result<usize> {
        let start = self.cursor.abs();
        let end = self.line_end_abs(self.cursor.line())?;
        if end <= start {
            return Ok(0);
        }

        self.move_cursor_to(end)?;
        for _ in start..end {
            self.delete_before_cursor()?;
        }
        Ok(end - start)
    }

    /// Release all content and start over with an empty buffer.
    pub fn clear(&mut self) -> Result<()> {
        self.storage.clear()?;
        self.cache.invalidate();
        self.cursor = Cursor::origin(self.storage.head());
        self.dirty = true;
        tracing::debug!("buffer cleared");
        Ok(())
    }

    /// Move the cursor to `target_abs`, clamped to the buffer.
    pub fn move_cursor_to(&mut self, target_abs: usize) -> Result<()> {
        let target = target_abs.min(self.storage.size());
        let coords = self.scan_coords(target)?;
        self.commit_horizontal(target, coords);
        Ok(())
    }

    /// Move the cursor one step in `direction`.
    ///
    /// Returns `false` if the cursor was already at the edge. On error the
    /// cursor has not moved.
    pub fn move_cursor_relative(&mut self, direction: Direction) -> Result<bool> {
        match direction {
            Direction::Left => self.step_left(),
            Direction::Right => self.step_right(),
            Direction::Up => match self.cursor.line().checked_sub(1) {
                Some(line) => self.move_to_line(line),
                None => Ok(false),
            },
            Direction::Down => self.move_to_line(self.cursor.line() + 1),
        }
    }

    /// Move to the start of the current line.
    pub fn move_home(&mut self) -> Result<()> {
        let start = self.line_start(self.cursor.line())?;
        let coords = Coords {
            line: start.line,
            column: 0,
            pos: start.pos(),
        };
        self.commit_horizontal(start.abs, coords);
        Ok(())
    }

    /// Move to the end of the current line, just before its newline.
    pub fn move_end(&mut self) -> Result<()> {
        let end = self.line_end_abs(self.cursor.line())?;
        self.move_cursor_to(end)
    }

    /// Move up by up to `rows` lines, keeping the goal column.
    ///
    /// Returns the number of lines moved.
    pub fn page_up(&mut self, rows: usize) -> Result<usize> {
        self.repeat_vertical(Direction::Up, rows)
    }

    /// Move down by up to `rows` lines, keeping the goal column.
    ///
    /// Returns the number of lines moved.
    pub fn page_down(&mut self, rows: usize) -> Result<usize> {
        self.repeat_vertical(Direction::Down, rows)
    }

    /// Insert an empty line below the current one and move onto it.
    pub fn open_line_below(&mut self) -> Result<()> {
        self.move_end()?;
        self.insert(b'\n')
    }

    /// Insert an empty line above the current one and move onto it.
    pub fn open_line_above(&mut self) -> Result<()> {
        self.move_home()?;
        self.insert(b'\n')?;
        self.move_cursor_relative(Direction::Left)?;
        Ok(())
    }

    /// Replace the contents with everything read from `reader`.
    ///
    /// The cursor ends at offset 0 and the buffer is clean. If the pool
    /// runs out part-way, the loaded prefix is kept and the error returned.
    pub fn load_from<R: Read>(&mut self, mut reader: R) -> Result<usize> {
        self.clear()?;
        let mut chunk = [0u8; LOAD_BUF_SIZE];
        let mut total = 0;

        loop {
            let read = match reader.read(&mut chunk) {
                Ok(0) => break,
                Ok(read) => read,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    self.move_cursor_to(0)?;
                    return Err(err.into());
                }
            };
            if let Err(err) = self.insert_bytes(&chunk[..read]) {
                self.move_cursor_to(0)?;
                return Err(err);
            }
            total += read;
        }

        self.move_cursor_to(0)?;
        self.dirty = false;
        tracing::debug!(bytes = total, chunks = self.chunks_in_use(), "loaded buffer");
        Ok(total)
    }

    /// Write the contents to `writer`, chunk by chunk.
    ///
    /// Returns the number of bytes written. The dirty flag is not touched.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<usize> {
        let mut total = 0;
        for slice in self.storage.slices() {
            writer.write_all(slice)?;
            total += slice.len();
        }
        writer.flush()?;
        Ok(total)
    }

    /// Check the chunk list, the cursor and the cache against a full scan.
    pub fn verify(&self) -> Result<()> {
        self.storage.verify()?;

        let scanned = coords_of(&self.storage, self.cursor.abs(), None, self.config.tab_stop)?;
        if scanned.pos != self.cursor.pos()
            || scanned.line != self.cursor.line()
            || scanned.column != self.cursor.column()
        {
            return Err(BufferError::InconsistentState("cursor disagrees with buffer contents"));
        }

        if let Some(cached) = self.line_start_cache() {
            let actual = find_line_start(&self.storage, cached.line, None)?;
            if actual.abs != cached.abs {
                return Err(BufferError::InconsistentState("line-start cache is stale"));
            }
        }
        Ok(())
    }

    /// Coordinates of `abs`, scanning from the cached line start when possible.
    fn scan_coords(&self, abs: usize) -> Result<Coords> {
        let anchor = self.line_start_cache();
        coords_of(&self.storage, abs, anchor, self.config.tab_stop)
    }

    /// Start of `line`, using the cache as a shortcut.
    fn line_start(&self, line: usize) -> Result<LineStart> {
        find_line_start(&self.storage, line, self.line_start_cache())
    }

    /// Offset of the newline ending `line`, or the buffer size on the last line.
    fn line_end_abs(&self, line: usize) -> Result<usize> {
        match self.line_start(line + 1) {
            Ok(next) => Ok(next.abs - 1),
            Err(BufferError::LineOutOfRange { .. }) => Ok(self.storage.size()),
            Err(err) => Err(err),
        }
    }

    /// Position of the byte just before the cursor.
    fn pos_before_cursor(&self) -> Result<ChunkPos> {
        let pos = self.cursor.pos();
        if pos.offset > 0 {
            return Ok(ChunkPos::new(pos.chunk, pos.offset - 1));
        }
        match self.storage.chunk(pos.chunk).prev() {
            Some(prev) if !self.storage.chunk(prev).is_empty() => {
                Ok(ChunkPos::new(prev, self.storage.chunk(prev).used() - 1))
            }
            _ => self.storage.locate(self.cursor.abs() - 1),
        }
    }

    fn step_left(&mut self) -> Result<bool> {
        let abs = self.cursor.abs();
        if abs == 0 {
            return Ok(false);
        }

        let pos = self.pos_before_cursor()?;
        let byte = self.storage.chunk(pos.chunk).bytes()[pos.offset];
        let coords = match byte {
            // Column after a newline or tab depends on what precedes it.
            b'\n' | b'\t' => self.scan_coords(abs - 1)?,
            _ => Coords {
                line: self.cursor.line(),
                column: self.cursor.column() - display_width(byte, 0, self.config.tab_stop),
                pos,
            },
        };
        self.commit_horizontal(abs - 1, coords);
        Ok(true)
    }

    fn step_right(&mut self) -> Result<bool> {
        let abs = self.cursor.abs();
        if abs >= self.storage.size() {
            return Ok(false);
        }

        let pos = self.cursor.pos();
        let Some(&byte) = self.storage.chunk(pos.chunk).bytes().get(pos.offset) else {
            // Not normalized; fall back to a full scan.
            let coords = self.scan_coords(abs + 1)?;
            self.commit_horizontal(abs + 1, coords);
            return Ok(true);
        };

        let next = self.storage.normalize(ChunkPos::new(pos.chunk, pos.offset + 1));
        let (line, column) = (self.cursor.line(), self.cursor.column());
        let coords = if byte == b'\n' {
            Coords {
                line: line + 1,
                column: 0,
                pos: next,
            }
        } else {
            Coords {
                line,
                column: column + display_width(byte, column, self.config.tab_stop),
                pos: next,
            }
        };
        self.commit_horizontal(abs + 1, coords);
        Ok(true)
    }

    /// Land on `line` at the goal column, or at its end if it is shorter.
    fn move_to_line(&mut self, line: usize) -> Result<bool> {
        let start = match self.line_start(line) {
            Ok(start) => start,
            Err(BufferError::LineOutOfRange { .. }) => return Ok(false),
            Err(err) => return Err(err),
        };

        let goal = self.cursor.goal().get();
        let tab_stop = self.config.tab_stop;
        let mut column = 0;
        let mut abs = start.abs;
        for byte in self.storage.bytes_at(start.pos(), self.storage.size() - start.abs) {
            if byte == b'\n' || column >= goal {
                break;
            }
            let width = display_width(byte, column, tab_stop);
            if column + width > goal {
                break;
            }
            column += width;
            abs += 1;
        }

        let pos = self.storage.normalize(self.storage.locate(abs)?);
        self.cursor.place(abs, Coords { line, column, pos });
        Ok(true)
    }

    fn repeat_vertical(&mut self, direction: Direction, rows: usize) -> Result<usize> {
        let mut moved = 0;
        while moved < rows && self.move_cursor_relative(direction)? {
            moved += 1;
        }
        Ok(moved)
    }

    /// Place the cursor after a horizontal move or edit, redefining the goal column.
    fn commit_horizontal(&mut self, abs: usize, coords: Coords) {
        self.cursor.place(abs, coords);
        self.cursor.settle_goal();
        debug_assert!(self.verify().is_ok(), "buffer invariants violated");
    }
}
