//! # Chunktext
//!
//! A bounded-memory text storage engine for terminal editors.
//!
//! Text lives in a doubly-linked list of fixed-capacity chunks drawn from a
//! pool reserved up front, so editing never allocates after start-up.
//!
//! ## Core Concepts
//!
//! - **Chunk pool**: every chunk is reserved when the buffer is created
//! - **Compaction**: neighbouring chunks that fit together are always merged
//! - **Line-start cache**: one remembered line start shortens most scans
//! - **Goal column**: vertical movement returns to the column it left
//!
//! ## Example
//!
//! ```rust
//! use chunktext::{BufferConfig, Direction, TextBuffer};
//!
//! let mut buffer = TextBuffer::new(BufferConfig::new(64, 16))?;
//! buffer.insert_bytes(b"hello\nworld")?;
//! buffer.move_cursor_relative(Direction::Up)?;
//!
//! let position = buffer.current_position();
//! assert_eq!((position.line, position.column), (0, 5));
//! # Ok::<(), chunktext::BufferError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod config;
pub mod cursor;
pub mod error;
pub mod input;
pub mod position;
pub mod storage;
pub mod text_buffer;
pub mod view;

// Re-exports for convenience
pub use config::BufferConfig;
pub use cursor::{Cursor, Direction, GoalColumn, Position};
pub use error::{BufferError, Result};
pub use input::EditCommand;
pub use position::{Coords, LineStart, LineStartCache};
pub use storage::{ChunkId, ChunkPos, ChunkedBuffer};
pub use text_buffer::TextBuffer;
pub use view::{Viewport, VisibleLine, VisibleLines};
