//! Position index: byte offsets to lines and visual columns, and back.
//!
//! This module contains:
//! - [`LineStart`] and [`find_line_start`]: where a line begins
//! - [`visual_column_of`] and [`coords_of`]: tab- and control-aware columns
//! - [`LineStartCache`]: a remembered line start used to shorten scans

mod cache;
mod columns;
mod line_start;

pub use cache::LineStartCache;
pub use columns::{coords_of, display_width, visual_column_of, Coords, CONTROL_WIDTH};
pub use line_start::{find_line_start, line_count, LineStart};
