//! Configuration for the chunked text buffer.
//!
//! All memory is reserved up front from these numbers: a buffer can never
//! hold more than `chunk_capacity * chunk_count` bytes.

use crate::error::{BufferError, Result};

/// Default number of bytes per chunk.
pub const DEFAULT_CHUNK_CAPACITY: usize = 512;

/// Default number of chunks in the pool (16 MiB of text at the default capacity).
pub const DEFAULT_CHUNK_COUNT: usize = 32_768;

/// Default tab stop width in columns.
pub const DEFAULT_TAB_STOP: usize = 8;

/// Configuration for a [`TextBuffer`](crate::TextBuffer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferConfig {
    /// Bytes per chunk (`C`).
    pub chunk_capacity: usize,
    /// Chunks in the pool (`N`).
    pub chunk_count: usize,
    /// Tab stop width used for visual columns.
    pub tab_stop: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            chunk_capacity: DEFAULT_CHUNK_CAPACITY,
            chunk_count: DEFAULT_CHUNK_COUNT,
            tab_stop: DEFAULT_TAB_STOP,
        }
    }
}

impl BufferConfig {
    /// Create a configuration with the given chunk geometry and the default tab stop.
    pub const fn new(chunk_capacity: usize, chunk_count: usize) -> Self {
        Self {
            chunk_capacity,
            chunk_count,
            tab_stop: DEFAULT_TAB_STOP,
        }
    }

    /// Set the tab stop width.
    #[must_use]
    pub const fn with_tab_stop(mut self, tab_stop: usize) -> Self {
        self.tab_stop = tab_stop;
        self
    }

    /// Total bytes of content the pool can hold.
    pub const fn pool_capacity(&self) -> usize {
        self.chunk_capacity * self.chunk_count
    }

    /// Check that every dimension is usable.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_capacity == 0 {
            return Err(BufferError::InvalidConfig("chunk capacity must be non-zero"));
        }
        if self.chunk_count == 0 {
            return Err(BufferError::InvalidConfig("chunk count must be non-zero"));
        }
        if self.chunk_count > u32::MAX as usize {
            return Err(BufferError::InvalidConfig("chunk count exceeds handle range"));
        }
        if self.tab_stop == 0 {
            return Err(BufferError::InvalidConfig("tab stop must be non-zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BufferConfig::default();
        assert_eq!(config.chunk_capacity, 512);
        assert_eq!(config.tab_stop, 8);
        assert_eq!(config.pool_capacity(), 512 * 32_768);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = BufferConfig::new(4, 2).with_tab_stop(4);
        assert_eq!(config.pool_capacity(), 8);
        assert_eq!(config.tab_stop, 4);
    }

    #[test]
    fn test_config_rejects_zero() {
        assert!(matches!(
            BufferConfig::new(0, 2).validate(),
            Err(BufferError::InvalidConfig(_))
        ));
        assert!(matches!(
            BufferConfig::new(4, 0).validate(),
            Err(BufferError::InvalidConfig(_))
        ));
        assert!(matches!(
            BufferConfig::new(4, 2).with_tab_stop(0).validate(),
            Err(BufferError::InvalidConfig(_))
        ));
    }
}
