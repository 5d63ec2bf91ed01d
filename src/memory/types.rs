/*!
 * Memory Types
 * Common types for the arena allocator
 */

use crate::core::types::{Address, Size};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Arena operation result
pub type ArenaResult<T> = Result<T, ArenaError>;

/// Arena errors
///
/// Every reported error leaves the arena's observable state unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArenaError {
    #[error("arena already initialized: {mem_size} data bytes, {mav_size} table bytes")]
    AlreadyInitialized { mem_size: Size, mav_size: Size },

    #[error(
        "out of memory: requested {requested} bytes, {available} bytes free across {fragments} fragments"
    )]
    OutOfMemory {
        requested: Size,
        available: Size,
        fragments: usize,
    },

    #[error("invalid free: no allocation starts at offset 0x{address:x}")]
    InvalidFree { address: Address },
}

/// Decoded segment record: one free or used block in the data zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub offset: Address,
    pub size: Size,
}

impl Segment {
    pub fn new(offset: Address, size: Size) -> Self {
        Self { offset, size }
    }

    /// One past the last byte of the segment.
    pub fn end(&self) -> Address {
        self.offset + self.size
    }

    /// True when `other` starts exactly where this segment ends.
    pub fn followed_by(&self, other: &Segment) -> bool {
        self.end() == other.offset
    }
}

/// Arena statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArenaStats {
    pub total_memory: Size,
    pub used_memory: Size,
    pub available_memory: Size,
    pub usage_percentage: f64,
    pub table_capacity: usize,
    pub free_segments: usize,
    pub used_segments: usize,
    pub largest_free_segment: Size,
}
