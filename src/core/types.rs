/*!
 * Core Types
 * Common types used across the crate
 */

/// Address type for allocation results: a byte offset from the arena base
pub type Address = usize;

/// Size type for memory operations
pub type Size = usize;
