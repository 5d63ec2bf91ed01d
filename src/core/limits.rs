/*!
 * Limits and Constants
 *
 * Centralized location for crate-wide sizes, thresholds, and magic bytes.
 * All values include rationale comments explaining WHY they exist.
 */

/// Initial segment table zone size (4KB)
/// One page worth of headers: 512 entries before the first doubling
pub const INITIAL_TABLE_SIZE: usize = 4096;

/// Width of one packed segment header (8 bytes)
/// The header codec stores every record as a single 64-bit word
pub const HEADER_SIZE: usize = 8;

/// Allocation granularity and fixed word alignment (8 bytes)
/// Offsets and sizes are always multiples of this, which is what lets the
/// codec store them divided by 8
pub const BLOCK_ALIGN: usize = 8;

/// log2 of [`BLOCK_ALIGN`], for rounding helpers
pub const BLOCK_ALIGN_LOG2: u32 = 3;

/// Sentinel byte written over unallocated and freshly freed memory
/// Printable on purpose so hex/ascii dumps of the arena read at a glance
pub const FILL_BYTE: u8 = b'-';

/// Upper bound on the data zone (32 GiB)
/// Segment headers store offset/8 and size/8 in 32 bits each
pub const MAX_DATA_ZONE: usize = 1 << 35;
