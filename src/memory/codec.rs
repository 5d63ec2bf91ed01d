/*!
 * Header Codec
 *
 * Bit-packed records for the arena's in-band bookkeeping. Two fixed-width
 * word formats live here and nowhere else; every other component goes
 * through the accessors below instead of touching raw bits.
 *
 * ## Arena handle layout (one 64-bit word)
 *
 * | bits  | field                          |
 * |-------|--------------------------------|
 * | 58-63 | log2 of the data zone size     |
 * | 52-57 | log2 of the table zone size    |
 * | 26-51 | number of free segment headers |
 * | 0-25  | number of used segment headers |
 *
 * The all-zero word means "uninitialized".
 *
 * ## Segment header layout (one 64-bit word)
 *
 * | bits  | field    |
 * |-------|----------|
 * | 32-63 | offset/8 |
 * | 0-31  | size/8   |
 *
 * Offsets and sizes are multiples of 8 relative to the data zone start,
 * which caps the addressable data zone at 32 GiB.
 */

use crate::bytes;
use crate::core::limits::{BLOCK_ALIGN, HEADER_SIZE};
use crate::core::types::{Address, Size};

use super::types::Segment;

const MEM_EXP_SHIFT: u32 = 58;
const MAV_EXP_SHIFT: u32 = 52;
const EXP_MASK: u64 = 0x3f;
const FREE_COUNT_SHIFT: u32 = 26;
const COUNT_MASK: u64 = (1 << 26) - 1;

const WORD_SHIFT: u32 = 3;
const SEGMENT_FIELD_MASK: u64 = 0xffff_ffff;

/// Packed arena handle: zone sizes and segment counts in one word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaHandle(u64);

impl ArenaHandle {
    pub const UNINITIALIZED: Self = Self(0);

    /// Pack zone sizes and counts.
    ///
    /// Contract: both sizes are powers of two and both counts fit in 26
    /// bits. Violations are an encoding overflow, not a runtime error.
    pub fn pack(mem_size: Size, mav_size: Size, num_free: usize, num_used: usize) -> Self {
        debug_assert!(mem_size.is_power_of_two());
        debug_assert!(mav_size.is_power_of_two());
        debug_assert!(num_free as u64 <= COUNT_MASK);
        debug_assert!(num_used as u64 <= COUNT_MASK);
        let mem_exp = bytes::size_index(mem_size) as u64;
        let mav_exp = bytes::size_index(mav_size) as u64;
        Self(
            (mem_exp << MEM_EXP_SHIFT)
                | (mav_exp << MAV_EXP_SHIFT)
                | ((num_free as u64) << FREE_COUNT_SHIFT)
                | num_used as u64,
        )
    }

    pub const fn from_raw(word: u64) -> Self {
        Self(word)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    pub const fn is_initialized(self) -> bool {
        self.0 != 0
    }

    /// Data zone size, `1 << exponent`.
    pub fn mem_size(self) -> Size {
        1usize << (self.0 >> MEM_EXP_SHIFT)
    }

    /// Table zone size, `1 << exponent`.
    pub fn mav_size(self) -> Size {
        1usize << ((self.0 >> MAV_EXP_SHIFT) & EXP_MASK)
    }

    pub fn num_free(self) -> usize {
        ((self.0 >> FREE_COUNT_SHIFT) & COUNT_MASK) as usize
    }

    pub fn num_used(self) -> usize {
        (self.0 & COUNT_MASK) as usize
    }

    /// Total headers currently stored in the table zone.
    pub fn table_len(self) -> usize {
        self.num_free() + self.num_used()
    }

    /// Headers the table zone can hold before it must grow.
    pub fn table_capacity(self) -> usize {
        self.mav_size() / HEADER_SIZE
    }

    /// Same zones, new counts.
    pub fn with_counts(self, num_free: usize, num_used: usize) -> Self {
        Self::pack(self.mem_size(), self.mav_size(), num_free, num_used)
    }

    /// Same data zone and counts, new table zone size.
    pub fn with_mav_size(self, mav_size: Size) -> Self {
        Self::pack(self.mem_size(), mav_size, self.num_free(), self.num_used())
    }
}

/// Packed segment header: one (offset, size) block record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentHeader(u64);

impl SegmentHeader {
    /// Pack an 8-byte-aligned (offset, size) pair, truncating each scaled
    /// field to 32 bits.
    pub fn pack(offset: Address, size: Size) -> Self {
        debug_assert!(offset % BLOCK_ALIGN == 0);
        debug_assert!(size % BLOCK_ALIGN == 0);
        let offset_field = (offset as u64 >> WORD_SHIFT) & SEGMENT_FIELD_MASK;
        let size_field = (size as u64 >> WORD_SHIFT) & SEGMENT_FIELD_MASK;
        Self((offset_field << 32) | size_field)
    }

    pub const fn from_raw(word: u64) -> Self {
        Self(word)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    pub fn offset(self) -> Address {
        ((self.0 >> 32) << WORD_SHIFT) as Address
    }

    pub fn size(self) -> Size {
        ((self.0 & SEGMENT_FIELD_MASK) << WORD_SHIFT) as Size
    }

    /// One past the last byte of the block.
    pub fn end(self) -> Address {
        self.offset() + self.size()
    }

    /// Same offset, `size - delta`: a free block partially consumed from
    /// its high end. `delta` must be a multiple of 8 and <= size.
    pub fn reduced(self, delta: Size) -> Self {
        debug_assert!(delta % BLOCK_ALIGN == 0);
        debug_assert!(delta <= self.size());
        Self(self.0 - (delta as u64 >> WORD_SHIFT))
    }

    /// Same offset, `size + delta`: a free block absorbing an adjacent
    /// neighbor during coalescing.
    pub fn grown(self, delta: Size) -> Self {
        debug_assert!(delta % BLOCK_ALIGN == 0);
        Self(self.0 + (delta as u64 >> WORD_SHIFT))
    }

    pub fn decode(self) -> Segment {
        Segment::new(self.offset(), self.size())
    }
}
