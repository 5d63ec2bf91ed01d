/*!
 * Segment Table
 *
 * The two ordered header tables living inside the arena's metadata zone.
 * Free headers pack upward from the zone's low address; used headers pack
 * downward from its high end (index 0 nearest the high end). Both tables
 * stay sorted by ascending block offset, and the free table additionally
 * never holds two adjacent entries.
 *
 * A `SegmentTable` borrows the arena buffer and works on a copy of the
 * handle: byte moves land in the buffer first, and the caller commits the
 * updated handle afterwards. A half-applied operation is therefore never
 * visible through a committed handle.
 */

use crate::bytes;
use crate::core::limits::HEADER_SIZE;
use crate::core::types::{Address, Size};
use log::info;

use super::codec::{ArenaHandle, SegmentHeader};

pub struct SegmentTable<'a> {
    handle: ArenaHandle,
    buf: &'a mut [u8],
}

impl<'a> SegmentTable<'a> {
    pub fn new(handle: ArenaHandle, buf: &'a mut [u8]) -> Self {
        debug_assert!(handle.is_initialized());
        debug_assert!(buf.len() >= handle.mem_size() + handle.mav_size());
        Self { handle, buf }
    }

    /// The handle reflecting every operation performed so far; the caller
    /// commits this once the table work is done.
    pub fn handle(&self) -> ArenaHandle {
        self.handle
    }

    fn free_pos(&self, index: usize) -> usize {
        self.handle.mem_size() + index * HEADER_SIZE
    }

    fn used_pos(&self, index: usize) -> usize {
        self.handle.mem_size() + self.handle.mav_size() - (index + 1) * HEADER_SIZE
    }

    fn read(&self, pos: usize) -> SegmentHeader {
        let mut word = [0u8; HEADER_SIZE];
        word.copy_from_slice(&self.buf[pos..pos + HEADER_SIZE]);
        SegmentHeader::from_raw(u64::from_ne_bytes(word))
    }

    fn write(&mut self, pos: usize, header: SegmentHeader) {
        self.buf[pos..pos + HEADER_SIZE].copy_from_slice(&header.raw().to_ne_bytes());
    }

    pub fn free_at(&self, index: usize) -> SegmentHeader {
        debug_assert!(index < self.handle.num_free());
        self.read(self.free_pos(index))
    }

    pub fn used_at(&self, index: usize) -> SegmentHeader {
        debug_assert!(index < self.handle.num_used());
        self.read(self.used_pos(index))
    }

    /// First-fit search: the first free entry, in ascending-offset order,
    /// whose size is at least `min_size`.
    pub fn find_free(&self, min_size: Size) -> Option<usize> {
        (0..self.handle.num_free()).find(|&i| self.free_at(i).size() >= min_size)
    }

    /// Exact-match lookup of the used entry starting at `offset`.
    pub fn find_used(&self, offset: Address) -> Option<usize> {
        for index in 0..self.handle.num_used() {
            let seg = self.used_at(index);
            if seg.offset() == offset {
                return Some(index);
            }
            if seg.offset() > offset {
                break;
            }
        }
        None
    }

    /// Number of free entries with offset strictly below `offset`: the
    /// index a new entry must take to keep the table sorted.
    pub fn free_insertion_index(&self, offset: Address) -> usize {
        (0..self.handle.num_free())
            .take_while(|&i| self.free_at(i).offset() < offset)
            .count()
    }

    /// The used-table analogue of [`free_insertion_index`], counted down
    /// from the zone's high end.
    ///
    /// [`free_insertion_index`]: Self::free_insertion_index
    pub fn used_insertion_index(&self, offset: Address) -> usize {
        (0..self.handle.num_used())
            .take_while(|&i| self.used_at(i).offset() < offset)
            .count()
    }

    /// Insert a free segment, coalescing with whichever neighbors touch
    /// it. This is the allocator's only merge point; after it returns, no
    /// two free entries are adjacent.
    pub fn insert_free(&mut self, seg: SegmentHeader) {
        let index = self.free_insertion_index(seg.offset());
        let num_free = self.handle.num_free();

        let merges_prev = index > 0 && self.free_at(index - 1).end() == seg.offset();
        let merges_next = index < num_free && seg.end() == self.free_at(index).offset();

        if merges_prev && merges_next {
            // grow the predecessor over the new segment and its successor,
            // then drop the absorbed entry
            let absorbed = self.free_at(index).size();
            let grown = self.free_at(index - 1).grown(seg.size() + absorbed);
            self.write(self.free_pos(index - 1), grown);
            self.remove_free(index);
        } else if merges_prev {
            let grown = self.free_at(index - 1).grown(seg.size());
            self.write(self.free_pos(index - 1), grown);
        } else if merges_next {
            let next = self.free_at(index);
            let merged = SegmentHeader::pack(seg.offset(), seg.size() + next.size());
            self.write(self.free_pos(index), merged);
        } else {
            debug_assert!(self.handle.table_len() < self.handle.table_capacity());
            let begin = self.free_pos(index);
            let end = self.free_pos(num_free);
            bytes::copy_backward(self.buf, begin..end, end + HEADER_SIZE);
            self.write(begin, seg);
            self.handle = self.handle.with_counts(num_free + 1, self.handle.num_used());
        }
    }

    /// Insert a used segment at its sorted position. Used entries track
    /// one live allocation each and are never merged.
    pub fn insert_used(&mut self, seg: SegmentHeader) {
        debug_assert!(self.handle.table_len() < self.handle.table_capacity());
        let index = self.used_insertion_index(seg.offset());
        let num_used = self.handle.num_used();

        if index < num_used {
            // entries [index..) slide one slot toward the zone's low end
            let begin = self.used_pos(num_used - 1);
            let end = self.used_pos(index) + HEADER_SIZE;
            bytes::copy(self.buf, begin..end, begin - HEADER_SIZE);
        }
        self.write(self.used_pos(index), seg);
        self.handle = self.handle.with_counts(self.handle.num_free(), num_used + 1);
    }

    /// Remove the free entry at `index`, compacting the table by one slot.
    pub fn remove_free(&mut self, index: usize) {
        let num_free = self.handle.num_free();
        debug_assert!(index < num_free);
        let begin = self.free_pos(index + 1);
        let end = self.free_pos(num_free);
        bytes::copy(self.buf, begin..end, self.free_pos(index));
        self.handle = self.handle.with_counts(num_free - 1, self.handle.num_used());
    }

    /// Remove the used entry at `index`, compacting the table by one slot.
    pub fn remove_used(&mut self, index: usize) {
        let num_used = self.handle.num_used();
        debug_assert!(index < num_used);
        // entries below the removed slot slide one slot toward the high end
        let begin = self.used_pos(num_used - 1);
        let end = self.used_pos(index);
        bytes::copy_backward(self.buf, begin..end, end + HEADER_SIZE);
        self.handle = self.handle.with_counts(self.handle.num_free(), num_used - 1);
    }

    /// Shrink the free entry at `index` in place by `delta` bytes.
    pub fn reduce_free(&mut self, index: usize, delta: Size) {
        let reduced = self.free_at(index).reduced(delta);
        self.write(self.free_pos(index), reduced);
    }

    pub fn is_full(&self) -> bool {
        self.handle.table_len() == self.handle.table_capacity()
    }

    /// Double the table zone when it is full; no-op otherwise.
    ///
    /// The used table grows downward from the zone's high end, so doubling
    /// the zone relocates every used entry to the new high end. The caller
    /// must have ensured the buffer already spans the doubled zone; the
    /// handle only reflects the new size after the relocation completes.
    pub fn expand_if_full(&mut self) {
        if !self.is_full() {
            return;
        }
        let mem_size = self.handle.mem_size();
        let mav_size = self.handle.mav_size();
        let new_mav_size = mav_size * 2;
        assert!(
            self.buf.len() >= mem_size + new_mav_size,
            "arena buffer too small for table growth"
        );

        let used_bytes = self.handle.num_used() * HEADER_SIZE;
        let src_begin = mem_size + mav_size - used_bytes;
        bytes::copy(
            self.buf,
            src_begin..mem_size + mav_size,
            mem_size + new_mav_size - used_bytes,
        );
        self.handle = self.handle.with_mav_size(new_mav_size);
        info!(
            "segment table grown: {} -> {} bytes ({} headers)",
            mav_size,
            new_mav_size,
            self.handle.table_len()
        );
    }
}
