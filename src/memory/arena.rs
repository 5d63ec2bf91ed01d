/*!
 * Arena Allocator
 *
 * A flat byte arena with bit-packed in-band bookkeeping. The buffer is
 * split into a power-of-two data zone followed by the metadata zone
 * holding both segment tables; the packed handle records zone sizes and
 * table counts. All allocation state lives inside the arena itself.
 *
 * Addresses handed out by [`Arena::allocate`] are byte offsets from the
 * arena base. Raw bytes are reached only through the explicit accessors,
 * which keeps the table logic pointer-free and lets the backing buffer
 * grow without invalidating outstanding addresses.
 */

use crate::bytes;
use crate::core::limits::{
    BLOCK_ALIGN, BLOCK_ALIGN_LOG2, FILL_BYTE, HEADER_SIZE, INITIAL_TABLE_SIZE, MAX_DATA_ZONE,
};
use crate::core::types::{Address, Size};
use log::{debug, error, info, warn};

use super::codec::{ArenaHandle, SegmentHeader};
use super::table::SegmentTable;
use super::types::{ArenaError, ArenaResult, ArenaStats, Segment};

pub struct Arena {
    buf: Vec<u8>,
    handle: ArenaHandle,
}

impl Arena {
    /// A fresh, uninitialized arena. No backing memory is reserved until
    /// [`init`](Self::init) runs.
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            handle: ArenaHandle::UNINITIALIZED,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.handle.is_initialized()
    }

    /// Set up the arena for `requested_size` bytes of allocatable memory.
    ///
    /// The data zone is `requested_size` rounded up to a power of two (at
    /// least one 8-byte block); the initial table zone is 4096 bytes. The
    /// whole region is filled with the `-` sentinel and a single free
    /// segment covering the data zone is recorded.
    ///
    /// Returns [`ArenaError::AlreadyInitialized`] without touching any
    /// state if a previous `init` is still live.
    pub fn init(&mut self, requested_size: Size) -> ArenaResult<()> {
        if self.handle.is_initialized() {
            warn!("init refused: arena already initialized");
            return Err(ArenaError::AlreadyInitialized {
                mem_size: self.handle.mem_size(),
                mav_size: self.handle.mav_size(),
            });
        }
        let mem_size = bytes::pow2_ceiling(requested_size.max(BLOCK_ALIGN));
        assert!(mem_size <= MAX_DATA_ZONE, "data zone exceeds header encoding range");

        self.buf.clear();
        self.buf.resize(mem_size + INITIAL_TABLE_SIZE, FILL_BYTE);

        let handle = ArenaHandle::pack(mem_size, INITIAL_TABLE_SIZE, 0, 0);
        let mut table = SegmentTable::new(handle, &mut self.buf);
        table.insert_free(SegmentHeader::pack(0, mem_size));
        self.handle = table.handle();

        info!(
            "arena initialized: {} data bytes, {} table bytes",
            mem_size, INITIAL_TABLE_SIZE
        );
        Ok(())
    }

    /// Drop logical ownership of the arena by zeroing the handle. The
    /// bytes themselves are left untouched to aid post-mortem inspection.
    pub fn deinit(&mut self) {
        info!("arena deinitialized");
        self.handle = ArenaHandle::UNINITIALIZED;
    }

    /// Allocate `size` bytes, rounded up to a multiple of 8.
    ///
    /// First-fit over the free table in ascending-offset order; the block
    /// is carved from the *top* of the chosen free segment so the segment's
    /// offset stays put. A zero-size request is served as a minimum 8-byte
    /// block, guaranteeing a unique non-aliasing address.
    pub fn allocate(&mut self, size: Size) -> ArenaResult<Address> {
        self.assert_initialized();
        if size.checked_add(BLOCK_ALIGN - 1).is_none() {
            return Err(self.out_of_memory(size));
        }
        let rounded = bytes::next_multiple_of_pow2(size.max(1), BLOCK_ALIGN_LOG2);

        let found = SegmentTable::new(self.handle, &mut self.buf).find_free(rounded);
        let Some(index) = found else {
            let err = self.out_of_memory(rounded);
            error!("{err}");
            return Err(err);
        };

        // the used table needs a slot before the split is committed
        self.grow_table_if_full();

        let mut table = SegmentTable::new(self.handle, &mut self.buf);
        let free = table.free_at(index);
        let offset = if free.size() == rounded {
            table.remove_free(index);
            free.offset()
        } else {
            table.reduce_free(index, rounded);
            free.offset() + free.size() - rounded
        };
        table.insert_used(SegmentHeader::pack(offset, rounded));
        self.handle = table.handle();

        debug!("allocated {} bytes at offset 0x{:x}", rounded, offset);
        Ok(offset)
    }

    /// [`allocate`](Self::allocate), then fill the block with `byte`.
    pub fn allocate_filled(&mut self, size: Size, byte: u8) -> ArenaResult<Address> {
        let address = self.allocate(size)?;
        let rounded = bytes::next_multiple_of_pow2(size.max(1), BLOCK_ALIGN_LOG2);
        bytes::fill(&mut self.buf, address..address + rounded, byte);
        Ok(address)
    }

    /// Return the block starting at `address` to the free table.
    ///
    /// The freed range is overwritten with the `-` sentinel and the free
    /// table is re-coalesced. Returns [`ArenaError::InvalidFree`] without
    /// any state change when no allocation starts at `address`.
    pub fn deallocate(&mut self, address: Address) -> ArenaResult<()> {
        self.assert_initialized();
        let found = {
            let table = SegmentTable::new(self.handle, &mut self.buf);
            table.find_used(address).map(|index| (index, table.used_at(index)))
        };
        let Some((index, seg)) = found else {
            warn!("invalid free: no allocation at offset 0x{:x}", address);
            return Err(ArenaError::InvalidFree { address });
        };

        bytes::fill(&mut self.buf, seg.offset()..seg.end(), FILL_BYTE);
        let mut table = SegmentTable::new(self.handle, &mut self.buf);
        table.remove_used(index);
        table.insert_free(seg);
        self.handle = table.handle();

        debug!("freed {} bytes at offset 0x{:x}", seg.size(), seg.offset());
        Ok(())
    }

    /// The current packed handle; decode it with the [`ArenaHandle`]
    /// accessors.
    pub fn handle(&self) -> ArenaHandle {
        self.handle
    }

    /// Free segments in ascending-offset order.
    pub fn free_segments(&self) -> impl Iterator<Item = Segment> + '_ {
        let base = self.handle.mem_size();
        (0..self.handle.num_free()).map(move |i| self.header_at(base + i * HEADER_SIZE).decode())
    }

    /// Used segments in ascending-offset order (index 0 sits nearest the
    /// metadata zone's high end).
    pub fn used_segments(&self) -> impl Iterator<Item = Segment> + '_ {
        let end = self.handle.mem_size() + self.handle.mav_size();
        (0..self.handle.num_used()).map(move |i| self.header_at(end - (i + 1) * HEADER_SIZE).decode())
    }

    pub fn stats(&self) -> ArenaStats {
        let total = self.handle.mem_size();
        let available: Size = self.free_segments().map(|s| s.size).sum();
        let largest = self.free_segments().map(|s| s.size).max().unwrap_or(0);
        let used = total - available;
        ArenaStats {
            total_memory: total,
            used_memory: used,
            available_memory: available,
            usage_percentage: (used as f64 / total as f64) * 100.0,
            table_capacity: self.handle.table_capacity(),
            free_segments: self.handle.num_free(),
            used_segments: self.handle.num_used(),
            largest_free_segment: largest,
        }
    }

    /// Memory info as (total, used, available).
    pub fn info(&self) -> (Size, Size, Size) {
        let stats = self.stats();
        (stats.total_memory, stats.used_memory, stats.available_memory)
    }

    /// Bytes of an allocated block, for reading at the boundary.
    pub fn data(&self, address: Address, len: Size) -> &[u8] {
        debug_assert!(address + len <= self.handle.mem_size());
        &self.buf[address..address + len]
    }

    /// Mutable bytes of an allocated block.
    pub fn data_mut(&mut self, address: Address, len: Size) -> &mut [u8] {
        debug_assert!(address + len <= self.handle.mem_size());
        &mut self.buf[address..address + len]
    }

    /// The entire arena image, metadata zone included. Introspection for
    /// tooling and tests comparing raw bytes.
    pub fn raw(&self) -> &[u8] {
        &self.buf
    }

    fn assert_initialized(&self) {
        assert!(self.handle.is_initialized(), "arena not initialized");
    }

    fn header_at(&self, pos: usize) -> SegmentHeader {
        let mut word = [0u8; HEADER_SIZE];
        word.copy_from_slice(&self.buf[pos..pos + HEADER_SIZE]);
        SegmentHeader::from_raw(u64::from_ne_bytes(word))
    }

    /// Double the table zone when it is full, enlarging the backing
    /// buffer first so the relocation always has room.
    fn grow_table_if_full(&mut self) {
        if self.handle.table_len() < self.handle.table_capacity() {
            return;
        }
        let new_len = self.handle.mem_size() + self.handle.mav_size() * 2;
        self.buf.resize(new_len, FILL_BYTE);
        let mut table = SegmentTable::new(self.handle, &mut self.buf);
        table.expand_if_full();
        self.handle = table.handle();
    }

    fn out_of_memory(&self, requested: Size) -> ArenaError {
        ArenaError::OutOfMemory {
            requested,
            available: self.free_segments().map(|s| s.size).sum(),
            fragments: self.handle.num_free(),
        }
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}
