//! World memory: cells, allocation flags, and the opcode histogram.
//!
//! This module implements the byte-addressed world. It maintains three
//! pieces of state in lockstep:
//! 1. **Cells:** one byte per address; the low five bits are the opcode and
//!    bit `0x20` marks the cell as owned by a live organism.
//! 2. **Histogram:** for each opcode, the number of cells currently holding
//!    it; the sum over all opcodes always equals the world size.
//! 3. **Allocation count:** the number of cells with the owned flag set.
//!
//! Every mutating accessor preserves these invariants atomically, so any
//! observer between mutations sees a consistent world.

use crate::common::constants::{ALLOCATED_FLAG, INSTRUCTION_MASK, MAX_ORDER};
use crate::isa::{OPCODE_COUNT, Opcode};

use super::buffer::CellBuffer;

/// The flat byte-addressed world.
///
/// Addresses are `u32` and valid in `[0, size)`. All accessors assert
/// validity; passing an out-of-range address is a programmer error, not an
/// in-simulation fault.
#[derive(Debug)]
pub struct WorldMemory {
    order: u32,
    cells: CellBuffer,
    allocated: u32,
    inst_counts: [u32; OPCODE_COUNT],
}

impl WorldMemory {
    /// Creates a zeroed world of `1 << order` cells.
    ///
    /// A fresh world holds `NOP0` everywhere with nothing allocated, so the
    /// histogram starts as `[size, 0, 0, ...]`.
    ///
    /// # Arguments
    ///
    /// * `order` - World order in `[0, 31]`.
    ///
    /// # Panics
    ///
    /// Panics when `order` exceeds [`MAX_ORDER`].
    pub fn new(order: u32) -> Self {
        assert!(order <= MAX_ORDER, "world order {order} out of range");
        let size = 1u32 << order;
        let mut inst_counts = [0u32; OPCODE_COUNT];
        inst_counts[0] = size;
        Self {
            order,
            cells: CellBuffer::new(size as usize),
            allocated: 0,
            inst_counts,
        }
    }

    /// Returns the world order.
    #[inline]
    pub fn order(&self) -> u32 {
        self.order
    }

    /// Returns the number of cells in the world.
    #[inline]
    pub fn size(&self) -> u32 {
        1u32 << self.order
    }

    /// Returns the allocation capacity (half the world size).
    ///
    /// The reaper culls organisms whenever the allocated count exceeds this.
    #[inline]
    pub fn capacity(&self) -> u32 {
        self.size() / 2
    }

    /// Returns the number of cells whose allocation flag is set.
    #[inline]
    pub fn allocated(&self) -> u32 {
        self.allocated
    }

    /// Returns the number of cells currently holding `op`.
    #[inline]
    pub fn inst_count(&self, op: Opcode) -> u32 {
        self.inst_counts[op as usize]
    }

    /// Returns whether `addr` names a cell.
    #[inline]
    pub fn is_valid(&self, addr: u32) -> bool {
        addr < self.size()
    }

    /// Reads the raw cell byte at `addr` (opcode plus flag bits).
    ///
    /// # Panics
    ///
    /// Panics on an invalid address.
    #[inline]
    pub fn byte_at(&self, addr: u32) -> u8 {
        self.cells.get(addr as usize)
    }

    /// Reads the opcode stored at `addr`.
    ///
    /// # Panics
    ///
    /// Panics on an invalid address.
    #[inline]
    pub fn inst_at(&self, addr: u32) -> Opcode {
        Opcode::from_cell(self.cells.get(addr as usize))
    }

    /// Returns whether the cell at `addr` is owned by a live organism.
    ///
    /// # Panics
    ///
    /// Panics on an invalid address.
    #[inline]
    pub fn is_allocated(&self, addr: u32) -> bool {
        self.cells.get(addr as usize) & ALLOCATED_FLAG != 0
    }

    /// Writes `op` into the cell at `addr`, preserving the allocation flag
    /// and keeping the histogram consistent.
    ///
    /// # Panics
    ///
    /// Panics on an invalid address.
    pub fn set_inst(&mut self, addr: u32, op: Opcode) {
        let index = addr as usize;
        let old = self.cells.get(index);
        self.inst_counts[(old & INSTRUCTION_MASK) as usize] -= 1;
        self.inst_counts[op as usize] += 1;
        self.cells.set(index, (old & ALLOCATED_FLAG) | op as u8);
    }

    /// Sets the allocation flag on the cell at `addr`.
    ///
    /// The caller guarantees the cell is currently unallocated.
    ///
    /// # Panics
    ///
    /// Panics on an invalid address.
    pub fn set_allocated(&mut self, addr: u32) {
        let index = addr as usize;
        let cell = self.cells.get(index);
        debug_assert!(cell & ALLOCATED_FLAG == 0, "cell {addr} already owned");
        self.cells.set(index, cell | ALLOCATED_FLAG);
        self.allocated += 1;
    }

    /// Clears the allocation flag on the cell at `addr`.
    ///
    /// The caller guarantees the cell is currently allocated.
    ///
    /// # Panics
    ///
    /// Panics on an invalid address.
    pub fn clear_allocated(&mut self, addr: u32) {
        let index = addr as usize;
        let cell = self.cells.get(index);
        debug_assert!(cell & ALLOCATED_FLAG != 0, "cell {addr} not owned");
        self.cells.set(index, cell & !ALLOCATED_FLAG);
        self.allocated -= 1;
    }

    /// Returns the whole cell array (for snapshot writes).
    pub fn cells(&self) -> &[u8] {
        self.cells.as_slice()
    }

    /// Rebuilds a world from snapshot state.
    ///
    /// The caller (the snapshot loader) has already validated that the
    /// histogram and allocation count match the cell contents.
    pub(crate) fn from_parts(
        order: u32,
        cells: &[u8],
        allocated: u32,
        inst_counts: [u32; OPCODE_COUNT],
    ) -> Self {
        let mut buffer = CellBuffer::new(cells.len());
        buffer.copy_from_slice(cells);
        Self {
            order,
            cells: buffer,
            allocated,
            inst_counts,
        }
    }

    /// Verifies the histogram and allocation count by full enumeration.
    ///
    /// Debug builds run this every cycle; it is deliberately a brute-force
    /// recount so it cannot share a bug with the incremental bookkeeping.
    ///
    /// # Panics
    ///
    /// Panics when either derived count disagrees with the cells.
    pub fn validate(&self) {
        let mut counts = [0u32; OPCODE_COUNT];
        let mut allocated = 0u32;
        for &cell in self.cells.as_slice() {
            counts[(cell & INSTRUCTION_MASK) as usize] += 1;
            if cell & ALLOCATED_FLAG != 0 {
                allocated += 1;
            }
        }
        assert!(counts == self.inst_counts, "opcode histogram out of sync");
        assert!(
            allocated == self.allocated,
            "allocation count out of sync: {} cells flagged, {} recorded",
            allocated,
            self.allocated
        );
    }
}
