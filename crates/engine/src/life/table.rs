//! The process table and reaper queue.
//!
//! The table is a contiguous descriptor array threaded by three indices
//! (`count`, `head`, `tail`) into a circular FIFO queue ordered by age:
//! 1. **Birth** appends at the tail (newest).
//! 2. **Death** always consumes the head (oldest).
//! 3. **Growth** doubles the array when full, preserving the slot index of
//!    one caller-chosen live process (the "queue lock") so an organism that
//!    triggers growth mid-instruction keeps its own identity.
//!
//! Live slots always form one contiguous arc `head..=tail` modulo the
//! capacity; every free slot is all-zero. Processes are identified by slot
//! index everywhere in the engine; raw references would dangle across
//! growth.

use tracing::{debug, trace};

use crate::common::constants::NONE;
use crate::world::WorldMemory;

use super::process::Process;

/// Growable circular table of organism descriptors.
#[derive(Debug)]
pub struct ProcessTable {
    procs: Vec<Process>,
    count: u32,
    head: u32,
    tail: u32,
}

impl Default for ProcessTable {
    /// Returns the default value.
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessTable {
    /// Creates an empty table with capacity for one descriptor.
    pub fn new() -> Self {
        Self {
            procs: vec![Process::default(); 1],
            count: 0,
            head: NONE,
            tail: NONE,
        }
    }

    /// Number of live organisms.
    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Current slot capacity.
    #[inline]
    pub fn capacity(&self) -> u32 {
        self.procs.len() as u32
    }

    /// Index of the oldest live organism, or [`NONE`] when empty.
    #[inline]
    pub fn head(&self) -> u32 {
        self.head
    }

    /// Index of the newest live organism, or [`NONE`] when empty.
    #[inline]
    pub fn tail(&self) -> u32 {
        self.tail
    }

    /// Returns whether slot `pidx` holds no organism.
    ///
    /// # Panics
    ///
    /// Panics when `pidx` is not a slot index.
    #[inline]
    pub fn is_free(&self, pidx: u32) -> bool {
        self.procs[pidx as usize].is_free()
    }

    /// Reads the descriptor in slot `pidx`.
    ///
    /// # Panics
    ///
    /// Panics when `pidx` is not a slot index.
    #[inline]
    pub fn get(&self, pidx: u32) -> &Process {
        &self.procs[pidx as usize]
    }

    /// Mutably borrows the descriptor in slot `pidx`.
    ///
    /// # Panics
    ///
    /// Panics when `pidx` is not a slot index.
    #[inline]
    pub fn get_mut(&mut self, pidx: u32) -> &mut Process {
        &mut self.procs[pidx as usize]
    }

    /// Doubles the capacity, keeping `queue_lock` at its slot index.
    ///
    /// The live arc is re-laid-out around the locked slot: descriptors from
    /// `queue_lock` forward to the tail land at `queue_lock, queue_lock + 1,
    /// ...` in the new array, and descriptors from `queue_lock` backward to
    /// the head land at `queue_lock - 1, queue_lock - 2, ...` modulo the new
    /// capacity. Relative positions are preserved on both sides, so walkers
    /// that address processes as "locked slot minus k" stay consistent
    /// across the growth.
    fn grow(&mut self, queue_lock: u32) {
        debug_assert!(self.count == self.capacity(), "growing a non-full table");
        debug_assert!(!self.is_free(queue_lock), "queue lock on a free slot");

        let old_cap = self.capacity();
        let new_cap = old_cap * 2;
        let mut procs = vec![Process::default(); new_cap as usize];

        // Forward arc: queue_lock..=tail keeps its starting index.
        let mut src = queue_lock;
        let mut dst = queue_lock;
        loop {
            procs[dst as usize] = self.procs[src as usize];
            if src == self.tail {
                break;
            }
            src = (src + 1) % old_cap;
            dst = (dst + 1) % new_cap;
        }
        let tail = dst;

        // Backward arc: queue_lock - 1 down to head.
        let mut head = queue_lock;
        let mut src = queue_lock;
        let mut dst = queue_lock;
        while src != self.head {
            src = (src + old_cap - 1) % old_cap;
            dst = (dst + new_cap - 1) % new_cap;
            procs[dst as usize] = self.procs[src as usize];
            head = dst;
        }

        debug!(old_cap, new_cap, queue_lock, "process table grown");
        self.procs = procs;
        self.head = head;
        self.tail = tail;
    }

    /// Gives birth to an organism owning `[address, address + size)`.
    ///
    /// With `mark_allocated`, every cell of the block gains the allocation
    /// flag; the caller guarantees the block is in range and previously
    /// unallocated. Without it the block is assumed already allocated (the
    /// parent built it one cell at a time).
    ///
    /// When the table is full it grows first, with `queue_lock` naming the
    /// live slot whose index must survive the growth; a splitting parent
    /// passes its own index here.
    ///
    /// # Arguments
    ///
    /// * `mem` - World memory, for allocation flagging.
    /// * `address` - First cell of the newborn's block.
    /// * `size` - Block length in cells; must be nonzero.
    /// * `queue_lock` - Live slot index pinned across any growth (ignored
    ///   when the table is empty).
    /// * `mark_allocated` - Whether to set the block's allocation flags.
    ///
    /// # Returns
    ///
    /// The newborn's slot index.
    ///
    /// # Panics
    ///
    /// Panics on a zero-size or out-of-range block.
    pub fn create(
        &mut self,
        mem: &mut WorldMemory,
        address: u32,
        size: u32,
        queue_lock: u32,
        mark_allocated: bool,
    ) -> u32 {
        assert!(size != 0, "organism block must be nonempty");
        assert!(
            mem.is_valid(address) && size <= mem.size() - address,
            "organism block [{address}, {address} + {size}) out of range"
        );

        if mark_allocated {
            for addr in address..address + size {
                mem.set_allocated(addr);
            }
        }

        if self.count == self.capacity() {
            self.grow(queue_lock);
        }

        let slot = if self.count == 0 {
            self.head = 0;
            self.tail = 0;
            0
        } else {
            self.tail = (self.tail + 1) % self.capacity();
            self.tail
        };
        self.count += 1;

        let proc = &mut self.procs[slot as usize];
        debug_assert!(proc.is_free(), "birth into an occupied slot");
        proc.mb1a = address;
        proc.mb1s = size;
        proc.ip = address;
        proc.sp = address;

        trace!(slot, address, size, "organism born");
        slot
    }

    /// Kills the organism at the head of the reaper queue.
    ///
    /// Frees every cell of its memory blocks, zeroes the descriptor, and
    /// advances the head (or resets both indices to the sentinel when the
    /// table empties).
    ///
    /// # Panics
    ///
    /// Panics when the table is empty.
    pub fn reap(&mut self, mem: &mut WorldMemory) {
        assert!(self.count != 0, "reaping an empty table");

        let slot = self.head;
        let proc = self.procs[slot as usize];
        for addr in proc.mb1a..proc.mb1a + proc.mb1s {
            mem.clear_allocated(addr);
        }
        if proc.mb2s != 0 {
            for addr in proc.mb2a..proc.mb2a + proc.mb2s {
                mem.clear_allocated(addr);
            }
        }

        self.procs[slot as usize] = Process::default();
        self.count -= 1;
        if self.count == 0 {
            self.head = NONE;
            self.tail = NONE;
        } else {
            self.head = (self.head + 1) % self.capacity();
        }

        trace!(slot, "organism reaped");
    }

    /// Verifies every table invariant by full enumeration.
    ///
    /// Debug builds run this every cycle. Checks, for every live process:
    /// valid `ip`/`sp`, fully in-range and fully-allocated memory blocks,
    /// distinct block addresses when a child block exists; plus the arc
    /// shape of the live slots, all-zero free slots, and agreement between
    /// the world's allocation count and the sum of live block sizes. The
    /// sum check also forces pairwise block disjointness: overlapping live
    /// blocks would make the sum exceed the number of flagged cells.
    ///
    /// # Panics
    ///
    /// Panics when any invariant fails.
    pub fn validate(&self, mem: &WorldMemory) {
        if self.count == 0 {
            assert!(self.head == NONE && self.tail == NONE, "stale queue indices");
        } else {
            let cap = self.capacity();
            assert!(self.head < cap && self.tail < cap, "queue indices out of range");
            let arc_len = (self.tail + cap - self.head) % cap + 1;
            assert!(arc_len == self.count, "live slots do not form the queue arc");
        }

        let mut owned = 0u64;
        for (idx, proc) in self.procs.iter().enumerate() {
            let live = if self.count == 0 {
                false
            } else {
                let cap = self.capacity();
                let offset = (idx as u32 + cap - self.head) % cap;
                offset < self.count
            };

            if !live {
                assert!(
                    *proc == Process::default(),
                    "free slot {idx} is not all-zero"
                );
                continue;
            }

            assert!(!proc.is_free(), "live slot {idx} has no block");
            assert!(mem.is_valid(proc.ip), "slot {idx}: ip out of range");
            assert!(mem.is_valid(proc.sp), "slot {idx}: sp out of range");
            Self::validate_block(mem, proc.mb1a, proc.mb1s, idx);
            if proc.mb2s != 0 {
                Self::validate_block(mem, proc.mb2a, proc.mb2s, idx);
                assert!(proc.mb1a != proc.mb2a, "slot {idx}: blocks share an address");
            }
            owned += u64::from(proc.mb1s) + u64::from(proc.mb2s);
        }

        assert!(
            owned == u64::from(mem.allocated()),
            "live blocks own {owned} cells but the world has {} allocated",
            mem.allocated()
        );
    }

    /// Checks one memory block: in range and every cell allocated.
    fn validate_block(mem: &WorldMemory, address: u32, size: u32, idx: usize) {
        assert!(
            mem.is_valid(address) && size <= mem.size() - address,
            "slot {idx}: block out of range"
        );
        for addr in address..address + size {
            assert!(mem.is_allocated(addr), "slot {idx}: cell {addr} not flagged");
        }
    }

    /// Rebuilds a table from snapshot state.
    pub(crate) fn from_parts(procs: Vec<Process>, count: u32, head: u32, tail: u32) -> Self {
        Self {
            procs,
            count,
            head,
            tail,
        }
    }

    /// Returns the raw descriptor array (for snapshot writes).
    pub(crate) fn slots(&self) -> &[Process] {
        &self.procs
    }
}
