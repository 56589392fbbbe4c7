//! Engine: owns all simulation state and drives one cycle at a time.
//!
//! The engine is a single owning value; every subsystem (world, evolver,
//! process table, channel) lives inside it and is mutated only from
//! [`Engine::step`]. Hosts may freely read any state between steps.

use std::path::Path;

use tracing::info;

use crate::channel::{Channel, Receiver, Sender};
use crate::common::error::SnapshotError;
use crate::config::Config;
use crate::evolver::Evolver;
use crate::interp;
use crate::life::ProcessTable;
use crate::world::{self, WorldMemory};

use super::snapshot;

/// The complete artificial-life machine.
///
/// One call to [`Engine::step`] is one simulation cycle: the cycle counter
/// advances (rolling into the epoch counter on wrap), the evolver fires,
/// every live organism executes exactly one instruction in newest-to-oldest
/// reaper order, and finally the reaper culls from the oldest end until the
/// allocated cell count is back within half the world.
#[derive(Debug)]
pub struct Engine {
    pub(crate) cycle: u32,
    pub(crate) epoch: u32,
    pub(crate) memory: WorldMemory,
    pub(crate) evolver: Evolver,
    pub(crate) procs: ProcessTable,
    pub(crate) channel: Channel,
}

impl Engine {
    /// Creates a fresh engine with a zeroed world of `1 << order` cells and
    /// an entropy-seeded evolver.
    ///
    /// # Panics
    ///
    /// Panics when `order` exceeds the maximum world order.
    pub fn new(order: u32) -> Self {
        let engine = Self {
            cycle: 0,
            epoch: 0,
            memory: WorldMemory::new(order),
            evolver: Evolver::new(),
            procs: ProcessTable::new(),
            channel: Channel::new(),
        };
        info!(order, size = engine.memory.size(), "engine initialized");
        engine
    }

    /// Creates a fresh engine from a host configuration.
    pub fn with_config(config: &Config) -> Self {
        let mut engine = Self::new(config.memory.order);
        if let Some(seed) = config.evolver.seed {
            engine.evolver = Evolver::from_seed(seed);
        }
        engine
    }

    /// Restores an engine from a snapshot file.
    ///
    /// The restored engine is bit-identical to the saved one, including the
    /// evolver's generator state; channel functors do not persist and come
    /// back detached.
    ///
    /// # Errors
    ///
    /// Returns a [`SnapshotError`] when the file cannot be read, is
    /// truncated, or violates a structural invariant.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let engine = snapshot::load(path.as_ref())?;
        info!(path = %path.as_ref().display(), cycle = engine.cycle, "engine loaded");
        Ok(engine)
    }

    /// Writes the complete engine state to a snapshot file.
    ///
    /// # Errors
    ///
    /// Returns a [`SnapshotError`] when the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        snapshot::save(self, path.as_ref())?;
        info!(path = %path.as_ref().display(), cycle = self.cycle, "engine saved");
        Ok(())
    }

    /// Returns the cycle counter.
    #[inline]
    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    /// Returns the epoch counter (completed cycle-counter wraps).
    #[inline]
    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Borrows the world memory.
    #[inline]
    pub fn memory(&self) -> &WorldMemory {
        &self.memory
    }

    /// Mutably borrows the world memory, e.g. to write an ancestor organism
    /// into a fresh world.
    #[inline]
    pub fn memory_mut(&mut self) -> &mut WorldMemory {
        &mut self.memory
    }

    /// Borrows the process table.
    #[inline]
    pub fn procs(&self) -> &ProcessTable {
        &self.procs
    }

    /// Mutably borrows the process table.
    #[inline]
    pub fn procs_mut(&mut self) -> &mut ProcessTable {
        &mut self.procs
    }

    /// Borrows the evolver.
    #[inline]
    pub fn evolver(&self) -> &Evolver {
        &self.evolver
    }

    /// Attaches the channel's outbound functor.
    pub fn set_sender(&mut self, sender: Sender) {
        self.channel.set_sender(sender);
    }

    /// Attaches the channel's inbound functor.
    pub fn set_receiver(&mut self, receiver: Receiver) {
        self.channel.set_receiver(receiver);
    }

    /// Births an organism owning `[address, address + size)`, marking every
    /// cell of the block allocated.
    ///
    /// This is the host-facing creation path for seeding ancestors; the
    /// block must be in range and currently unallocated. Organisms
    /// themselves reproduce through `MALB`/`MALF` plus `SPLT` instead.
    ///
    /// # Returns
    ///
    /// The newborn's slot index.
    ///
    /// # Panics
    ///
    /// Panics on a zero-size or out-of-range block.
    pub fn create_process(&mut self, address: u32, size: u32) -> u32 {
        let queue_lock = if self.procs.count() == 0 {
            0
        } else {
            self.procs.head()
        };
        self.procs
            .create(&mut self.memory, address, size, queue_lock, true)
    }

    /// Renders a downsampled world overview; see [`world::render()`].
    pub fn render(&self, origin: u32, cell_size: u32, buff_size: u32) -> Vec<u8> {
        world::render(&self.memory, &self.procs, origin, cell_size, buff_size)
    }

    /// Advances the simulation by one cycle.
    pub fn step(&mut self) {
        self.cycle = self.cycle.wrapping_add(1);
        if self.cycle == 0 {
            self.epoch = self.epoch.wrapping_add(1);
        }

        #[cfg(debug_assertions)]
        self.validate();

        self.evolver.step(&mut self.memory, &mut self.procs);

        // Newest organisms run first. Head and capacity are re-read every
        // iteration: a SPLT birth can grow the table mid-walk, and growth
        // preserves positions relative to the executing slot, so the
        // backward walk stays aligned with the relocated arc.
        if self.procs.count() != 0 {
            let mut pidx = self.procs.tail();
            loop {
                interp::step(pidx, &mut self.memory, &mut self.procs, &mut self.channel);
                if pidx == self.procs.head() {
                    break;
                }
                let cap = self.procs.capacity();
                pidx = (pidx + cap - 1) % cap;
            }
        }

        while self.memory.allocated() > self.memory.capacity() {
            self.procs.reap(&mut self.memory);
        }
    }

    /// Verifies every engine invariant by full enumeration.
    ///
    /// Debug builds run this at the top of every [`Engine::step`]; hosts
    /// may also call it directly after poking at world or process state.
    ///
    /// # Panics
    ///
    /// Panics when any invariant fails.
    pub fn validate(&self) {
        self.memory.validate();
        self.procs.validate(&self.memory);
    }
}
