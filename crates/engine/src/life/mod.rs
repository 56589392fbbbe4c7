//! Organisms: descriptors, the process table, and the reaper queue.
//!
//! This module owns everything about who is alive:
//! 1. **Descriptor:** the fixed-shape register file of one organism.
//! 2. **Table:** a growable array of descriptors that doubles as a circular
//!    FIFO "reaper queue" ordered by age; the oldest organism sits at the
//!    head and dies first under memory pressure.

/// The per-organism descriptor.
pub mod process;

/// The process table and reaper queue.
pub mod table;

pub use process::{NUM_STACK, Process};
pub use table::ProcessTable;
