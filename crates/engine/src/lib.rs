//! Artificial-life virtual machine core.
//!
//! This crate implements a Tierra-style evolvable machine with the following:
//! 1. **World:** a flat byte-addressed memory in which every cell carries a
//!    5-bit opcode and an allocation flag, plus a per-opcode histogram.
//! 2. **ISA:** 32 opcodes covering templates, register modifiers, seeker
//!    jumps, incremental allocation, arithmetic, a ring stack, and channel I/O.
//! 3. **Life:** a process table doubling as a FIFO reaper queue; organisms
//!    are born by `SPLT` and culled oldest-first under memory pressure.
//! 4. **Evolver:** a xorshift-128 generator driving one cosmic-ray cell write
//!    and an occasional register mutation per cycle.
//! 5. **Simulation:** `Engine` (owns world + evolver + processes + channel),
//!    the one-cycle step orchestration, and binary snapshot save/load.

/// Common constants (cell flags, sentinels) and error types.
pub mod common;
/// Engine configuration (defaults, JSON deserialization).
pub mod config;
/// Instruction set (opcode enum, modifier arity, predicates, glyphs).
pub mod isa;
/// World memory (cell buffer, allocation flags, opcode histogram, render).
pub mod world;
/// Process descriptors, the process table, and the reaper queue.
pub mod life;
/// The instruction interpreter (dispatch, template search, seeker travel).
pub mod interp;
/// The evolver: xorshift-128 PRNG, cosmic rays, register mutations.
pub mod evolver;
/// The common channel: host-attached byte-in/byte-out functors.
pub mod channel;
/// Simulation driver: `Engine`, cycle orchestration, snapshots.
pub mod sim;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Snapshot I/O failure modes for `Engine::save` / `Engine::load`.
pub use crate::common::error::SnapshotError;
/// Top-level simulation engine; owns the world, evolver, and process table.
pub use crate::sim::engine::Engine;
