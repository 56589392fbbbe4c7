//! Simulation driver.
//!
//! This module owns the top level of the machine:
//! 1. **Engine:** the owning value holding world, evolver, process table,
//!    and channel, plus the cycle/epoch counters and the one-cycle step.
//! 2. **Snapshot:** binary save/load of the complete engine state.

/// The engine: state ownership and cycle orchestration.
pub mod engine;

/// Binary snapshot encoding and decoding.
pub mod snapshot;
