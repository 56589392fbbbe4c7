//! Common definitions shared across the engine.
//!
//! This module collects the pieces every subsystem relies on:
//! 1. **Constants:** cell flag bits, the instruction mask, sentinels.
//! 2. **Errors:** snapshot I/O and corruption error types.

/// Cell flag bits, masks, and index sentinels.
pub mod constants;

/// Error types for snapshot save/load.
pub mod error;
