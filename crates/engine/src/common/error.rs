//! Snapshot error definitions.
//!
//! In-simulation faults (bad operands, invalid addresses, division by zero)
//! are never surfaced as Rust errors: they consume the faulting organism's
//! cycle and advance its instruction pointer. The only fallible engine
//! operations are snapshot save and load, reported through [`SnapshotError`].
//! Engine misuse (invalid order, out-of-range addresses, zero-size births)
//! is a programmer error and panics.

use thiserror::Error;

/// Failure modes of `Engine::save` and `Engine::load`.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The underlying file could not be read or written.
    #[error("snapshot i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// The file ended before the declared state was fully read.
    #[error("snapshot file is truncated")]
    Truncated,

    /// A structural invariant of the snapshot did not hold.
    #[error("snapshot file is corrupt: {0}")]
    Corrupt(&'static str),
}
