//! World memory.
//!
//! This module owns the flat byte-addressed world the organisms live in. It
//! provides:
//! 1. **Cell buffer:** the raw backing store, lazily allocated via `mmap` on
//!    Unix so large worlds cost nothing until touched.
//! 2. **Memory:** cell accessors, the per-byte allocation flag, the global
//!    per-opcode histogram, and the histogram-preserving write primitive.
//! 3. **Render:** a pure downsampling pass producing overview buffers for
//!    host visualizers.

/// Raw zero-initialized cell backing store.
pub mod buffer;

/// The world memory proper: cells, flags, histogram.
pub mod memory;

/// Downsampled world overview rendering.
pub mod render;

pub use buffer::CellBuffer;
pub use memory::WorldMemory;
pub use render::render;
