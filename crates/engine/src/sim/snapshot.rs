//! Binary snapshot encoding and decoding.
//!
//! A snapshot is the complete engine state as a flat little-endian word
//! stream with no padding, in four sections:
//! 1. **engine:** `is_init, cycle, epoch`
//! 2. **memory:** `is_init, order, size, allocated, capacity,
//!    inst_histogram[32], cells[size]`
//! 3. **evolver:** `is_init, last_changed_address, last_changed_process,
//!    state[4]`
//! 4. **processes:** `is_init, count, capacity, head, tail,
//!    descriptors[capacity]` with each descriptor as its 18-word sequence
//!
//! The `is_init` words come from the format's heritage as a dump of
//! per-subsystem state; they are always written as 1 and required to be 1
//! on load. Loading validates the derived counts against the cells by full
//! enumeration, so a tampered or bit-rotted file is rejected rather than
//! resurrected as an inconsistent world.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::channel::Channel;
use crate::common::constants::{ALLOCATED_FLAG, INSTRUCTION_MASK, MAX_ORDER, NONE};
use crate::common::error::SnapshotError;
use crate::evolver::Evolver;
use crate::life::{Process, ProcessTable, process};
use crate::world::WorldMemory;

use super::engine::Engine;

/// Writes the complete engine state to `path`.
pub(crate) fn save(engine: &Engine, path: &Path) -> Result<(), SnapshotError> {
    let mut w = BufWriter::new(File::create(path)?);

    // Section 1: engine counters.
    put_u32(&mut w, 1)?;
    put_u32(&mut w, engine.cycle)?;
    put_u32(&mut w, engine.epoch)?;

    // Section 2: world memory.
    let mem = &engine.memory;
    put_u32(&mut w, 1)?;
    put_u32(&mut w, mem.order())?;
    put_u32(&mut w, mem.size())?;
    put_u32(&mut w, mem.allocated())?;
    put_u32(&mut w, mem.capacity())?;
    for op in crate::isa::ALL {
        put_u32(&mut w, mem.inst_count(op))?;
    }
    w.write_all(mem.cells())?;

    // Section 3: evolver.
    let evolver = &engine.evolver;
    put_u32(&mut w, 1)?;
    put_u32(&mut w, evolver.last_changed_address)?;
    put_u32(&mut w, evolver.last_changed_process)?;
    for word in evolver.state() {
        put_u32(&mut w, word)?;
    }

    // Section 4: process table.
    let procs = &engine.procs;
    put_u32(&mut w, 1)?;
    put_u32(&mut w, procs.count())?;
    put_u32(&mut w, procs.capacity())?;
    put_u32(&mut w, procs.head())?;
    put_u32(&mut w, procs.tail())?;
    for proc in procs.slots() {
        for word in proc.to_words() {
            put_u32(&mut w, word)?;
        }
    }

    w.flush()?;
    Ok(())
}

/// Reads a complete engine state from `path`.
pub(crate) fn load(path: &Path) -> Result<Engine, SnapshotError> {
    let mut r = BufReader::new(File::open(path)?);

    // Section 1: engine counters.
    require_init(&mut r, "engine section not initialized")?;
    let cycle = get_u32(&mut r)?;
    let epoch = get_u32(&mut r)?;

    // Section 2: world memory.
    require_init(&mut r, "memory section not initialized")?;
    let order = get_u32(&mut r)?;
    if order > MAX_ORDER {
        return Err(SnapshotError::Corrupt("world order out of range"));
    }
    let size = get_u32(&mut r)?;
    if size != 1u32 << order {
        return Err(SnapshotError::Corrupt("world size disagrees with order"));
    }
    let allocated = get_u32(&mut r)?;
    let capacity = get_u32(&mut r)?;
    if capacity != size / 2 {
        return Err(SnapshotError::Corrupt("capacity disagrees with size"));
    }
    let mut counts = [0u32; crate::isa::OPCODE_COUNT];
    for count in &mut counts {
        *count = get_u32(&mut r)?;
    }
    let mut cells = vec![0u8; size as usize];
    r.read_exact(&mut cells).map_err(eof_as_truncated)?;

    // Recount the derived memory state from the cells themselves.
    let mut seen_counts = [0u32; crate::isa::OPCODE_COUNT];
    let mut seen_allocated = 0u32;
    for &cell in &cells {
        if cell & !(INSTRUCTION_MASK | ALLOCATED_FLAG) != 0 {
            return Err(SnapshotError::Corrupt("cell carries render-only bits"));
        }
        seen_counts[(cell & INSTRUCTION_MASK) as usize] += 1;
        if cell & ALLOCATED_FLAG != 0 {
            seen_allocated += 1;
        }
    }
    if seen_counts != counts {
        return Err(SnapshotError::Corrupt("opcode histogram disagrees with cells"));
    }
    if seen_allocated != allocated {
        return Err(SnapshotError::Corrupt("allocated count disagrees with cells"));
    }
    let memory = WorldMemory::from_parts(order, &cells, allocated, counts);

    // Section 3: evolver.
    require_init(&mut r, "evolver section not initialized")?;
    let last_changed_address = get_u32(&mut r)?;
    let last_changed_process = get_u32(&mut r)?;
    let mut state = [0u32; 4];
    for word in &mut state {
        *word = get_u32(&mut r)?;
    }
    let evolver = Evolver::from_parts(state, last_changed_address, last_changed_process);

    // Section 4: process table.
    require_init(&mut r, "process section not initialized")?;
    let count = get_u32(&mut r)?;
    let proc_capacity = get_u32(&mut r)?;
    let head = get_u32(&mut r)?;
    let tail = get_u32(&mut r)?;
    if proc_capacity == 0 {
        return Err(SnapshotError::Corrupt("process table has no slots"));
    }
    if count > proc_capacity {
        return Err(SnapshotError::Corrupt("process count exceeds capacity"));
    }
    if count == 0 {
        if head != NONE || tail != NONE {
            return Err(SnapshotError::Corrupt("empty table with queue indices"));
        }
    } else {
        if head >= proc_capacity || tail >= proc_capacity {
            return Err(SnapshotError::Corrupt("queue index out of range"));
        }
        let arc = (tail + proc_capacity - head) % proc_capacity + 1;
        if arc != count {
            return Err(SnapshotError::Corrupt("queue arc disagrees with count"));
        }
    }
    let mut slots = Vec::with_capacity(proc_capacity as usize);
    for _ in 0..proc_capacity {
        let mut words = [0u32; process::WORDS];
        for word in &mut words {
            *word = get_u32(&mut r)?;
        }
        slots.push(Process::from_words(words));
    }
    let procs = ProcessTable::from_parts(slots, count, head, tail);

    Ok(Engine {
        cycle,
        epoch,
        memory,
        evolver,
        procs,
        channel: Channel::new(),
    })
}

/// Writes one little-endian word.
fn put_u32(w: &mut impl Write, value: u32) -> Result<(), SnapshotError> {
    w.write_all(&value.to_le_bytes())?;
    Ok(())
}

/// Reads one little-endian word; an early end of file is [`SnapshotError::Truncated`].
fn get_u32(r: &mut impl Read) -> Result<u32, SnapshotError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf).map_err(eof_as_truncated)?;
    Ok(u32::from_le_bytes(buf))
}

/// Reads and checks one `is_init` word.
fn require_init(r: &mut impl Read, message: &'static str) -> Result<(), SnapshotError> {
    if get_u32(r)? == 1 {
        Ok(())
    } else {
        Err(SnapshotError::Corrupt(message))
    }
}

/// Maps an unexpected end of file to the truncation error.
fn eof_as_truncated(err: std::io::Error) -> SnapshotError {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        SnapshotError::Truncated
    } else {
        SnapshotError::Io(err)
    }
}
