//! The instruction interpreter.
//!
//! This module executes one instruction for one organism per engine cycle.
//! It implements:
//! 1. **Dispatch:** the 32-opcode decode-and-execute step.
//! 2. **Register resolution:** instructions taking registers are followed in
//!    memory by that many modifier cells; a malformed modifier list faults.
//! 3. **Fault semantics:** faults consume the cycle and advance `ip`; they
//!    never kill the organism and never surface to the host. A fault before
//!    modifiers resolve advances one cell; a fault after resolution advances
//!    past the modifiers, the same distance as a successful commit.
//! 4. **The ip/sp contract:** every `ip` advance drags the seeker pointer to
//!    the new `ip`; seeker travel cycles move `sp` alone.

/// Seeker-pointer operations (jumps, address search, allocation, transfer).
pub mod seek;

/// Template measurement and complement matching.
pub mod template;

use crate::channel::Channel;
use crate::isa::{OPCODE_COUNT, Opcode};
use crate::life::{NUM_STACK, Process, ProcessTable};
use crate::world::WorldMemory;

/// Executes one instruction for the organism in slot `pidx`.
///
/// # Arguments
///
/// * `pidx` - Slot index of a live organism.
/// * `mem` - World memory.
/// * `procs` - Process table; mutated by `SPLT` births.
/// * `channel` - The common channel used by `SEND`/`RECV`.
///
/// # Panics
///
/// Panics when `pidx` is free or out of range.
pub fn step(pidx: u32, mem: &mut WorldMemory, procs: &mut ProcessTable, channel: &mut Channel) {
    assert!(!procs.is_free(pidx), "stepping a free process slot");

    // Work on a descriptor copy: a SPLT birth may grow the table and move
    // every other slot, but the executing slot index is pinned by the queue
    // lock, so writing the copy back at the end is always correct.
    let mut proc = *procs.get(pidx);
    let op = mem.inst_at(proc.ip);

    match op {
        Opcode::Nop0
        | Opcode::Nop1
        | Opcode::ModA
        | Opcode::ModB
        | Opcode::ModC
        | Opcode::ModD => advance(mem, &mut proc, 1),

        Opcode::Jmpb => seek::jump(mem, &mut proc, false),
        Opcode::Jmpf => seek::jump(mem, &mut proc, true),
        Opcode::Adrb => seek::address(mem, &mut proc, false),
        Opcode::Adrf => seek::address(mem, &mut proc, true),
        Opcode::Malb => seek::allocate(mem, &mut proc, false),
        Opcode::Malf => seek::allocate(mem, &mut proc, true),
        Opcode::Load => seek::transfer(mem, &mut proc, false),
        Opcode::Wrte => seek::transfer(mem, &mut proc, true),

        Opcode::Swap => swap(mem, &mut proc),
        Opcode::Splt => split(mem, procs, &mut proc, pidx),

        Opcode::Incn => unary(mem, &mut proc, |r| r.wrapping_add(1)),
        Opcode::Decn => unary(mem, &mut proc, |r| r.wrapping_sub(1)),
        Opcode::Zero => unary(mem, &mut proc, |_| 0),
        Opcode::Unit => unary(mem, &mut proc, |_| 1),
        Opcode::Notn => unary(mem, &mut proc, |r| u32::from(r == 0)),
        Opcode::Shfl => unary(mem, &mut proc, |r| r << 1),
        Opcode::Shfr => unary(mem, &mut proc, |r| r >> 1),
        Opcode::Ifnz => ifnz(mem, &mut proc),

        Opcode::Sumn => arith(mem, &mut proc, u32::wrapping_add),
        Opcode::Subn => arith(mem, &mut proc, u32::wrapping_sub),
        Opcode::Muln => arith(mem, &mut proc, u32::wrapping_mul),
        Opcode::Divn => divide(mem, &mut proc),

        Opcode::Send => send(mem, &mut proc, channel),
        Opcode::Recv => recv(mem, &mut proc, channel),
        Opcode::Pshn => push(mem, &mut proc),
        Opcode::Popn => pop(mem, &mut proc),
    }

    *procs.get_mut(pidx) = proc;
}

/// Advances `ip` by `steps`, clamped to the last address, and drags `sp`.
pub(crate) fn advance(mem: &WorldMemory, proc: &mut Process, steps: u32) {
    let last = mem.size() - 1;
    proc.ip = proc.ip.saturating_add(steps).min(last);
    proc.sp = proc.ip;
}

/// Moves the seeker one cell in the given direction, saturating at the
/// world's edges.
pub(crate) fn step_sp(mem: &WorldMemory, proc: &mut Process, forward: bool) {
    if forward {
        if proc.sp < mem.size() - 1 {
            proc.sp += 1;
        }
    } else {
        proc.sp = proc.sp.saturating_sub(1);
    }
}

/// Resolves `count` modifier cells following `ip` into register indices.
///
/// Returns `None` when any required cell is out of range or not a modifier;
/// the caller treats that as a fault.
pub(crate) fn resolve_mods(mem: &WorldMemory, proc: &Process, count: u32) -> Option<[usize; 3]> {
    debug_assert!(count <= 3);
    let mut regs = [0usize; 3];
    for i in 0..count {
        let addr = proc.ip + 1 + i;
        if !mem.is_valid(addr) {
            return None;
        }
        let op = mem.inst_at(addr);
        if !op.is_mod() {
            return None;
        }
        regs[i as usize] = op as usize - Opcode::ModA as usize;
    }
    Some(regs)
}

/// `SWAP`: exchange the organism's own block with its child block.
fn swap(mem: &WorldMemory, proc: &mut Process) {
    if proc.mb2s != 0 {
        std::mem::swap(&mut proc.mb1a, &mut proc.mb2a);
        std::mem::swap(&mut proc.mb1s, &mut proc.mb2s);
    }
    advance(mem, proc, 1);
}

/// `SPLT`: the child block becomes a newborn organism.
///
/// The parent's own slot index serves as the queue lock, so the growth a
/// crowded birth triggers cannot move the parent out from under the engine's
/// scheduling walk.
fn split(mem: &mut WorldMemory, procs: &mut ProcessTable, proc: &mut Process, pidx: u32) {
    if proc.mb2s != 0 {
        let _ = procs.create(mem, proc.mb2a, proc.mb2s, pidx, false);
        proc.mb2a = 0;
        proc.mb2s = 0;
    }
    advance(mem, proc, 1);
}

/// One-register operations (`INCN`, `DECN`, `ZERO`, `UNIT`, `NOTN`,
/// `SHFL`, `SHFR`).
fn unary(mem: &WorldMemory, proc: &mut Process, f: impl FnOnce(u32) -> u32) {
    let Some(regs) = resolve_mods(mem, proc, 1) else {
        advance(mem, proc, 1);
        return;
    };
    let result = f(proc.reg(regs[0]));
    proc.set_reg(regs[0], result);
    advance(mem, proc, 2);
}

/// `IFNZ`: skip the next instruction when the register is zero.
fn ifnz(mem: &WorldMemory, proc: &mut Process) {
    let Some(regs) = resolve_mods(mem, proc, 1) else {
        advance(mem, proc, 1);
        return;
    };
    let steps = if proc.reg(regs[0]) == 0 { 3 } else { 2 };
    advance(mem, proc, steps);
}

/// Three-register arithmetic: `r0 := r1 op r2`, wrapping.
fn arith(mem: &WorldMemory, proc: &mut Process, f: impl FnOnce(u32, u32) -> u32) {
    let Some(regs) = resolve_mods(mem, proc, 3) else {
        advance(mem, proc, 1);
        return;
    };
    let result = f(proc.reg(regs[1]), proc.reg(regs[2]));
    proc.set_reg(regs[0], result);
    advance(mem, proc, 4);
}

/// `DIVN`: division, where a zero divisor faults.
fn divide(mem: &WorldMemory, proc: &mut Process) {
    let Some(regs) = resolve_mods(mem, proc, 3) else {
        advance(mem, proc, 1);
        return;
    };
    let divisor = proc.reg(regs[2]);
    if divisor != 0 {
        let result = proc.reg(regs[1]) / divisor;
        proc.set_reg(regs[0], result);
    }
    advance(mem, proc, 4);
}

/// `SEND`: emit the register's opcode on the channel.
fn send(mem: &WorldMemory, proc: &mut Process, channel: &mut Channel) {
    let Some(regs) = resolve_mods(mem, proc, 1) else {
        advance(mem, proc, 1);
        return;
    };
    let value = proc.reg(regs[0]);
    if value < OPCODE_COUNT as u32 {
        channel.send(value as u8);
    }
    advance(mem, proc, 2);
}

/// `RECV`: read one byte from the channel, or `NOP0` when nothing arrives.
fn recv(mem: &WorldMemory, proc: &mut Process, channel: &mut Channel) {
    let Some(regs) = resolve_mods(mem, proc, 1) else {
        advance(mem, proc, 1);
        return;
    };
    let byte = channel.receive().unwrap_or(Opcode::Nop0 as u8);
    proc.set_reg(regs[0], u32::from(byte));
    advance(mem, proc, 2);
}

/// `PSHN`: push the register onto the ring stack; the bottom slot falls off.
fn push(mem: &WorldMemory, proc: &mut Process) {
    let Some(regs) = resolve_mods(mem, proc, 1) else {
        advance(mem, proc, 1);
        return;
    };
    let value = proc.reg(regs[0]);
    proc.stack.copy_within(0..NUM_STACK - 1, 1);
    proc.stack[0] = value;
    advance(mem, proc, 2);
}

/// `POPN`: pop the top of the ring stack into the register; the bottom slot
/// refills with zero.
fn pop(mem: &WorldMemory, proc: &mut Process) {
    let Some(regs) = resolve_mods(mem, proc, 1) else {
        advance(mem, proc, 1);
        return;
    };
    proc.set_reg(regs[0], proc.stack[0]);
    proc.stack.copy_within(1..NUM_STACK, 0);
    proc.stack[NUM_STACK - 1] = 0;
    advance(mem, proc, 2);
}
