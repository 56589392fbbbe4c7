//! Register operation tests.
//!
//! Every program is written at address 0 into a world whose background is
//! inert (`ZERO` cells), and run by a single organism spawned over it.

use alvm_core::isa::Opcode::{
    self, Decn, Divn, Ifnz, Incn, ModA, ModB, ModC, ModD, Muln, Notn, Popn, Pshn, Shfl, Shfr,
    Subn, Sumn, Unit, Zero,
};
use rstest::rstest;

use crate::common::TestWorld;

/// Spawn an organism at 0 and run its program once per instruction.
fn world_with(program: &[Opcode]) -> (TestWorld, u32) {
    let mut w = TestWorld::new(8);
    let _ = w.fill(Zero).write(0, program);
    let pidx = w.spawn(0, program.len() as u32);
    (w, pidx)
}

#[rstest]
#[case(Incn, 5, 6)]
#[case(Incn, u32::MAX, 0)]
#[case(Decn, 5, 4)]
#[case(Decn, 0, u32::MAX)]
#[case(Zero, 77, 0)]
#[case(Unit, 77, 1)]
#[case(Notn, 0, 1)]
#[case(Notn, 1, 0)]
#[case(Notn, 77, 0)]
#[case(Shfl, 1, 2)]
#[case(Shfl, 0x8000_0001, 2)]
#[case(Shfr, 4, 2)]
#[case(Shfr, 1, 0)]
fn unary_ops(#[case] op: Opcode, #[case] input: u32, #[case] expected: u32) {
    let (mut w, pidx) = world_with(&[op, ModA]);
    w.procs.get_mut(pidx).rax = input;

    w.step(pidx);

    let proc = w.procs.get(pidx);
    assert_eq!(proc.rax, expected);
    assert_eq!(proc.ip, 2, "advances past the opcode and its modifier");
    assert_eq!(proc.sp, 2, "seeker dragged to ip");
}

#[rstest]
#[case(Sumn, 7, 5, 12)]
#[case(Sumn, u32::MAX, 1, 0)]
#[case(Subn, 7, 5, 2)]
#[case(Subn, 5, 7, u32::MAX - 1)]
#[case(Muln, 6, 7, 42)]
#[case(Muln, 1 << 31, 2, 0)]
#[case(Divn, 42, 6, 7)]
#[case(Divn, 7, 2, 3)]
fn three_register_ops(#[case] op: Opcode, #[case] b: u32, #[case] c: u32, #[case] expected: u32) {
    let (mut w, pidx) = world_with(&[op, ModA, ModB, ModC]);
    {
        let proc = w.procs.get_mut(pidx);
        proc.rbx = b;
        proc.rcx = c;
    }

    w.step(pidx);

    let proc = w.procs.get(pidx);
    assert_eq!(proc.rax, expected);
    assert_eq!(proc.ip, 4);
}

/// Division by zero faults: the destination is untouched and execution
/// moves past the opcode and all three modifiers.
#[test]
fn division_by_zero_faults() {
    let (mut w, pidx) = world_with(&[Divn, ModA, ModB, ModC]);
    {
        let proc = w.procs.get_mut(pidx);
        proc.rax = 123;
        proc.rbx = 42;
        proc.rcx = 0;
    }

    w.step(pidx);

    let proc = w.procs.get(pidx);
    assert_eq!(proc.rax, 123, "destination must not change on fault");
    assert_eq!(proc.ip, 4);
    assert_eq!(proc.sp, 4);
}

#[test]
fn registers_can_alias_in_three_register_ops() {
    let (mut w, pidx) = world_with(&[Sumn, ModA, ModA, ModA]);
    w.procs.get_mut(pidx).rax = 21;

    w.step(pidx);

    assert_eq!(w.procs.get(pidx).rax, 42);
}

#[test]
fn missing_modifier_faults_with_a_single_advance() {
    // ZERO followed by a non-modifier: the instruction cannot resolve its
    // register and consumes only itself.
    let (mut w, pidx) = world_with(&[Zero, Zero]);
    w.procs.get_mut(pidx).rax = 99;

    w.step(pidx);

    let proc = w.procs.get(pidx);
    assert_eq!(proc.rax, 99);
    assert_eq!(proc.ip, 1);
    assert_eq!(proc.sp, 1);
}

#[test]
fn modifiers_select_each_register() {
    let (mut w, pidx) = world_with(&[Unit, ModA, Unit, ModB, Unit, ModC, Unit, ModD]);
    w.run(pidx, 4);

    let proc = w.procs.get(pidx);
    assert_eq!(
        (proc.rax, proc.rbx, proc.rcx, proc.rdx),
        (1, 1, 1, 1),
        "each modifier routes to its own register"
    );
}

#[test]
fn push_shifts_the_stack_down() {
    let (mut w, pidx) = world_with(&[Pshn, ModA, Pshn, ModB]);
    {
        let proc = w.procs.get_mut(pidx);
        proc.rax = 10;
        proc.rbx = 20;
        proc.stack = [1, 2, 3, 4, 5, 6, 7, 8];
    }

    w.run(pidx, 2);

    let proc = w.procs.get(pidx);
    assert_eq!(proc.stack, [20, 10, 1, 2, 3, 4, 5, 6], "slot 7 discarded");
}

#[test]
fn pop_refills_the_bottom_with_zero() {
    let (mut w, pidx) = world_with(&[Popn, ModD]);
    w.procs.get_mut(pidx).stack = [1, 2, 3, 4, 5, 6, 7, 8];

    w.step(pidx);

    let proc = w.procs.get(pidx);
    assert_eq!(proc.rdx, 1);
    assert_eq!(proc.stack, [2, 3, 4, 5, 6, 7, 8, 0]);
}

#[test]
fn push_then_pop_round_trips() {
    let (mut w, pidx) = world_with(&[Pshn, ModA, Popn, ModB]);
    w.procs.get_mut(pidx).rax = 0xCAFE;

    w.run(pidx, 2);

    let proc = w.procs.get(pidx);
    assert_eq!(proc.rbx, 0xCAFE);
    assert_eq!(proc.stack, [0; 8]);
}

#[test]
fn ifnz_with_zero_register_skips_one_instruction() {
    // Scenario: IFNZ MODA NOP0 NOP0 with rax = 0 lands on address 13.
    let mut w = TestWorld::new(8);
    let _ = w.fill(Zero).write(10, &[Ifnz, ModA, Opcode::Nop0, Opcode::Nop0]);
    let pidx = w.spawn(10, 4);
    w.procs.get_mut(pidx).rax = 0;

    w.step(pidx);

    assert_eq!(w.procs.get(pidx).ip, 13);
}

#[test]
fn ifnz_with_nonzero_register_falls_through() {
    let mut w = TestWorld::new(8);
    let _ = w.fill(Zero).write(10, &[Ifnz, ModA, Opcode::Nop0, Opcode::Nop0]);
    let pidx = w.spawn(10, 4);
    w.procs.get_mut(pidx).rax = 1;

    w.step(pidx);

    assert_eq!(w.procs.get(pidx).ip, 12);
}
