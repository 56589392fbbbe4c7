//! Instruction set definition.
//!
//! This module defines the 32-opcode ISA executed by the interpreter. It
//! provides:
//! 1. **Opcode enum:** fixed numeric ordinals; snapshot files and the
//!    mutation operator depend on this order never changing.
//! 2. **Classification:** template and register-modifier predicates.
//! 3. **Arity:** the number of modifier bytes each opcode consumes, which
//!    drives register resolution and fault/advance distances.
//! 4. **Display:** mnemonics and the single-character glyphs used by world
//!    dumps.

use num_enum::TryFromPrimitive;

use crate::common::constants::INSTRUCTION_MASK;

/// Number of opcodes in the instruction set.
pub const OPCODE_COUNT: usize = 32;

/// The instruction set, one variant per 5-bit cell opcode.
///
/// Ordinals are load-bearing: cosmic-ray mutation draws values modulo
/// [`OPCODE_COUNT`], and snapshot files store raw cells, so reordering
/// variants silently changes the semantics of existing worlds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
#[repr(u8)]
pub enum Opcode {
    /// Template element zero; matched against [`Opcode::Nop1`].
    Nop0 = 0,
    /// Template element one; matched against [`Opcode::Nop0`].
    Nop1,
    /// Register modifier selecting `rax`.
    ModA,
    /// Register modifier selecting `rbx`.
    ModB,
    /// Register modifier selecting `rcx`.
    ModC,
    /// Register modifier selecting `rdx`.
    ModD,
    /// Jump backward to the complement of the following template.
    Jmpb,
    /// Jump forward to the complement of the following template.
    Jmpf,
    /// Search backward for the complement template; store its address.
    Adrb,
    /// Search forward for the complement template; store its address.
    Adrf,
    /// Allocate a child block backward, one cell per cycle.
    Malb,
    /// Allocate a child block forward, one cell per cycle.
    Malf,
    /// Swap the organism's own block with its child block.
    Swap,
    /// Split the child block off as a newborn organism.
    Splt,
    /// Increment a register.
    Incn,
    /// Decrement a register.
    Decn,
    /// Set a register to zero.
    Zero,
    /// Set a register to one.
    Unit,
    /// Logical negation of a register (zero becomes one, nonzero zero).
    Notn,
    /// Skip the next instruction when a register is zero.
    Ifnz,
    /// Three-register addition.
    Sumn,
    /// Three-register subtraction.
    Subn,
    /// Three-register multiplication.
    Muln,
    /// Three-register division; a zero divisor faults.
    Divn,
    /// Travel to an address and read the opcode there into a register.
    Load,
    /// Travel to an address and write a register's opcode there.
    Wrte,
    /// Emit a register's opcode on the common channel.
    Send,
    /// Read one byte from the common channel into a register.
    Recv,
    /// Push a register onto the eight-slot ring stack.
    Pshn,
    /// Pop the top of the ring stack into a register.
    Popn,
    /// Shift a register left by one bit.
    Shfl,
    /// Shift a register right by one bit.
    Shfr,
}

/// All opcodes in ordinal order; `ALL[n]` is the opcode with ordinal `n`.
pub const ALL: [Opcode; OPCODE_COUNT] = [
    Opcode::Nop0,
    Opcode::Nop1,
    Opcode::ModA,
    Opcode::ModB,
    Opcode::ModC,
    Opcode::ModD,
    Opcode::Jmpb,
    Opcode::Jmpf,
    Opcode::Adrb,
    Opcode::Adrf,
    Opcode::Malb,
    Opcode::Malf,
    Opcode::Swap,
    Opcode::Splt,
    Opcode::Incn,
    Opcode::Decn,
    Opcode::Zero,
    Opcode::Unit,
    Opcode::Notn,
    Opcode::Ifnz,
    Opcode::Sumn,
    Opcode::Subn,
    Opcode::Muln,
    Opcode::Divn,
    Opcode::Load,
    Opcode::Wrte,
    Opcode::Send,
    Opcode::Recv,
    Opcode::Pshn,
    Opcode::Popn,
    Opcode::Shfl,
    Opcode::Shfr,
];

/// Returns whether a raw byte is a bare opcode value (no flag bits set).
#[inline]
pub fn is_inst(byte: u8) -> bool {
    byte < OPCODE_COUNT as u8
}

impl Opcode {
    /// Decodes the opcode stored in a world cell, ignoring flag bits.
    #[inline]
    pub fn from_cell(byte: u8) -> Self {
        ALL[(byte & INSTRUCTION_MASK) as usize]
    }

    /// Returns whether this opcode is a template element (`Nop0`/`Nop1`).
    #[inline]
    pub fn is_template(self) -> bool {
        matches!(self, Self::Nop0 | Self::Nop1)
    }

    /// Returns whether this opcode is a register modifier (`ModA`..`ModD`).
    #[inline]
    pub fn is_mod(self) -> bool {
        matches!(self, Self::ModA | Self::ModB | Self::ModC | Self::ModD)
    }

    /// Number of modifier bytes this opcode consumes after itself.
    ///
    /// Register resolution reads exactly this many cells past the
    /// instruction pointer, and commits advance the instruction pointer by
    /// one plus this count.
    pub fn mod_count(self) -> u32 {
        match self {
            Self::Nop0
            | Self::Nop1
            | Self::ModA
            | Self::ModB
            | Self::ModC
            | Self::ModD
            | Self::Jmpb
            | Self::Jmpf
            | Self::Swap
            | Self::Splt => 0,

            Self::Adrb
            | Self::Adrf
            | Self::Incn
            | Self::Decn
            | Self::Zero
            | Self::Unit
            | Self::Notn
            | Self::Ifnz
            | Self::Send
            | Self::Recv
            | Self::Pshn
            | Self::Popn
            | Self::Shfl
            | Self::Shfr => 1,

            Self::Malb | Self::Malf | Self::Load | Self::Wrte => 2,

            Self::Sumn | Self::Subn | Self::Muln | Self::Divn => 3,
        }
    }

    /// Four-letter mnemonic for listings and logs.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::Nop0 => "NOP0",
            Self::Nop1 => "NOP1",
            Self::ModA => "MODA",
            Self::ModB => "MODB",
            Self::ModC => "MODC",
            Self::ModD => "MODD",
            Self::Jmpb => "JMPB",
            Self::Jmpf => "JMPF",
            Self::Adrb => "ADRB",
            Self::Adrf => "ADRF",
            Self::Malb => "MALB",
            Self::Malf => "MALF",
            Self::Swap => "SWAP",
            Self::Splt => "SPLT",
            Self::Incn => "INCN",
            Self::Decn => "DECN",
            Self::Zero => "ZERO",
            Self::Unit => "UNIT",
            Self::Notn => "NOTN",
            Self::Ifnz => "IFNZ",
            Self::Sumn => "SUMN",
            Self::Subn => "SUBN",
            Self::Muln => "MULN",
            Self::Divn => "DIVN",
            Self::Load => "LOAD",
            Self::Wrte => "WRTE",
            Self::Send => "SEND",
            Self::Recv => "RECV",
            Self::Pshn => "PSHN",
            Self::Popn => "POPN",
            Self::Shfl => "SHFL",
            Self::Shfr => "SHFR",
        }
    }

    /// Single-character glyph used by compact world dumps.
    pub fn symbol(self) -> char {
        match self {
            Self::Nop0 => '.',
            Self::Nop1 => ':',
            Self::ModA => 'a',
            Self::ModB => 'b',
            Self::ModC => 'c',
            Self::ModD => 'd',
            Self::Jmpb => '(',
            Self::Jmpf => ')',
            Self::Adrb => '[',
            Self::Adrf => ']',
            Self::Malb => '{',
            Self::Malf => '}',
            Self::Swap => '%',
            Self::Splt => '$',
            Self::Incn => '^',
            Self::Decn => 'v',
            Self::Zero => '0',
            Self::Unit => '1',
            Self::Notn => '!',
            Self::Ifnz => '?',
            Self::Sumn => '+',
            Self::Subn => '-',
            Self::Muln => '*',
            Self::Divn => '/',
            Self::Load => 'L',
            Self::Wrte => 'W',
            Self::Send => 'S',
            Self::Recv => 'R',
            Self::Pshn => '#',
            Self::Popn => '~',
            Self::Shfl => '<',
            Self::Shfr => '>',
        }
    }
}

impl std::fmt::Display for Opcode {
    /// Formats the opcode as its mnemonic.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}
