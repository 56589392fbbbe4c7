//! The evolver: PRNG, cosmic rays, and register mutations.
//!
//! Selection needs variation, and this module supplies all of it:
//! 1. **PRNG:** a 128-bit xorshift generator. The four state words are part
//!    of the snapshot format, so the algorithm is fixed; replaying a saved
//!    world reproduces its future exactly.
//! 2. **Cosmic rays:** once per cycle, one uniformly random opcode may be
//!    written over one uniformly random address.
//! 3. **Register mutations:** occasionally a live organism's `rax` is
//!    rotated by a random amount. Descriptor-only; memory is never touched
//!    by this path.

use tracing::trace;

use crate::isa::{ALL, OPCODE_COUNT};
use crate::life::ProcessTable;
use crate::world::WorldMemory;

/// Mutation source state.
///
/// `last_changed_address` and `last_changed_process` are diagnostics for
/// hosts that visualize where mutation pressure lands; they carry no
/// simulation semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evolver {
    state: [u32; 4],
    /// Address most recently struck by a cosmic ray.
    pub last_changed_address: u32,
    /// Process slot most recently hit by a register mutation.
    pub last_changed_process: u32,
}

impl Evolver {
    /// Creates an evolver seeded from host entropy.
    pub fn new() -> Self {
        Self::from_seed(entropy_seed())
    }

    /// Creates an evolver with explicit seed words.
    ///
    /// An all-zero seed is a fixed point of the generator, so it is nudged
    /// to a nonzero state.
    pub fn from_seed(seed: [u32; 4]) -> Self {
        let state = if seed == [0; 4] { [1, 0, 0, 0] } else { seed };
        Self {
            state,
            last_changed_address: 0,
            last_changed_process: 0,
        }
    }

    /// Returns the raw generator state words.
    pub fn state(&self) -> [u32; 4] {
        self.state
    }

    /// Rebuilds an evolver from snapshot state.
    pub(crate) fn from_parts(
        state: [u32; 4],
        last_changed_address: u32,
        last_changed_process: u32,
    ) -> Self {
        Self {
            state,
            last_changed_address,
            last_changed_process,
        }
    }

    /// Draws the next pseudo-random word (xorshift-128).
    pub fn draw(&mut self) -> u32 {
        let mut t = self.state[3];
        t ^= t << 11;
        t ^= t >> 8;
        self.state[3] = self.state[2];
        self.state[2] = self.state[1];
        self.state[1] = self.state[0];
        t ^= self.state[0];
        t ^= self.state[0] >> 19;
        self.state[0] = t;
        t
    }

    /// Runs one cycle's worth of mutation.
    ///
    /// First a cosmic ray: one draw picks an address, and when it lands
    /// inside the world a second draw picks the opcode written there.
    /// Then a register mutation: a draw divided by the live population picks
    /// a slot, and when that slot is live a further draw rotates its `rax`.
    /// Dividing by the population (rather than reducing modulo the capacity)
    /// makes the per-organism mutation rate scale with crowding.
    pub fn step(&mut self, mem: &mut WorldMemory, procs: &mut ProcessTable) {
        let addr = self.draw();
        if addr < mem.size() {
            let op = ALL[(self.draw() as usize) % OPCODE_COUNT];
            mem.set_inst(addr, op);
            self.last_changed_address = addr;
            trace!(addr, op = %op, "cosmic ray");
        }

        let raw = self.draw();
        let pidx = raw / procs.count().max(1);
        if pidx < procs.capacity() && !procs.is_free(pidx) {
            let amount = self.draw() % 32;
            let proc = procs.get_mut(pidx);
            proc.rax = proc.rax.rotate_right(amount);
            self.last_changed_process = pidx;
            trace!(pidx, amount, "register mutation");
        }
    }
}

impl Default for Evolver {
    /// Returns the default value.
    fn default() -> Self {
        Self::new()
    }
}

/// Gathers four seed words from the host.
///
/// Unix reads `/dev/urandom`; elsewhere (and as a fallback when the read
/// fails) the words are expanded from the clock and process id with a
/// splitmix round, which is weak entropy but only ever used off the main
/// supported platforms.
fn entropy_seed() -> [u32; 4] {
    #[cfg(unix)]
    {
        use std::io::Read;
        let mut buf = [0u8; 16];
        if let Ok(mut urandom) = std::fs::File::open("/dev/urandom") {
            if urandom.read_exact(&mut buf).is_ok() {
                return [
                    u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
                    u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]),
                    u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]),
                    u32::from_le_bytes([buf[12], buf[13], buf[14], buf[15]]),
                ];
            }
        }
    }

    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos() as u64);
    let mut x = nanos ^ (u64::from(std::process::id()) << 32);
    let mut words = [0u32; 4];
    for word in &mut words {
        // One splitmix64 round per word.
        x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = x;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        *word = (z ^ (z >> 31)) as u32;
    }
    words
}
