//! Template measurement and complement matching.
//!
//! A template is a maximal run of `NOP0`/`NOP1` cells. Organisms address
//! each other's code by template: a search instruction carries a source
//! template and scans for the run whose elements are the bitwise complement
//! of the source, element by element, for the length of the source.

use crate::world::WorldMemory;

/// Length of the template starting at `addr`; zero when the cell there is
/// not a template element (or `addr` is out of range).
pub fn length(mem: &WorldMemory, addr: u32) -> u32 {
    let mut len = 0;
    while mem.is_valid(addr + len) && mem.inst_at(addr + len).is_template() {
        len += 1;
    }
    len
}

/// Returns whether the run at `target` complements the template at
/// `source`, compared element-wise for `len` cells.
///
/// The target run may be longer than the source; only the first `len`
/// cells are examined. Any non-template cell inside the window fails the
/// match.
pub fn complements(mem: &WorldMemory, source: u32, target: u32, len: u32) -> bool {
    for i in 0..len {
        let t = target + i;
        if !mem.is_valid(t) {
            return false;
        }
        let s = mem.inst_at(source + i);
        let d = mem.inst_at(t);
        if !d.is_template() || d == s {
            return false;
        }
    }
    true
}
