//! x86_64 `gs`-segment read
//!
//! On macOS x86_64 the `gs` base points at the current pthread's TSD area.

use std::arch::asm;

/// Read the word at `gs:[base + index * 8]`.
///
/// # Safety
///
/// `base + index * 8` must address a readable word of the current thread's
/// `gs` segment, i.e. a live TSD slot.
#[inline(always)]
pub unsafe fn gs_slot(base: usize, index: usize) -> usize {
    let value: usize;
    asm!(
        "mov {value}, qword ptr gs:[{base} + {index} * 8]",
        value = out(reg) value,
        base = in(reg) base,
        index = in(reg) index,
        options(nostack, readonly, preserves_flags),
    );
    value
}
