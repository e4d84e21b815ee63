//! 32-bit x86 `gs`-segment read

use std::arch::asm;

/// Read the word at `gs:[base + index * 4]`.
///
/// # Safety
///
/// `base + index * 4` must address a live TSD slot of the current thread.
#[inline(always)]
pub unsafe fn gs_slot(base: usize, index: usize) -> usize {
    let value: usize;
    asm!(
        "mov {value}, dword ptr gs:[{base} + {index} * 4]",
        value = out(reg) value,
        base = in(reg) base,
        index = in(reg) index,
        options(nostack, readonly, preserves_flags),
    );
    value
}
