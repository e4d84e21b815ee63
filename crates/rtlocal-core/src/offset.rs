//! Darwin TSD base offsets
//!
//! On macOS x86/x86_64 the pthread specific-data array lives in the `gs`
//! segment. Kernels before Darwin 11 (Lion) placed it after a small header;
//! from Darwin 11 onward it starts at the segment base.
//!
//! ```text
//! kernel major    narrow (32-bit)   wide (64-bit)
//! < 11            0x48              0x60
//! >= 11           0x00              0x00
//! ```
//!
//! Everything here is pure so it can be tested on any host. The probe that
//! feeds it a live release string is in `rtlocal-runtime::probe`.

use crate::error::{ProbeError, ProbeResult};

/// First Darwin major version with the TSD array at the segment base
pub const KERNEL_THRESHOLD_MAJOR: u32 = 11;

/// Pre-threshold TSD offset for 32-bit processes
pub const LEGACY_OFFSET_NARROW: usize = 0x48;

/// Pre-threshold TSD offset for 64-bit processes
pub const LEGACY_OFFSET_WIDE: usize = 0x60;

/// Pointer width of the process, selects a column of the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerWidth {
    Narrow,
    Wide,
}

impl PointerWidth {
    /// Width of the current build target
    #[inline]
    pub const fn host() -> Self {
        HOST_WIDTH
    }

    /// Size of one TSD slot in bytes
    #[inline]
    pub const fn word_size(self) -> usize {
        match self {
            PointerWidth::Narrow => 4,
            PointerWidth::Wide => 8,
        }
    }
}

cfg_if::cfg_if! {
    if #[cfg(target_pointer_width = "32")] {
        const HOST_WIDTH: PointerWidth = PointerWidth::Narrow;
    } else {
        const HOST_WIDTH: PointerWidth = PointerWidth::Wide;
    }
}

/// Offset used when the kernel version is unknown
#[inline]
pub const fn fallback_offset(width: PointerWidth) -> usize {
    match width {
        PointerWidth::Narrow => LEGACY_OFFSET_NARROW,
        PointerWidth::Wide => LEGACY_OFFSET_WIDE,
    }
}

/// Look up the TSD base offset for a kernel major version
#[inline]
pub const fn offset_for_kernel(major: u32, width: PointerWidth) -> usize {
    if major < KERNEL_THRESHOLD_MAJOR {
        fallback_offset(width)
    } else {
        0
    }
}

/// Extract the major version from a release string such as `"10.8.0"`.
///
/// The major is the run of decimal digits before the first `.`. A release
/// without a dot is parsed whole.
pub fn parse_kernel_major(release: &str) -> ProbeResult<u32> {
    let release = release.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    if release.is_empty() {
        return Err(ProbeError::EmptyRelease);
    }

    let major = release.split('.').next().unwrap_or(release);
    major
        .parse::<u32>()
        .map_err(|_| ProbeError::MalformedRelease(release.to_string()))
}
