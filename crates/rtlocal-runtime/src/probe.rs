//! Kernel version probe
//!
//! Resolves the `gs`-relative TSD base offset once per process. The release
//! string comes from uname(2), which on Darwin is the same value as
//! `sysctl kern.osrelease`.
//!
//! The probe never fails from the caller's point of view: any error is
//! logged and the pre-threshold offset for the host pointer width is used.

use rtlocal_core::error::{ProbeError, ProbeResult};
use rtlocal_core::offset::{fallback_offset, offset_for_kernel, parse_kernel_major, PointerWidth};
use rtlocal_core::{kdebug, kwarn};
use std::sync::OnceLock;

static PLATFORM_OFFSET: OnceLock<usize> = OnceLock::new();

/// TSD base offset for this process
///
/// The first call computes it; every later call, from any thread, returns
/// the same value.
#[inline]
pub fn platform_offset() -> usize {
    *PLATFORM_OFFSET.get_or_init(|| offset_from_release(kernel_release()))
}

/// Whether [`platform_offset`] has already been computed
#[cfg(test)]
pub(crate) fn is_probed() -> bool {
    PLATFORM_OFFSET.get().is_some()
}

/// Map a release lookup result to an offset, degrading on error
pub fn offset_from_release(release: ProbeResult<String>) -> usize {
    let width = PointerWidth::host();
    match release.and_then(|r| parse_kernel_major(&r)) {
        Ok(major) => {
            let offset = offset_for_kernel(major, width);
            kdebug!("kernel major {} -> tsd offset {:#x}", major, offset);
            offset
        }
        Err(e) => {
            let offset = fallback_offset(width);
            kwarn!("kernel probe failed ({}), using offset {:#x}", e, offset);
            offset
        }
    }
}

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        /// Kernel release string, e.g. `"23.4.0"` on Darwin
        pub fn kernel_release() -> ProbeResult<String> {
            let uts = nix::sys::utsname::uname().map_err(std::io::Error::from)?;
            let release = uts.release().to_string_lossy().into_owned();
            if release.is_empty() {
                return Err(ProbeError::EmptyRelease);
            }
            Ok(release)
        }
    } else {
        /// Kernel release string; not available on this platform
        pub fn kernel_release() -> ProbeResult<String> {
            Err(ProbeError::Unsupported)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn test_offset_from_release() {
        assert_eq!(offset_from_release(Ok("23.4.0".into())), 0);
        assert_eq!(
            offset_from_release(Ok("10.8.0".into())),
            fallback_offset(PointerWidth::host())
        );
    }

    #[test]
    fn test_probe_failure_degrades() {
        let expected = fallback_offset(PointerWidth::host());
        assert_eq!(offset_from_release(Err(ProbeError::Uname(14))), expected);
        assert_eq!(offset_from_release(Err(ProbeError::Unsupported)), expected);
        assert_eq!(offset_from_release(Ok("garbage".into())), expected);
    }

    #[cfg(unix)]
    #[test]
    fn test_kernel_release_parses() {
        let release = kernel_release().expect("uname should work on unix");
        assert!(parse_kernel_major(&release).is_ok(), "release {:?}", release);
    }

    #[test]
    fn test_platform_offset_concurrent() {
        const THREADS: usize = 16;
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    platform_offset()
                })
            })
            .collect();

        let offsets: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(offsets.windows(2).all(|w| w[0] == w[1]), "{:?}", offsets);
        assert!(is_probed());
        assert_eq!(platform_offset(), offsets[0]);
    }
}
