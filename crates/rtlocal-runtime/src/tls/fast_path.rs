//! macOS x86 fast-path backend
//!
//! `pthread_getspecific` on Darwin is a library call; the value it returns
//! sits in the `gs` segment at `tsd_base + key * word`. Reading it directly
//! is a single instruction. Writes still go through `pthread_setspecific`,
//! which is the only supported way to fill the slot.
//!
//! The TSD base depends on the kernel major version, see
//! `rtlocal_core::offset`. It is probed together with key creation so the
//! read path never sees a key without its offset.

use super::key;
use crate::arch::current_arch;
use crate::probe;
use rtlocal_core::kdebug;
use rtlocal_core::traits::TlsBackend;
use std::ffi::c_void;
use std::sync::OnceLock;

/// Key and TSD base used by the read path
#[derive(Debug, Clone, Copy)]
struct FastSlot {
    key: libc::pthread_key_t,
    tsd_base: usize,
}

static SLOT: OnceLock<FastSlot> = OnceLock::new();

fn init_slot() -> FastSlot {
    let tsd_base = probe::platform_offset();
    let key = key::create_key_or_panic();
    kdebug!("fast path: key {} tsd base {:#x}", key, tsd_base);
    FastSlot { key, tsd_base }
}

/// pthread key written through libc, read straight from `gs`
#[derive(Debug, Clone, Copy, Default)]
pub struct FastPathTls;

impl TlsBackend for FastPathTls {
    const NAME: &'static str = "gs-fast-path";

    #[inline]
    fn register(ptr: *mut c_void) {
        let slot = SLOT.get_or_init(init_slot);
        key::set_specific(slot.key, ptr);
    }

    #[inline]
    fn current_raw() -> *mut c_void {
        match SLOT.get() {
            // Safety: the slot exists, so the key is live and the offset
            // matches this kernel's TSD layout.
            Some(slot) => unsafe {
                current_arch::gs_slot(slot.tsd_base, slot.key as usize) as *mut c_void
            },
            None => std::ptr::null_mut(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tls::test_support;

    #[test]
    fn test_fast_path_contract() {
        test_support::check_backend::<FastPathTls>();
    }

    #[test]
    fn test_fast_read_matches_getspecific() {
        let mut value = 7u32;
        let ptr = &mut value as *mut u32 as *mut c_void;
        FastPathTls::register(ptr);

        let slot = SLOT.get().copied().unwrap();
        let slow = unsafe { libc::pthread_getspecific(slot.key) };
        assert_eq!(slow, ptr);
        assert_eq!(FastPathTls::current_raw(), slow);

        FastPathTls::register(std::ptr::null_mut());
    }
}
