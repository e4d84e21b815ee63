//! Native thread-local backend
//!
//! A `thread_local!` cell. Starts null on every thread, needs no setup.

use rtlocal_core::traits::TlsBackend;
use std::cell::Cell;
use std::ffi::c_void;

thread_local! {
    /// Context bound to this OS thread
    static CURRENT: Cell<*mut c_void> = const { Cell::new(std::ptr::null_mut()) };
}

/// `thread_local!` slot
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeTls;

impl TlsBackend for NativeTls {
    const NAME: &'static str = "native";

    #[inline]
    fn register(ptr: *mut c_void) {
        CURRENT.with(|cell| cell.set(ptr));
    }

    #[inline]
    fn current_raw() -> *mut c_void {
        CURRENT.with(|cell| cell.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tls::test_support;

    #[test]
    fn test_native_contract() {
        test_support::check_backend::<NativeTls>();
    }
}
