//! Per-thread context slot
//!
//! One backend per target, chosen at compile time:
//!
//! | Target | Backend |
//! |---|---|
//! | macOS x86/x86_64 | [`FastPathTls`] (`gs` read, pthread write) |
//! | other macOS, OpenBSD | [`KeyTls`] |
//! | everything else | [`NativeTls`] |
//!
//! The `key-tls` feature forces [`KeyTls`] on every unix target and
//! `no-fast-path` drops the macOS fast path.

mod native;
pub use native::NativeTls;

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        mod key;
        pub use key::KeyTls;
    }
}

cfg_if::cfg_if! {
    if #[cfg(all(target_os = "macos", any(target_arch = "x86_64", target_arch = "x86")))] {
        mod fast_path;
        pub use fast_path::FastPathTls;
    }
}

// Platform selection
cfg_if::cfg_if! {
    if #[cfg(all(
        target_os = "macos",
        any(target_arch = "x86_64", target_arch = "x86"),
        not(feature = "no-fast-path"),
        not(feature = "key-tls"),
    ))] {
        pub use fast_path::FastPathTls as PlatformTls;
    } else if #[cfg(any(
        target_os = "macos",
        target_os = "openbsd",
        all(unix, feature = "key-tls"),
    ))] {
        pub use key::KeyTls as PlatformTls;
    } else {
        pub use native::NativeTls as PlatformTls;
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use rtlocal_core::traits::TlsBackend;
    use std::ffi::c_void;
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn addr<T>(v: &T) -> *mut c_void {
        v as *const T as *mut c_void
    }

    /// Exercise the `TlsBackend` contract on fresh threads
    pub fn check_backend<B: TlsBackend + 'static>() {
        static CTX_A: u64 = 1;
        static CTX_B: u64 = 2;

        // Unregistered thread reads null, then sees its own writes
        thread::spawn(|| {
            assert!(B::current_raw().is_null());
            B::register(addr(&CTX_A));
            assert_eq!(B::current_raw(), addr(&CTX_A));
            B::register(addr(&CTX_B));
            assert_eq!(B::current_raw(), addr(&CTX_B));
            B::register(std::ptr::null_mut());
            assert!(B::current_raw().is_null());
        })
        .join()
        .unwrap();

        // Two threads never see each other's binding
        let barrier = Arc::new(Barrier::new(2));
        let handles: Vec<_> = [addr(&CTX_A) as usize, addr(&CTX_B) as usize]
            .into_iter()
            .map(|p| {
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    B::register(p as *mut c_void);
                    barrier.wait();
                    for _ in 0..1000 {
                        assert_eq!(B::current_raw() as usize, p);
                    }
                    barrier.wait();
                    B::current_raw() as usize
                })
            })
            .collect();
        let seen: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(seen, vec![addr(&CTX_A) as usize, addr(&CTX_B) as usize]);

        // A thread that never registers stays null
        thread::spawn(|| assert!(B::current_raw().is_null()))
            .join()
            .unwrap();
    }
}
