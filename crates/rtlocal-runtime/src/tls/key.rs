//! pthread key backend
//!
//! One `pthread_key_t` per process, created on first registration. Used
//! where the native thread-local keyword is unavailable or unreliable, and
//! as the write path of the macOS fast path.

use rtlocal_core::error::TlsError;
use rtlocal_core::traits::TlsBackend;
use rtlocal_core::{kdebug, kerror};
use std::ffi::c_void;
use std::sync::OnceLock;

static KEY: OnceLock<libc::pthread_key_t> = OnceLock::new();

/// Create a key with no destructor. Contexts are not owned by the slot.
pub(crate) fn create_key() -> Result<libc::pthread_key_t, TlsError> {
    let mut key: libc::pthread_key_t = 0;
    // Safety: `key` is a valid out-pointer; no destructor is registered.
    let rc = unsafe { libc::pthread_key_create(&mut key, None) };
    if rc != 0 {
        return Err(TlsError::KeyCreate(rc));
    }
    kdebug!("created pthread key {}", key);
    Ok(key)
}

/// Create the key or abort the registration.
///
/// Key exhaustion leaves no way to honour `register`, so it panics.
pub(crate) fn create_key_or_panic() -> libc::pthread_key_t {
    match create_key() {
        Ok(key) => key,
        Err(e) => {
            kerror!("{}", e);
            panic!("rtlocal: {}", e);
        }
    }
}

/// Set the calling thread's value for `key`, panicking on failure.
pub(crate) fn set_specific(key: libc::pthread_key_t, ptr: *mut c_void) {
    // Safety: `key` came from pthread_key_create and is never deleted.
    let rc = unsafe { libc::pthread_setspecific(key, ptr as *const c_void) };
    if rc != 0 {
        let e = TlsError::KeySet(rc);
        kerror!("{}", e);
        panic!("rtlocal: {}", e);
    }
}

/// Process key, if any thread has registered yet
#[cfg(test)]
pub(crate) fn key() -> Option<libc::pthread_key_t> {
    KEY.get().copied()
}

/// `pthread_setspecific` / `pthread_getspecific` slot
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyTls;

impl TlsBackend for KeyTls {
    const NAME: &'static str = "pthread-key";

    #[inline]
    fn register(ptr: *mut c_void) {
        let key = *KEY.get_or_init(create_key_or_panic);
        set_specific(key, ptr);
    }

    #[inline]
    fn current_raw() -> *mut c_void {
        match KEY.get() {
            // Safety: the key is valid for the life of the process.
            Some(&key) => unsafe { libc::pthread_getspecific(key) },
            None => std::ptr::null_mut(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tls::test_support;

    #[test]
    fn test_key_contract() {
        test_support::check_backend::<KeyTls>();
    }

    #[test]
    fn test_key_created_once() {
        let mut slot = 1u8;
        KeyTls::register(&mut slot as *mut u8 as *mut c_void);
        let first = key().expect("key exists after register");

        let handles: Vec<_> = (0..4)
            .map(|_| {
                std::thread::spawn(|| {
                    KeyTls::register(std::ptr::null_mut());
                    key()
                })
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), Some(first));
        }

        KeyTls::register(std::ptr::null_mut());
    }

    #[test]
    fn test_create_key_distinct() {
        let a = create_key().unwrap();
        let b = create_key().unwrap();
        assert_ne!(a, b);
        unsafe {
            libc::pthread_key_delete(a);
            libc::pthread_key_delete(b);
        }
    }
}
