//! Error types for the rtlocal resolver
//!
//! None of these reach `current()`. Probe errors are absorbed by falling back
//! to a default offset; TLS key errors are fatal and surface as a panic.

use core::fmt;

/// Result type for kernel probing
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors from reading or parsing the kernel release
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// uname(2) failed with the given errno
    Uname(i32),

    /// Kernel reported an empty release string
    EmptyRelease,

    /// Release string has no leading decimal major version
    MalformedRelease(String),

    /// No kernel release query on this platform
    Unsupported,
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::Uname(errno) => write!(f, "uname failed: errno {}", errno),
            ProbeError::EmptyRelease => write!(f, "kernel release is empty"),
            ProbeError::MalformedRelease(s) => write!(f, "malformed kernel release {:?}", s),
            ProbeError::Unsupported => write!(f, "kernel release query unsupported on this platform"),
        }
    }
}

impl std::error::Error for ProbeError {}

impl From<std::io::Error> for ProbeError {
    fn from(e: std::io::Error) -> Self {
        ProbeError::Uname(e.raw_os_error().unwrap_or(0))
    }
}

/// Errors from the thread-local storage backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsError {
    /// pthread_key_create returned the given error code
    KeyCreate(i32),

    /// pthread_setspecific returned the given error code
    KeySet(i32),
}

impl fmt::Display for TlsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TlsError::KeyCreate(code) => write!(f, "pthread_key_create failed: error {}", code),
            TlsError::KeySet(code) => write!(f, "pthread_setspecific failed: error {}", code),
        }
    }
}

impl std::error::Error for TlsError {}
