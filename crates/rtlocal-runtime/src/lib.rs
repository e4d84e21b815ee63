//! # rtlocal-runtime
//!
//! Platform-specific half of the rtlocal resolver.
//!
//! This crate provides:
//! - Kernel version probe for the Darwin TSD offset (`probe`)
//! - Per-thread context slots, one backend per target (`tls`)
//! - Raw `gs`-segment reads for the macOS fast path (`arch`)
//! - Fiber-aware resolution over a backend (`resolve`)

pub mod arch;
pub mod probe;
pub mod resolve;
pub mod tls;

// Re-exports
pub use probe::platform_offset;
pub use resolve::{resolve, Resolution};
pub use tls::{NativeTls, PlatformTls};

#[cfg(unix)]
pub use tls::KeyTls;

#[cfg(all(target_os = "macos", any(target_arch = "x86_64", target_arch = "x86")))]
pub use tls::FastPathTls;
