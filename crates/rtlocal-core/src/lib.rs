//! # rtlocal-core
//!
//! Core types and traits for the rtlocal execution-context resolver.
//!
//! This crate is platform-agnostic and contains no OS-specific code.
//! The TLS backends and the kernel probe are in `rtlocal-runtime`.
//!
//! ## Modules
//!
//! - `traits` - TLS backend and cooperative-scheduler seams
//! - `offset` - Darwin kernel version to TSD offset table
//! - `error` - Error types
//! - `kprint` - Kernel-style leveled logging macros
//! - `config` - Environment configuration

pub mod traits;
pub mod offset;
pub mod error;
pub mod kprint;
pub mod config;

// Re-exports for convenience
pub use traits::{Fiber, FiberScheduler, NoFiber, NoScheduler, TlsBackend};
pub use offset::{offset_for_kernel, parse_kernel_major, PointerWidth};
pub use error::{ProbeError, ProbeResult, TlsError};
pub use config::LogConfig;
pub use kprint::LogLevel;
