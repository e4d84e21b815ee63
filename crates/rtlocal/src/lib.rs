//! # rtlocal - per-thread execution-context resolver
//!
//! Finds the engine "runtime" that owns whatever is executing right now.
//! An OS thread registers its runtime once; every hot-path entry point then
//! resolves it in O(1). When a cooperative scheduler multiplexes fibers on
//! the thread, the running fiber's runtime is returned instead.
//!
//! ## Quick Start
//!
//! ```ignore
//! use rtlocal::{NoScheduler, Resolver};
//!
//! struct Runtime { name: &'static str }
//!
//! // One resolver per process, shared by every thread
//! static RUNTIMES: Resolver<NoScheduler<Runtime>> =
//!     unsafe { Resolver::new(NoScheduler::new()) };
//!
//! fn main() {
//!     let rt: &'static Runtime = Box::leak(Box::new(Runtime { name: "main" }));
//!     RUNTIMES.register(rt);
//!     assert_eq!(RUNTIMES.current().name, "main");
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                Resolver::register / current                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │   resolve(): FiberScheduler active? -> fiber.context()      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ no
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//!    ┌───────────┐      ┌───────────┐      ┌─────────────┐
//!    │ NativeTls │      │  KeyTls   │      │ FastPathTls │
//!    │ (default) │      │ (pthread) │      │ (macOS gs)  │
//!    └───────────┘      └───────────┘      └─────────────┘
//!                                                 │
//!                                                 ▼
//!                                     ┌───────────────────────┐
//!                                     │ probe::platform_offset│
//!                                     └───────────────────────┘
//! ```

use core::marker::PhantomData;
use core::ptr::NonNull;
use std::ffi::c_void;

// Re-export core types
pub use rtlocal_core::{
    Fiber,
    FiberScheduler,
    NoFiber,
    NoScheduler,
    TlsBackend,
    ProbeError,
    TlsError,
    LogConfig,
};

// Re-export kprint macros for debug logging
pub use rtlocal_core::{kerror, kwarn, kinfo, kdebug, ktrace};
pub use rtlocal_core::kprint::{LogLevel, init as init_logging, set_log_level, set_flush_enabled};

// Re-export runtime types
pub use rtlocal_runtime::{
    platform_offset,
    resolve,
    NativeTls,
    PlatformTls,
    Resolution,
};

#[cfg(unix)]
pub use rtlocal_runtime::KeyTls;

#[cfg(all(target_os = "macos", any(target_arch = "x86_64", target_arch = "x86")))]
pub use rtlocal_runtime::FastPathTls;

/// Resolver for engines without a cooperative scheduler
pub type ThreadResolver<C> = Resolver<NoScheduler<C>>;

/// Registers and resolves the execution context of the calling thread
///
/// `S` answers whether a fiber currently owns the thread; `B` is the
/// per-thread slot, [`PlatformTls`] unless chosen explicitly.
pub struct Resolver<S, B = PlatformTls> {
    scheduler: S,
    _backend: PhantomData<fn() -> B>,
}

impl<S: FiberScheduler> Resolver<S, PlatformTls> {
    /// Create a resolver over the platform backend.
    ///
    /// # Safety
    ///
    /// Every resolver over the same backend reads and writes the same
    /// per-thread slot. All of them must use one context type, otherwise
    /// `current` reinterprets another resolver's context.
    pub const unsafe fn new(scheduler: S) -> Self {
        Resolver {
            scheduler,
            _backend: PhantomData,
        }
    }
}

impl<S: FiberScheduler, B: TlsBackend> Resolver<S, B> {
    /// Create a resolver over an explicit backend.
    ///
    /// # Safety
    ///
    /// Same contract as [`Resolver::new`], for backend `B`.
    pub const unsafe fn with_backend(scheduler: S) -> Self {
        Resolver {
            scheduler,
            _backend: PhantomData,
        }
    }

    /// Bind `ctx` as the calling thread's context.
    ///
    /// Replaces any earlier binding on this thread. The first registration
    /// in the process performs the backend's one-time setup.
    #[inline]
    pub fn register(&self, ctx: &'static S::Context) {
        // Safety: a 'static reference outlives every later resolution.
        unsafe { self.register_raw(NonNull::from(ctx)) }
    }

    /// Bind a context whose lifetime the caller manages.
    ///
    /// # Safety
    ///
    /// `ctx` must outlive every reference returned by
    /// [`current`](Self::current) or [`try_current`](Self::try_current) on
    /// this thread while it is bound. Those references borrow the resolver,
    /// not the binding, so re-registering or calling [`clear`](Self::clear)
    /// does not end them. Drop them before `ctx` is freed.
    #[inline]
    pub unsafe fn register_raw(&self, ctx: NonNull<S::Context>) {
        let ptr = ctx.as_ptr() as *mut c_void;
        rtlocal_core::ktrace!("register {:p} via {}", ptr, B::NAME);
        B::register(ptr);
    }

    /// Drop the calling thread's binding
    #[inline]
    pub fn clear(&self) {
        B::register(std::ptr::null_mut());
    }

    /// Context of whoever is logically running on this thread.
    ///
    /// The reference borrows `self`. A context bound with
    /// [`register_raw`](Self::register_raw) must outlive it.
    ///
    /// # Panics
    ///
    /// Panics if no fiber is active and nothing is registered on this
    /// thread.
    #[inline]
    #[track_caller]
    pub fn current(&self) -> &S::Context {
        match self.try_current() {
            Some(ctx) => ctx,
            None => unbound_panic(),
        }
    }

    /// Like [`current`](Self::current), but `None` when nothing is bound.
    ///
    /// The same lifetime rule as `current` applies to the returned reference.
    #[inline]
    pub fn try_current(&self) -> Option<&S::Context> {
        match resolve::<S, B>(&self.scheduler) {
            Resolution::Fiber(ctx) => Some(ctx),
            // Safety: `register` takes 'static; `register_raw` callers keep the
            // context alive for as long as the returned reference is used.
            Resolution::Thread(ptr) => Some(unsafe { ptr.as_ref() }),
            Resolution::Unbound => None,
        }
    }

    /// The injected scheduler
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Name of the TLS backend in use
    pub fn backend_name(&self) -> &'static str {
        B::NAME
    }
}

#[cold]
#[track_caller]
fn unbound_panic() -> ! {
    let thread = std::thread::current();
    panic!(
        "rtlocal: no execution context registered on thread {}",
        thread.name().unwrap_or("<unnamed>")
    );
}
