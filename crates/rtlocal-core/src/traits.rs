//! Backend and collaborator traits
//!
//! These traits define the interface between the platform-agnostic core,
//! the platform-specific TLS backends, and the cooperative scheduler that
//! lives outside this workspace.

use core::convert::Infallible;
use core::ffi::c_void;
use core::marker::PhantomData;

/// Per-thread pointer slot
///
/// Exactly one implementation is selected per target at compile time. All
/// functions act on the calling OS thread only; nothing is visible across
/// threads.
pub trait TlsBackend {
    /// Short backend name for diagnostics
    const NAME: &'static str;

    /// Bind `ptr` to the calling thread, replacing any previous value.
    ///
    /// The first call in a process performs any one-time setup the backend
    /// needs (key creation, offset probing).
    fn register(ptr: *mut c_void);

    /// Most recently registered pointer for the calling thread.
    ///
    /// Null if this thread never registered.
    fn current_raw() -> *mut c_void;
}

/// A cooperative task that owns one execution context
pub trait Fiber {
    /// Execution context type held by the fiber
    type Context;

    /// The context this fiber runs under
    fn context(&self) -> &Self::Context;
}

/// Scheduler-detection collaborator
///
/// Both queries are expected to be O(1) and answer for the calling OS
/// thread.
pub trait FiberScheduler {
    /// Execution context type shared by the scheduler's fibers
    type Context;

    /// Fiber type scheduled on this thread
    type Fiber: Fiber<Context = Self::Context>;

    /// Whether cooperative scheduling currently owns the calling thread
    fn is_active(&self) -> bool;

    /// The fiber currently running on the calling thread
    fn current_fiber(&self) -> Option<&Self::Fiber>;
}

/// Scheduler for engines with no cooperative layer
///
/// Never active, so resolution always goes to the thread binding.
pub struct NoScheduler<C> {
    _context: PhantomData<fn() -> C>,
}

impl<C> NoScheduler<C> {
    pub const fn new() -> Self {
        NoScheduler { _context: PhantomData }
    }
}

impl<C> Default for NoScheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Fiber type of [`NoScheduler`], cannot be constructed
pub struct NoFiber<C> {
    never: Infallible,
    _context: PhantomData<fn() -> C>,
}

impl<C> Fiber for NoFiber<C> {
    type Context = C;

    fn context(&self) -> &C {
        match self.never {}
    }
}

impl<C> FiberScheduler for NoScheduler<C> {
    type Context = C;
    type Fiber = NoFiber<C>;

    #[inline(always)]
    fn is_active(&self) -> bool {
        false
    }

    #[inline(always)]
    fn current_fiber(&self) -> Option<&NoFiber<C>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_scheduler_is_never_active() {
        let sched: NoScheduler<u64> = NoScheduler::new();
        assert!(!sched.is_active());
        assert!(sched.current_fiber().is_none());
    }

    #[test]
    fn test_no_scheduler_is_sync() {
        fn assert_sync<T: Send + Sync>() {}
        // Holds for context types that are neither Send nor Sync
        assert_sync::<NoScheduler<*mut u8>>();
    }
}
