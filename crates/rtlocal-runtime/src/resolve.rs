//! Fiber-aware resolution
//!
//! When a cooperative scheduler owns the thread, the running fiber's context
//! wins over whatever was registered on the thread. Fibers switch far more
//! often than threads register, so fiber switches never touch the TLS slot;
//! the slot only matters while no scheduler is active.

use core::ptr::NonNull;
use rtlocal_core::traits::{Fiber, FiberScheduler, TlsBackend};

/// Where the current execution context came from
#[derive(Debug)]
pub enum Resolution<'a, C> {
    /// Context of the fiber running on this thread
    Fiber(&'a C),
    /// Context registered on this OS thread
    Thread(NonNull<C>),
    /// Nothing is bound to this thread
    Unbound,
}

impl<'a, C> Resolution<'a, C> {
    /// Raw pointer to the resolved context
    #[inline]
    pub fn as_ptr(&self) -> Option<NonNull<C>> {
        match self {
            Resolution::Fiber(ctx) => Some(NonNull::from(*ctx)),
            Resolution::Thread(ptr) => Some(*ptr),
            Resolution::Unbound => None,
        }
    }

    /// Whether the context came from the running fiber
    #[inline]
    pub fn is_fiber(&self) -> bool {
        matches!(self, Resolution::Fiber(_))
    }
}

/// Resolve the context for whoever is logically running on this thread.
///
/// A scheduler that reports itself active but has no current fiber falls
/// through to the thread binding.
#[inline]
pub fn resolve<S, B>(scheduler: &S) -> Resolution<'_, S::Context>
where
    S: FiberScheduler,
    B: TlsBackend,
{
    if scheduler.is_active() {
        if let Some(fiber) = scheduler.current_fiber() {
            return Resolution::Fiber(fiber.context());
        }
    }

    match NonNull::new(B::current_raw()) {
        Some(ptr) => Resolution::Thread(ptr.cast()),
        None => Resolution::Unbound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tls::NativeTls;
    use rtlocal_core::traits::NoScheduler;
    use std::cell::Cell;
    use std::ffi::c_void;
    use std::thread;

    #[derive(Debug, PartialEq)]
    struct Ctx(&'static str);

    struct TestFiber {
        ctx: Ctx,
    }

    impl Fiber for TestFiber {
        type Context = Ctx;

        fn context(&self) -> &Ctx {
            &self.ctx
        }
    }

    /// Scheduler whose activity is toggled by the test
    struct ToggleScheduler {
        active: Cell<bool>,
        fiber: Option<TestFiber>,
    }

    impl FiberScheduler for ToggleScheduler {
        type Context = Ctx;
        type Fiber = TestFiber;

        fn is_active(&self) -> bool {
            self.active.get()
        }

        fn current_fiber(&self) -> Option<&TestFiber> {
            self.fiber.as_ref()
        }
    }

    fn bind(ctx: &'static Ctx) {
        NativeTls::register(ctx as *const Ctx as *mut c_void);
    }

    fn context_of<'a>(r: &Resolution<'a, Ctx>) -> &'a str {
        match r {
            Resolution::Fiber(ctx) => ctx.0,
            Resolution::Thread(ptr) => unsafe { ptr.as_ref() }.0,
            Resolution::Unbound => "<unbound>",
        }
    }

    #[test]
    fn test_unbound_without_registration() {
        thread::spawn(|| {
            let sched = NoScheduler::<Ctx>::new();
            let r = resolve::<_, NativeTls>(&sched);
            assert!(matches!(r, Resolution::Unbound));
            assert!(r.as_ptr().is_none());
        })
        .join()
        .unwrap();
    }

    #[test]
    fn test_thread_binding() {
        static A: Ctx = Ctx("A");
        thread::spawn(|| {
            bind(&A);
            let sched = NoScheduler::<Ctx>::new();
            let r = resolve::<_, NativeTls>(&sched);
            assert!(!r.is_fiber());
            assert_eq!(context_of(&r), "A");
            assert_eq!(r.as_ptr(), Some(NonNull::from(&A)));
        })
        .join()
        .unwrap();
    }

    #[test]
    fn test_active_fiber_overrides_thread() {
        static A: Ctx = Ctx("A");
        thread::spawn(|| {
            bind(&A);
            let sched = ToggleScheduler {
                active: Cell::new(false),
                fiber: Some(TestFiber { ctx: Ctx("B") }),
            };

            assert_eq!(context_of(&resolve::<_, NativeTls>(&sched)), "A");

            sched.active.set(true);
            let r = resolve::<_, NativeTls>(&sched);
            assert!(r.is_fiber());
            assert_eq!(context_of(&r), "B");

            sched.active.set(false);
            assert_eq!(context_of(&resolve::<_, NativeTls>(&sched)), "A");
        })
        .join()
        .unwrap();
    }

    #[test]
    fn test_active_without_fiber_falls_through() {
        static A: Ctx = Ctx("A");
        thread::spawn(|| {
            let sched = ToggleScheduler {
                active: Cell::new(true),
                fiber: None,
            };
            assert!(matches!(resolve::<_, NativeTls>(&sched), Resolution::Unbound));

            bind(&A);
            assert_eq!(context_of(&resolve::<_, NativeTls>(&sched)), "A");
        })
        .join()
        .unwrap();
    }
}
