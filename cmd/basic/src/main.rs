//! Basic rtlocal example
//!
//! Two worker threads each own a runtime. Each worker then runs a few toy
//! fibers, every fiber with its own runtime, and resolves the current
//! runtime before, during and after them.
//!
//! # Environment Variables
//!
//! - `RTLOCAL_LOG_LEVEL=trace` - Show registrations and probe results
//! - `RTLOCAL_FLUSH_EPRINT=1` - Flush log output immediately

use rtlocal::{kinfo, Fiber, FiberScheduler, Resolver};
use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

/// Stand-in for engine-wide state
struct Runtime {
    name: String,
    calls: AtomicUsize,
}

impl Runtime {
    fn leak(name: String) -> &'static Runtime {
        Box::leak(Box::new(Runtime {
            name,
            calls: AtomicUsize::new(0),
        }))
    }
}

struct ToyFiber {
    runtime: &'static Runtime,
}

impl Fiber for ToyFiber {
    type Context = Runtime;

    fn context(&self) -> &Runtime {
        self.runtime
    }
}

thread_local! {
    static RUNNING: Cell<Option<&'static ToyFiber>> = const { Cell::new(None) };
}

/// Minimal cooperative "scheduler": runs one fiber body at a time on the
/// calling thread and publishes it in a thread-local
struct ToyScheduler;

impl ToyScheduler {
    fn run(fiber: &'static ToyFiber, body: impl FnOnce()) {
        RUNNING.with(|r| r.set(Some(fiber)));
        body();
        RUNNING.with(|r| r.set(None));
    }
}

impl FiberScheduler for ToyScheduler {
    type Context = Runtime;
    type Fiber = ToyFiber;

    fn is_active(&self) -> bool {
        RUNNING.with(|r| r.get().is_some())
    }

    fn current_fiber(&self) -> Option<&ToyFiber> {
        RUNNING.with(|r| r.get())
    }
}

// Only one context type is ever bound through this resolver
static RUNTIMES: Resolver<ToyScheduler> = unsafe { Resolver::new(ToyScheduler) };

/// An "engine entry point": touches whatever runtime owns the caller
fn engine_call(label: &str) {
    let rt = RUNTIMES.current();
    rt.calls.fetch_add(1, Ordering::Relaxed);
    println!(
        "[{}] {} -> runtime {}",
        thread::current().name().unwrap_or("?"),
        label,
        rt.name
    );
}

fn main() {
    println!("=== rtlocal Basic Example ===\n");
    println!("backend: {}", RUNTIMES.backend_name());
    println!("platform offset: {:#x}\n", rtlocal::platform_offset());

    let handles: Vec<_> = (0..2)
        .map(|w| {
            thread::Builder::new()
                .name(format!("worker-{}", w))
                .spawn(move || {
                    let own = Runtime::leak(format!("thread-rt-{}", w));
                    RUNTIMES.register(own);
                    kinfo!("registered {}", own.name);

                    engine_call("before fibers");

                    for f in 0..3 {
                        let fiber: &'static ToyFiber = Box::leak(Box::new(ToyFiber {
                            runtime: Runtime::leak(format!("fiber-rt-{}.{}", w, f)),
                        }));
                        ToyScheduler::run(fiber, || {
                            engine_call(&format!("fiber {}", f));
                            engine_call(&format!("fiber {} again", f));
                        });
                    }

                    engine_call("after fibers");
                    own.calls.load(Ordering::Relaxed)
                })
                .expect("failed to spawn worker")
        })
        .collect();

    for h in handles {
        let calls = h.join().expect("worker panicked");
        assert_eq!(calls, 2, "thread runtime should only see its own calls");
    }

    println!("\n=== Example Complete ===");
}
