//! Resolution cost per backend
//!
//! Measures `Resolver::current()` with no scheduler, and with an active
//! fiber, for every backend compiled on this host.
//!
//! # Environment Variables
//!
//! - `RTLOCAL_BENCH_ITERS=<n>` - Iterations per measurement (default 50M)

use rtlocal::{Fiber, FiberScheduler, NoScheduler, Resolver, TlsBackend};
use std::hint::black_box;
use std::time::Instant;

struct Runtime {
    id: u64,
}

static RT: Runtime = Runtime { id: 1 };
static FIBER_RT: Runtime = Runtime { id: 2 };

struct BenchFiber;

impl Fiber for BenchFiber {
    type Context = Runtime;

    fn context(&self) -> &Runtime {
        &FIBER_RT
    }
}

/// Always active, always the same fiber
struct AlwaysFiber(BenchFiber);

impl FiberScheduler for AlwaysFiber {
    type Context = Runtime;
    type Fiber = BenchFiber;

    fn is_active(&self) -> bool {
        true
    }

    fn current_fiber(&self) -> Option<&BenchFiber> {
        Some(&self.0)
    }
}

fn iterations() -> u64 {
    std::env::var("RTLOCAL_BENCH_ITERS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(50_000_000)
}

fn measure<S: FiberScheduler<Context = Runtime>, B: TlsBackend>(
    label: &str,
    resolver: &Resolver<S, B>,
    iters: u64,
) {
    resolver.register(&RT);

    let start = Instant::now();
    let mut sum = 0u64;
    for _ in 0..iters {
        sum = sum.wrapping_add(black_box(resolver).current().id);
    }
    let elapsed = start.elapsed();
    black_box(sum);

    println!(
        "{:<14} {:<10} {:>8.2} ns/op",
        resolver.backend_name(),
        label,
        elapsed.as_nanos() as f64 / iters as f64
    );
}

fn main() {
    let iters = iterations();
    println!("=== rtlocal Resolution Benchmark ({} iterations) ===\n", iters);

    // Each resolver uses a distinct backend slot, so they never alias
    let native: Resolver<NoScheduler<Runtime>, rtlocal::NativeTls> =
        unsafe { Resolver::with_backend(NoScheduler::new()) };
    measure("thread", &native, iters);

    #[cfg(unix)]
    {
        let keyed: Resolver<NoScheduler<Runtime>, rtlocal::KeyTls> =
            unsafe { Resolver::with_backend(NoScheduler::new()) };
        measure("thread", &keyed, iters);
    }

    #[cfg(all(target_os = "macos", any(target_arch = "x86_64", target_arch = "x86")))]
    {
        let fast: Resolver<NoScheduler<Runtime>, rtlocal::FastPathTls> =
            unsafe { Resolver::with_backend(NoScheduler::new()) };
        measure("thread", &fast, iters);
    }

    let fibered: Resolver<AlwaysFiber, rtlocal::NativeTls> =
        unsafe { Resolver::with_backend(AlwaysFiber(BenchFiber)) };
    measure("fiber", &fibered, iters);
}
