//! A small multi-thread demo: two workers at different priorities trade off
//! the CPU under the scheduler's preemption, one blocks and is resumed by the
//! other, and the main thread tears the whole thing down by terminating
//! itself once both workers have run for a while.

use std::sync::atomic::{AtomicU64, Ordering};

/// Priority 0 gets a short quantum, priority 1 a longer one. Only quantum
/// *length* depends on priority; dispatch order never does.
const QUANTA_USECS: &[u64] = &[20_000, 60_000];

static COUNTER_A: AtomicU64 = AtomicU64::new(0);
static COUNTER_B: AtomicU64 = AtomicU64::new(0);
static WORKER_B_TID: AtomicU64 = AtomicU64::new(0);

extern "C" fn worker_a() {
    let tid = uthreads::running_id().expect("worker_a is running");
    loop {
        let n = COUNTER_A.fetch_add(1, Ordering::Relaxed);
        if n == 3 {
            let b = WORKER_B_TID.load(Ordering::Relaxed) as usize;
            log::info!("worker {tid} resuming worker {b}");
            uthreads::resume(b).ok();
        }
        if n >= 10 {
            log::info!("worker {tid} terminating itself after {n} quanta");
            uthreads::terminate(tid).expect("a thread can always terminate itself");
        }
    }
}

extern "C" fn worker_b() {
    let tid = uthreads::running_id().expect("worker_b is running");
    WORKER_B_TID.store(tid as u64, Ordering::Relaxed);
    log::info!("worker {tid} blocking itself until resumed");
    uthreads::block(tid).expect("a thread can always block itself");
    loop {
        let n = COUNTER_B.fetch_add(1, Ordering::Relaxed);
        if n >= 5 {
            log::info!("worker {tid} terminating itself after {n} quanta");
            uthreads::terminate(tid).expect("a thread can always terminate itself");
        }
    }
}

fn main() {
    env_logger::init();

    uthreads::init(QUANTA_USECS).expect("quantum table is non-empty");
    let a = uthreads::spawn(worker_a, 0).expect("thread table has room");
    let b = uthreads::spawn(worker_b, 1).expect("thread table has room");
    log::info!("spawned worker {a} at priority 0 and worker {b} at priority 1");

    // Main just spins, burning virtual CPU time so its own quantum expires
    // and the scheduler gets to dispatch the workers above.
    let mut iterations: u64 = 0;
    while COUNTER_A.load(Ordering::Relaxed) < 10 {
        iterations = iterations.wrapping_add(1);
        std::hint::spin_loop();
    }

    log::info!(
        "main observed {iterations} spin iterations, {} total quanta elapsed",
        uthreads::total_quantums().unwrap_or_default()
    );

    // Ends the process; terminating the main thread is the library's
    // documented shutdown path and does not return.
    uthreads::terminate(0).expect("main always exists");
}
