//! A preemptive user-space thread library.
//!
//! Threads are cooperative in the sense that any of them may call
//! [`block`]/[`resume`]/[`terminate`] at will, and preemptive in the sense
//! that the scheduler interrupts the running thread whenever its quantum
//! (a slice of CPU time whose length is chosen by the thread's priority)
//! elapses, driven by `SIGVTALRM` and [`libc::setitimer`].
//!
//! ```no_run
//! extern "C" fn worker() {
//!     loop {
//!         uthreads::resume(0).ok();
//!     }
//! }
//!
//! uthreads::init(&[100_000, 200_000]).unwrap();
//! let tid = uthreads::spawn(worker, 0).unwrap();
//! uthreads::block(tid).unwrap();
//! ```

mod context;
mod critical_section;
mod dispatcher;
mod error;
mod ffi;
mod scheduler;
mod thread;

pub use error::{SystemError, ThreadLibError};

use critical_section::CriticalSection;

/// Upper bound on the number of simultaneously live threads, main included.
pub const MAX_THREAD_NUM: usize = 100;

/// Stack size, in bytes, allocated for every spawned thread.
pub const STACK_SIZE: usize = 64 * 1024;

/// A thread's entry point. Takes no arguments and is expected to either run
/// forever or terminate itself; if it returns, the library terminates the
/// thread on its behalf.
pub type Entry = extern "C" fn();

/// Initialises the library with a priority-indexed table of quantum lengths,
/// in microseconds. `quantum_usecs[p]` is the quantum length for priority
/// `p`; priorities therefore range over `0..quantum_usecs.len()`.
///
/// Must be called exactly once, before any other function in this crate.
/// Installs the `SIGVTALRM` handler and arms the timer for the main thread's
/// first quantum.
pub fn init(quantum_usecs: &[u64]) -> Result<(), ThreadLibError> {
    let _cs = CriticalSection::enter();
    scheduler::install(quantum_usecs)
}

/// Spawns a new thread running `entry` at the given `priority`. Returns the
/// new thread's id, the lowest currently unused id starting from 1.
pub fn spawn(entry: Entry, priority: usize) -> Result<usize, ThreadLibError> {
    let _cs = CriticalSection::enter();
    scheduler::with(|s| s.spawn(entry, priority))?
}

/// Terminates the thread identified by `tid`. Terminating the main thread
/// (id 0) ends the process with exit code 0 and does not return. Terminating
/// the running thread switches control to the next ready thread and does
/// not return either; terminating any other thread returns normally.
pub fn terminate(tid: usize) -> Result<(), ThreadLibError> {
    let _cs = CriticalSection::enter();
    scheduler::with(|s| s.terminate(tid))?
}

/// Blocks the thread identified by `tid`; it will not run again until a
/// matching [`resume`]. Blocking the running thread switches to the next
/// ready thread and returns only once some later call resumes it. The main
/// thread (id 0) cannot be blocked.
pub fn block(tid: usize) -> Result<(), ThreadLibError> {
    let _cs = CriticalSection::enter();
    scheduler::with(|s| s.block(tid))?
}

/// Moves a blocked thread back onto the ready queue. A no-op, not an error,
/// if `tid` is not currently blocked (including if it has already
/// terminated, so long as its id is still live).
pub fn resume(tid: usize) -> Result<(), ThreadLibError> {
    let _cs = CriticalSection::enter();
    scheduler::with(|s| s.resume(tid))?
}

/// Changes the priority used to choose `tid`'s quantum length on its next
/// dispatch. Never affects dispatch order; priority decides quantum length
/// only.
pub fn change_priority(tid: usize, priority: usize) -> Result<(), ThreadLibError> {
    let _cs = CriticalSection::enter();
    scheduler::with(|s| s.change_priority(tid, priority))?
}

/// The id of the currently running thread.
pub fn running_id() -> Result<usize, ThreadLibError> {
    let _cs = CriticalSection::enter();
    scheduler::with(|s| s.running_id())
}

/// The total number of quanta that have elapsed since [`init`], counting the
/// one main is credited with at startup.
pub fn total_quantums() -> Result<u64, ThreadLibError> {
    let _cs = CriticalSection::enter();
    scheduler::with(|s| s.total_quantums())
}

/// The number of quanta `tid` has been running for, counting the quantum
/// during which it was first dispatched.
pub fn thread_quantums(tid: usize) -> Result<u64, ThreadLibError> {
    let _cs = CriticalSection::enter();
    scheduler::with(|s| s.thread_quantums(tid))?
}
