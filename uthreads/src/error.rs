//! Error types for the thread library.
//!
//! The library distinguishes two disjoint classes of failure: [`ThreadLibError`],
//! caller misuse that is reported back through a normal `Err` and is never fatal,
//! and [`SystemError`], a failure of an underlying OS primitive that the library
//! has no sensible way to recover from and that terminates the process.

use thiserror::Error;

/// Caller-misuse errors. Every public entry point that can fail returns one of
/// these; none of them are fatal to the process.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ThreadLibError {
    #[error("no thread with id {0}")]
    UnknownThread(usize),

    #[error("priority {0} is not in the configured quantum table")]
    UnknownPriority(usize),

    #[error("thread table is full ({0} live threads)")]
    CapacityExhausted(usize),

    #[error("the main thread (id 0) cannot be blocked")]
    MainCannotBlock,

    #[error("quantum list passed to init must contain at least one entry")]
    EmptyQuantumList,

    #[error("already initialised")]
    AlreadyInitialised,

    #[error("not initialised")]
    NotInitialised,

    #[error("{0} must not be negative")]
    NegativeArgument(&'static str),
}

/// Failures of an OS-level primitive (signal, timer, memory). These are
/// logged with a `system error:` prefix and cause the process to exit with a
/// failure status; there is no recovery path once the preemption mechanism
/// cannot be armed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SystemError {
    #[error("sigaction failed")]
    SigActionFailed,

    #[error("setitimer failed")]
    SetTimerFailed,

    #[error("sigprocmask failed")]
    SigProcMaskFailed,

    #[error("failed to allocate a thread stack")]
    StackAllocFailed,
}

impl SystemError {
    /// Logs the `system error:` diagnostic and terminates the process.
    ///
    /// There is no return from this function.
    pub fn die(self) -> ! {
        log::error!("system error: {self}");
        std::process::exit(1);
    }
}

/// Logs a `thread library error:` diagnostic for a caller-misuse error.
/// Called at the point each `ThreadLibError` is constructed so every
/// rejected call leaves exactly one line on the log.
pub(crate) fn report(err: ThreadLibError) -> ThreadLibError {
    log::error!("thread library error: {err}");
    err
}
