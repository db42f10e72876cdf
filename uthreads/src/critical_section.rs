//! The critical-section discipline that keeps scheduler state consistent in
//! the presence of the asynchronous preemption signal.
//!
//! Every public entry point that mutates scheduler state wraps its body in a
//! [`CriticalSection`]: a scoped guard that blocks `SIGVTALRM` on
//! construction and unblocks it on drop, on every exit path.
//!
//! Self-terminate is the one operation whose guard never drops: the dying
//! thread switches away mid-call and its stack frame, guard included, is
//! simply abandoned. That is harmless rather than a leak, because
//! [`crate::context::Context::restore`] always installs the *target*
//! thread's own saved mask with `SIG_SETMASK` rather than incrementally
//! unblocking. Whichever thread is switched into continues with exactly
//! the mask it itself last saved, irrespective of what the thread it
//! replaced had blocked.

use std::mem::MaybeUninit;

use crate::error::SystemError;

/// RAII guard that blocks `SIGVTALRM` for its lifetime.
pub(crate) struct CriticalSection;

impl CriticalSection {
    /// Blocks `SIGVTALRM` and returns a guard that unblocks it when dropped.
    pub(crate) fn enter() -> Self {
        block_vtalrm();
        CriticalSection
    }
}

impl Drop for CriticalSection {
    fn drop(&mut self) {
        unblock_vtalrm();
    }
}

fn block_vtalrm() {
    let mut set = empty_sigset();
    unsafe {
        libc::sigaddset(&mut set, libc::SIGVTALRM);
        if libc::sigprocmask(libc::SIG_BLOCK, &set, std::ptr::null_mut()) != 0 {
            SystemError::SigProcMaskFailed.die();
        }
    }
}

fn unblock_vtalrm() {
    let mut set = empty_sigset();
    unsafe {
        libc::sigaddset(&mut set, libc::SIGVTALRM);
        if libc::sigprocmask(libc::SIG_UNBLOCK, &set, std::ptr::null_mut()) != 0 {
            SystemError::SigProcMaskFailed.die();
        }
    }
}

fn empty_sigset() -> libc::sigset_t {
    let mut set = MaybeUninit::<libc::sigset_t>::uninit();
    unsafe {
        libc::sigemptyset(set.as_mut_ptr());
        set.assume_init()
    }
}
