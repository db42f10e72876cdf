//! The dispatcher: the single primitive that performs a context switch
//! between two thread records and keeps the global quantum counter.

use crate::thread::Thread;

/// Counts total context switches performed, i.e. quanta elapsed across the
/// whole system. Main is pre-credited with its first quantum at construction.
pub(crate) struct Dispatcher {
    total_quantums: u64,
}

impl Dispatcher {
    pub(crate) fn new() -> Self {
        Dispatcher { total_quantums: 1 }
    }

    pub(crate) fn total_quantums(&self) -> u64 {
        self.total_quantums
    }

    /// Switches execution from `current` to `target`.
    ///
    /// Increments the global and per-target quantum counters *before*
    /// saving `current`'s context, so both counters already reflect the
    /// switch on both sides of it; they are not incremented again when
    /// `current` is later resumed, because step 2 below is simply not
    /// reached on that path.
    ///
    /// Returns to its caller once `current` is resumed by some future
    /// switch targeting it. Does not return on the path that restores
    /// `target` for the first time.
    ///
    /// # Safety
    /// `current` must be the thread presently executing this call, and
    /// `target`'s context and (if any) stack must still be valid.
    pub(crate) unsafe fn switch(&mut self, current: &mut Thread, target: &mut Thread) {
        self.total_quantums += 1;
        target.increment_quantum();

        // SAFETY: `current` is the caller; resuming it later re-enters here.
        let resumed = unsafe { current.context_mut().save() };
        if resumed {
            return;
        }
        // SAFETY: `target` owns a valid context (either the main thread's
        // captured frame or a freshly synthesised / previously saved one).
        unsafe { target.context().restore() }
    }
}
