//! Per-thread record: state, priority, saved context, and owned stack.

use crate::context::Context;
use crate::error::SystemError;

/// A user-space thread's lifecycle state.
///
/// The currently-running thread is not given a separate `Running` variant; it
/// is `Ready`, distinguished only by being the scheduler's `running` id and
/// by its absence from the ready queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadState {
    Ready,
    Blocked,
    Terminated,
}

/// A single user thread's record: identity, scheduling state, saved machine
/// context, and (for every thread but main) its owned stack buffer.
pub struct Thread {
    id: usize,
    priority: usize,
    state: ThreadState,
    context: Context,
    quantum_count: u64,
    /// `None` for the main thread, which runs on the process stack.
    stack: Option<Box<[u8]>>,
}

impl Thread {
    /// Builds the main thread's record (id 0). No stack is allocated; the
    /// context is captured in the calling frame so a later restore resumes
    /// inside `init`'s caller. Its quantum count starts at 1: the quantum
    /// during which `init` itself returns already counts as main's first.
    pub(crate) fn main() -> Self {
        Thread {
            id: 0,
            priority: 0,
            state: ThreadState::Ready,
            context: Context::empty(),
            quantum_count: 1,
            stack: None,
        }
    }

    /// Builds a user thread: allocates a `stack_size`-byte stack and
    /// synthesises a context that begins executing `entry` on it.
    pub(crate) fn spawned(id: usize, priority: usize, entry: extern "C" fn(), stack_size: usize) -> Self {
        let mut stack = allocate_stack(stack_size);
        let context = Context::fresh(&mut stack, entry);
        Thread {
            id,
            priority,
            state: ThreadState::Ready,
            context,
            quantum_count: 0,
            stack: Some(stack),
        }
    }

    pub(crate) fn id(&self) -> usize {
        self.id
    }

    pub(crate) fn priority(&self) -> usize {
        self.priority
    }

    pub(crate) fn set_priority(&mut self, priority: usize) {
        self.priority = priority;
    }

    pub(crate) fn state(&self) -> ThreadState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: ThreadState) {
        self.state = state;
    }

    pub(crate) fn quantum_count(&self) -> u64 {
        self.quantum_count
    }

    pub(crate) fn increment_quantum(&mut self) {
        self.quantum_count += 1;
    }

    pub(crate) fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    pub(crate) fn context(&self) -> &Context {
        &self.context
    }
}

/// Allocates a zeroed `size`-byte stack, falling back to the library's
/// `system error:` diagnostic rather than Rust's default OOM abort if the
/// reservation can't be satisfied.
fn allocate_stack(size: usize) -> Box<[u8]> {
    let mut stack = Vec::new();
    if stack.try_reserve_exact(size).is_err() {
        SystemError::StackAllocFailed.die();
    }
    stack.resize(size, 0u8);
    stack.into_boxed_slice()
}

#[cfg(test)]
mod tests {
    use super::*;

    extern "C" fn noop() {}

    #[test]
    fn main_thread_has_no_stack_and_one_precredited_quantum() {
        let main = Thread::main();
        assert_eq!(main.id(), 0);
        assert_eq!(main.priority(), 0);
        assert_eq!(main.state(), ThreadState::Ready);
        assert_eq!(main.quantum_count(), 1);
        assert!(main.stack.is_none());
    }

    #[test]
    fn spawned_thread_owns_a_stack_of_the_requested_size() {
        let t = Thread::spawned(3, 1, noop, 4096);
        assert_eq!(t.id(), 3);
        assert_eq!(t.priority(), 1);
        assert_eq!(t.quantum_count(), 0);
        assert_eq!(t.stack.as_ref().unwrap().len(), 4096);
    }

    #[test]
    fn state_and_priority_are_independently_mutable() {
        let mut t = Thread::spawned(1, 0, noop, 4096);
        t.set_state(ThreadState::Blocked);
        t.set_priority(2);
        assert_eq!(t.state(), ThreadState::Blocked);
        assert_eq!(t.priority(), 2);
    }

    #[test]
    fn increment_quantum_counts_every_call() {
        let mut t = Thread::spawned(1, 0, noop, 4096);
        t.increment_quantum();
        t.increment_quantum();
        assert_eq!(t.quantum_count(), 2);
    }
}
