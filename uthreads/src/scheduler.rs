//! The scheduler: thread table, ready queue, running thread, priority table,
//! timer programming, and the state-transition logic behind every public
//! entry point.

use std::collections::VecDeque;
use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};
use std::time::Duration;

use crate::dispatcher::Dispatcher;
use crate::error::{report, SystemError, ThreadLibError};
use crate::thread::{Thread, ThreadState};
use crate::{Entry, MAX_THREAD_NUM};

/// Process-wide singleton pointer, the same role the source this design is
/// modeled on gives its static `Scheduler *me`: the timer signal handler has
/// no argument-passing channel of its own and must reach the same scheduler
/// state every public entry point mutates.
static SCHEDULER: AtomicPtr<Scheduler> = AtomicPtr::new(ptr::null_mut());

pub(crate) struct Scheduler {
    /// Fixed-capacity thread table; `threads[id]` is `None` for an empty
    /// slot. The table is the sole owner of every `Thread`; the ready queue
    /// below holds only ids, resolved back through this table at dispatch
    /// time.
    threads: Vec<Option<Thread>>,
    ready: VecDeque<usize>,
    running: usize,
    quantum_table: Vec<Duration>,
    dispatcher: Dispatcher,
    /// A self-terminated thread's id, pending reclamation. Its slot cannot be
    /// freed synchronously inside its own `terminate` call because that call
    /// is still executing on the dying thread's own stack; freeing the stack
    /// there would be a use-after-free. It is reclaimed instead at the top of
    /// the next dispatch that runs on a *different* thread's stack.
    zombie: Option<usize>,
}

impl Scheduler {
    fn new(quantum_usecs: &[u64]) -> Result<Self, ThreadLibError> {
        if quantum_usecs.is_empty() {
            return Err(report(ThreadLibError::EmptyQuantumList));
        }
        let quantum_table = quantum_usecs.iter().map(|&us| Duration::from_micros(us)).collect();
        let mut threads: Vec<Option<Thread>> = (0..MAX_THREAD_NUM).map(|_| None).collect();
        threads[0] = Some(Thread::main());
        Ok(Scheduler {
            threads,
            ready: VecDeque::new(),
            running: 0,
            quantum_table,
            dispatcher: Dispatcher::new(),
            zombie: None,
        })
    }

    /// Reclaims a previously self-terminated thread's stack, if one is
    /// pending. Safe to call from any context except the zombie's own
    /// (which cannot happen, since that context never runs again).
    fn reap_zombie(&mut self) {
        if let Some(id) = self.zombie.take() {
            self.threads[id] = None;
        }
    }

    fn arm_timer(&self, priority: usize) {
        let quantum = self.quantum_table[priority];
        let value = libc::itimerval {
            it_interval: libc::timeval { tv_sec: 0, tv_usec: 0 },
            it_value: libc::timeval {
                tv_sec: quantum.as_secs() as libc::time_t,
                tv_usec: quantum.subsec_micros() as i64 as libc::suseconds_t,
            },
        };
        unsafe {
            if libc::setitimer(libc::ITIMER_VIRTUAL, &value, ptr::null_mut()) != 0 {
                SystemError::SetTimerFailed.die();
            }
        }
    }

    fn live_thread(&self, tid: usize) -> Result<&Thread, ThreadLibError> {
        self.threads
            .get(tid)
            .and_then(Option::as_ref)
            .ok_or_else(|| report(ThreadLibError::UnknownThread(tid)))
    }

    fn live_thread_mut(&mut self, tid: usize) -> Result<&mut Thread, ThreadLibError> {
        self.threads
            .get_mut(tid)
            .and_then(Option::as_mut)
            .ok_or_else(|| report(ThreadLibError::UnknownThread(tid)))
    }

    /// Pops ready-queue entries until a genuinely `Ready` thread is found,
    /// reclaiming any `Terminated` entries it skips (they are always safe to
    /// reclaim here: this function never runs on the stack of the thread it
    /// is reclaiming). Stale entries whose slot is already empty are simply
    /// discarded. Returns `None` if the queue drains without finding one.
    fn pop_next_runnable(&mut self) -> Option<usize> {
        while let Some(id) = self.ready.pop_front() {
            match self.threads[id].as_ref().map(Thread::state) {
                Some(ThreadState::Ready) => return Some(id),
                Some(ThreadState::Terminated) => self.threads[id] = None,
                Some(ThreadState::Blocked) | None => {}
            }
        }
        None
    }

    /// Same as `pop_next_runnable`, but falls back to the main thread (id 0)
    /// if the queue drains without finding a runnable thread. This is the
    /// fallback `block`/`terminate` use when the self-running thread gives
    /// up the CPU.
    fn pop_next_runnable_or_main(&mut self) -> usize {
        self.pop_next_runnable().unwrap_or(0)
    }

    /// Switches execution from `current_id` to `target_id`, updating
    /// `running` to reflect the new owner before the switch happens.
    fn switch_to(&mut self, current_id: usize, target_id: usize) {
        debug_assert_ne!(current_id, target_id);
        self.running = target_id;
        let threads = self.threads.as_mut_ptr();
        // SAFETY: current_id != target_id, so these reference disjoint
        // elements of the same Vec.
        let current = unsafe { (*threads.add(current_id)).as_mut() }.expect("current thread missing");
        let target = unsafe { (*threads.add(target_id)).as_mut() }.expect("target thread missing");
        debug_assert_eq!(current.id(), current_id, "a thread's table slot must match its own id");
        debug_assert_eq!(target.id(), target_id, "a thread's table slot must match its own id");
        unsafe { self.dispatcher.switch(current, target) };
    }

    pub(crate) fn spawn(&mut self, entry: Entry, priority: usize) -> Result<usize, ThreadLibError> {
        if priority >= self.quantum_table.len() {
            return Err(report(ThreadLibError::UnknownPriority(priority)));
        }
        let slot = match self.threads.iter().position(Option::is_none) {
            Some(slot) => slot,
            None => {
                let live = self.threads.iter().filter(|t| t.is_some()).count();
                return Err(report(ThreadLibError::CapacityExhausted(live)));
            }
        };
        // Defensive: a stale queue entry for this exact id should not be
        // reachable once ids are resolved through the table at dispatch
        // time (an empty slot is simply skipped), but the sweep is kept as
        // belt-and-suspenders against a future change to that invariant.
        self.ready.retain(|&id| id != slot);
        self.threads[slot] = Some(Thread::spawned(slot, priority, entry, crate::STACK_SIZE));
        self.ready.push_back(slot);
        Ok(slot)
    }

    pub(crate) fn terminate(&mut self, tid: usize) -> Result<(), ThreadLibError> {
        self.live_thread_mut(tid)?.set_state(ThreadState::Terminated);

        if tid == 0 {
            self.shutdown();
        }

        if tid == self.running {
            self.zombie = Some(tid);
            let next = self.pop_next_runnable_or_main();
            self.switch_to(tid, next);
            unreachable!("a terminated thread's context is never restored");
        }

        self.threads[tid] = None;
        Ok(())
    }

    /// Disarms the timer, restores the default disposition for `SIGVTALRM`,
    /// and exits the process successfully. Never returns.
    fn shutdown(&mut self) -> ! {
        unsafe {
            let mut sa: libc::sigaction = std::mem::zeroed();
            sa.sa_sigaction = libc::SIG_IGN;
            libc::sigemptyset(&mut sa.sa_mask);
            if libc::sigaction(libc::SIGVTALRM, &sa, ptr::null_mut()) != 0 {
                SystemError::SigActionFailed.die();
            }
        }
        std::process::exit(0);
    }

    pub(crate) fn block(&mut self, tid: usize) -> Result<(), ThreadLibError> {
        if tid == 0 {
            return Err(report(ThreadLibError::MainCannotBlock));
        }
        self.live_thread_mut(tid)?.set_state(ThreadState::Blocked);
        if tid != self.running {
            self.ready.retain(|&id| id != tid);
        } else {
            let next = self.pop_next_runnable_or_main();
            self.switch_to(tid, next);
        }
        Ok(())
    }

    pub(crate) fn resume(&mut self, tid: usize) -> Result<(), ThreadLibError> {
        let thread = self.live_thread_mut(tid)?;
        if thread.state() == ThreadState::Blocked {
            thread.set_state(ThreadState::Ready);
            self.ready.push_back(tid);
        }
        Ok(())
    }

    pub(crate) fn change_priority(&mut self, tid: usize, priority: usize) -> Result<(), ThreadLibError> {
        if priority >= self.quantum_table.len() {
            return Err(report(ThreadLibError::UnknownPriority(priority)));
        }
        self.live_thread_mut(tid)?.set_priority(priority);
        Ok(())
    }

    pub(crate) fn running_id(&self) -> usize {
        self.running
    }

    pub(crate) fn total_quantums(&self) -> u64 {
        self.dispatcher.total_quantums()
    }

    pub(crate) fn thread_quantums(&self, tid: usize) -> Result<u64, ThreadLibError> {
        Ok(self.live_thread(tid)?.quantum_count())
    }

    /// The timer-signal preemption algorithm. Invoked from the `SIGVTALRM`
    /// handler; must not allocate or touch anything the rest of the API
    /// hasn't already made signal-safe.
    fn tick(&mut self) {
        self.reap_zombie();

        if self.ready.is_empty() {
            self.arm_timer(self.threads[self.running].as_ref().unwrap().priority());
            return;
        }

        if self.ready.front() != Some(&self.running) {
            self.ready.push_back(self.running);
        }

        let prev = self.running;
        let next = match self.pop_next_runnable() {
            Some(id) => id,
            None => {
                self.arm_timer(self.threads[prev].as_ref().unwrap().priority());
                return;
            }
        };

        self.arm_timer(self.threads[next].as_ref().unwrap().priority());
        if next != prev {
            self.switch_to(prev, next);
        }
    }
}

/// Installs the scheduler singleton. Returns a library error if one is
/// already installed.
pub(crate) fn install(quantum_usecs: &[u64]) -> Result<(), ThreadLibError> {
    if !SCHEDULER.load(Ordering::Acquire).is_null() {
        return Err(report(ThreadLibError::AlreadyInitialised));
    }
    let scheduler = Scheduler::new(quantum_usecs)?;
    install_signal_handler();
    let boxed = Box::new(scheduler);
    let ptr = Box::into_raw(boxed);
    unsafe { (*ptr).arm_timer(0) };
    SCHEDULER.store(ptr, Ordering::Release);
    Ok(())
}

fn install_signal_handler() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = timer_signal_trampoline as usize;
        libc::sigemptyset(&mut sa.sa_mask);
        if libc::sigaction(libc::SIGVTALRM, &sa, ptr::null_mut()) != 0 {
            SystemError::SigActionFailed.die();
        }
    }
}

extern "C" fn timer_signal_trampoline(_signum: libc::c_int) {
    if let Some(scheduler) = get() {
        scheduler.tick();
    }
}

fn get() -> Option<&'static mut Scheduler> {
    let ptr = SCHEDULER.load(Ordering::Acquire);
    if ptr.is_null() {
        None
    } else {
        Some(unsafe { &mut *ptr })
    }
}

/// Runs `f` against the installed scheduler, reaping any pending zombie
/// first. Returns a library error if the library has not been initialised.
pub(crate) fn with<T>(f: impl FnOnce(&mut Scheduler) -> T) -> Result<T, ThreadLibError> {
    let scheduler = get().ok_or_else(|| report(ThreadLibError::NotInitialised))?;
    scheduler.reap_zombie();
    Ok(f(scheduler))
}

/// Called from the assembly trampoline (`context.rs`) when a thread's entry
/// function returns instead of calling `terminate` on itself.
pub(crate) fn handle_entry_return() -> ! {
    let _critical_section = crate::critical_section::CriticalSection::enter();
    let scheduler = get().expect("a running thread implies an installed scheduler");
    scheduler.reap_zombie();
    let running = scheduler.running_id();
    match scheduler.terminate(running) {
        Ok(()) => unreachable!("self-terminate never returns"),
        Err(_) => unreachable!("the running thread's id is always valid"),
    }
}
