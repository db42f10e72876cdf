//! A thin `extern "C"` shim over the idiomatic API, for callers that expect
//! the assignment's original `int`-typed C signatures (`int
//! uthread_init(int *quantum_usecs, int size)` and friends) and the
//! traditional `0` on success / `-1` on failure surface instead of a
//! `Result`.
//!
//! Every argument here arrives as a signed `c_int`, exactly as the C
//! assignment declares it, so a negative quantum, priority, or tid is
//! representable and must be rejected before it is ever widened into this
//! crate's internal unsigned types. [`non_negative`] is that one checkpoint;
//! every function below runs its arguments through it before calling into
//! the idiomatic API, which does not duplicate the check.
//!
//! Every function here logs the underlying [`crate::ThreadLibError`] (via
//! the library's normal error-reporting path) before collapsing it to `-1`;
//! it does not duplicate that logging itself.

use std::os::raw::c_int;

use crate::error::{report, ThreadLibError};

/// See [`crate::init`]. `quantum_usecs` is read as `size` consecutive
/// `c_int`s; `size` and every quantum in the list must be non-negative.
#[unsafe(no_mangle)]
pub extern "C" fn uthread_init(quantum_usecs: *const c_int, size: c_int) -> c_int {
    if quantum_usecs.is_null() {
        return -1;
    }
    let Some(len) = non_negative("size", size) else {
        return -1;
    };
    // SAFETY: caller guarantees `quantum_usecs` points at `len` initialised
    // c_ints for the duration of this call.
    let raw = unsafe { std::slice::from_raw_parts(quantum_usecs, len as usize) };

    let mut quantum_usecs_u64 = Vec::with_capacity(raw.len());
    for &quantum in raw {
        match non_negative("quantum", quantum) {
            Some(q) => quantum_usecs_u64.push(q),
            None => return -1,
        }
    }

    to_c(crate::init(&quantum_usecs_u64).map(|()| 0))
}

/// See [`crate::spawn`]. `entry` must be a valid `extern "C" fn()`.
#[unsafe(no_mangle)]
pub extern "C" fn uthread_spawn(entry: crate::Entry, priority: c_int) -> c_int {
    let Some(priority) = non_negative("priority", priority) else {
        return -1;
    };
    to_c(crate::spawn(entry, priority as usize).map(|tid| tid as i64))
}

/// See [`crate::terminate`]. Terminating the main thread does not return.
#[unsafe(no_mangle)]
pub extern "C" fn uthread_terminate(tid: c_int) -> c_int {
    let Some(tid) = non_negative("tid", tid) else {
        return -1;
    };
    to_c(crate::terminate(tid as usize).map(|()| 0))
}

/// See [`crate::block`].
#[unsafe(no_mangle)]
pub extern "C" fn uthread_block(tid: c_int) -> c_int {
    let Some(tid) = non_negative("tid", tid) else {
        return -1;
    };
    to_c(crate::block(tid as usize).map(|()| 0))
}

/// See [`crate::resume`].
#[unsafe(no_mangle)]
pub extern "C" fn uthread_resume(tid: c_int) -> c_int {
    let Some(tid) = non_negative("tid", tid) else {
        return -1;
    };
    to_c(crate::resume(tid as usize).map(|()| 0))
}

/// See [`crate::change_priority`].
#[unsafe(no_mangle)]
pub extern "C" fn uthread_change_priority(tid: c_int, priority: c_int) -> c_int {
    let Some(tid) = non_negative("tid", tid) else {
        return -1;
    };
    let Some(priority) = non_negative("priority", priority) else {
        return -1;
    };
    to_c(crate::change_priority(tid as usize, priority as usize).map(|()| 0))
}

/// See [`crate::running_id`].
#[unsafe(no_mangle)]
pub extern "C" fn uthread_get_tid() -> c_int {
    to_c(crate::running_id().map(|tid| tid as i64))
}

/// See [`crate::total_quantums`].
#[unsafe(no_mangle)]
pub extern "C" fn uthread_get_total_quantums() -> c_int {
    to_c(crate::total_quantums().map(|q| q as i64))
}

/// See [`crate::thread_quantums`].
#[unsafe(no_mangle)]
pub extern "C" fn uthread_get_quantums(tid: c_int) -> c_int {
    let Some(tid) = non_negative("tid", tid) else {
        return -1;
    };
    to_c(crate::thread_quantums(tid as usize).map(|q| q as i64))
}

/// Rejects a negative `c_int` with a logged [`ThreadLibError::NegativeArgument`],
/// the one place in this shim that stands between a signed C argument and
/// this crate's unsigned internal representation.
fn non_negative(label: &'static str, value: c_int) -> Option<u64> {
    if value < 0 {
        report(ThreadLibError::NegativeArgument(label));
        None
    } else {
        Some(value as u64)
    }
}

fn to_c(result: Result<i64, crate::ThreadLibError>) -> c_int {
    match result {
        Ok(value) => value as c_int,
        Err(_) => -1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    extern "C" fn noop() {}

    #[test]
    fn negative_size_is_rejected_before_the_pointer_is_ever_read() {
        // A dangling non-null pointer is fine here: `size` is checked before
        // `from_raw_parts` ever runs.
        let bogus = std::ptr::NonNull::<c_int>::dangling().as_ptr();
        assert_eq!(uthread_init(bogus, -1), -1);
    }

    #[test]
    fn negative_quantum_anywhere_in_the_list_is_rejected() {
        let quanta: [c_int; 2] = [100, -1];
        assert_eq!(uthread_init(quanta.as_ptr(), 2), -1);
    }

    #[test]
    fn negative_tid_is_rejected_by_every_tid_taking_entry() {
        assert_eq!(uthread_terminate(-1), -1);
        assert_eq!(uthread_block(-1), -1);
        assert_eq!(uthread_resume(-1), -1);
        assert_eq!(uthread_get_quantums(-1), -1);
        assert_eq!(uthread_change_priority(-1, 0), -1);
    }

    #[test]
    fn negative_priority_is_rejected_by_spawn_and_change_priority() {
        assert_eq!(uthread_spawn(noop, -1), -1);
        assert_eq!(uthread_change_priority(0, -1), -1);
    }
}
