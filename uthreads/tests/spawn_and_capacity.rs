//! Exercises `spawn` through the public API until the thread table is full.
//!
//! The scheduler is a process-wide singleton and assumes a single kernel
//! thread drives it (see the crate's Non-goals), so every scenario here gets
//! its own `#[test]` *and its own integration-test file*: cargo gives each
//! `tests/*.rs` file its own process, but would otherwise run the `#[test]`
//! functions within one file concurrently on separate OS threads, which this
//! library is not built to tolerate.

extern "C" fn worker() {
    loop {
        std::hint::spin_loop();
    }
}

#[test]
fn spawn_fills_the_table_then_rejects() {
    uthreads::init(&[1_000]).unwrap();

    for expected in 1..uthreads::MAX_THREAD_NUM {
        assert_eq!(uthreads::spawn(worker, 0).unwrap(), expected);
    }
    assert!(uthreads::spawn(worker, 0).is_err());

    assert_eq!(uthreads::running_id().unwrap(), 0);
    assert_eq!(uthreads::total_quantums().unwrap(), 1);
}
