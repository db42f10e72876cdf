//! Blocking and resuming a thread that never gets a chance to run keeps the
//! running thread (main) unaffected. `block`/`resume` on a non-running id
//! only ever touches the ready queue and the thread table, no context switch.

extern "C" fn worker() {
    loop {
        std::hint::spin_loop();
    }
}

#[test]
fn blocking_and_resuming_a_queued_non_running_thread() {
    uthreads::init(&[1_000]).unwrap();
    let tid = uthreads::spawn(worker, 0).unwrap();

    uthreads::block(tid).unwrap();
    assert_eq!(uthreads::running_id().unwrap(), 0);
    assert_eq!(uthreads::thread_quantums(tid).unwrap(), 0);

    // Blocking again and resuming twice are both harmless no-ops/idempotent.
    uthreads::block(tid).unwrap();
    uthreads::resume(tid).unwrap();
    uthreads::resume(tid).unwrap();

    assert_eq!(uthreads::running_id().unwrap(), 0);
}
