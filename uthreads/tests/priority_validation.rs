//! Priority validation shared by `spawn` and `change_priority`.

extern "C" fn worker() {
    loop {
        std::hint::spin_loop();
    }
}

#[test]
fn unknown_priority_is_rejected_by_spawn_and_change_priority() {
    uthreads::init(&[1_000, 2_000]).unwrap();

    assert!(uthreads::spawn(worker, 2).is_err());
    let tid = uthreads::spawn(worker, 0).unwrap();
    assert_eq!(tid, 1);

    assert!(uthreads::change_priority(tid, 2).is_err());
    uthreads::change_priority(tid, 1).unwrap();

    assert!(uthreads::change_priority(999, 0).is_err());
}
