//! Every operation taking a thread id rejects an id with no live record.

#[test]
fn unknown_thread_operations_are_rejected() {
    uthreads::init(&[1_000]).unwrap();
    assert!(uthreads::block(42).is_err());
    assert!(uthreads::resume(42).is_err());
    assert!(uthreads::terminate(42).is_err());
    assert!(uthreads::thread_quantums(42).is_err());
}
