//! `init` argument validation. Kept to a single test per file; see
//! `spawn_and_capacity.rs` for why.

#[test]
fn init_rejects_an_empty_quantum_list() {
    assert!(uthreads::init(&[]).is_err());
}
