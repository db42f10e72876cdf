//! `terminate(0)` never returns: it tears down the scheduler and calls
//! `std::process::exit(0)`. Exercised in a child process re-invoking this
//! same test binary, since there is no way to observe a process exit from
//! within the process that performed it.

use std::process::Command;

const CHILD_ENV: &str = "UTHREADS_SELF_TERMINATE_MAIN_CHILD";

extern "C" fn worker() {
    loop {
        std::hint::spin_loop();
    }
}

#[test]
fn terminate_main_exits_the_process_successfully() {
    if std::env::var_os(CHILD_ENV).is_some() {
        uthreads::init(&[1_000]).unwrap();
        uthreads::spawn(worker, 0).unwrap();
        uthreads::terminate(0).unwrap();
        unreachable!("terminate(0) never returns");
    }

    let exe = std::env::current_exe().expect("test binary path");
    let status = Command::new(exe)
        .env(CHILD_ENV, "1")
        .args(["--exact", "terminate_main_exits_the_process_successfully", "--nocapture"])
        .status()
        .expect("failed to spawn child test process");

    assert!(status.success(), "terminate(0) should exit with success status, got {status:?}");
}
