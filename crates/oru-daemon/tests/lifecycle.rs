//! Supervisor lifecycle tests driven by the shared fake role.
//!
//! None of these fork or install signal handlers; see `signal_shutdown.rs`
//! for the path through real signals.

use std::os::unix::process::ExitStatusExt;
use std::process::Command;

use nix::sys::signal::Signal;
use oru_daemon::{InstanceCheck, ReturnCode, StartMode, Supervisor, catch_faults};
use oru_test_utils::{FakeRole, TestEnv};
use pretty_assertions::assert_eq;

#[test_log::test]
fn test_run_loop_calls_hooks_in_order() {
    let env = TestEnv::new();
    let mut sup = Supervisor::new("Fake", &env.config, FakeRole::new().stop_after(4));
    sup.pid_file().write_current().unwrap();

    sup.run_loop().unwrap();

    let role = sup.role();
    assert_eq!(role.created, 1);
    assert_eq!(role.cores, 4);
    assert_eq!(role.destroyed, 1);
    assert!(!env.pid_path("Fake").exists());
}

#[test]
fn test_failing_create_never_iterates() {
    let env = TestEnv::new();
    let mut sup = Supervisor::new("Fake", &env.config, FakeRole::new().failing_create());

    let err = sup.run_loop().unwrap_err();

    assert_eq!(err.return_code(), ReturnCode::Failed);
    assert_eq!(sup.role().cores, 0);
    assert_eq!(sup.role().destroyed, 1);
}

#[test]
fn test_core_error_stops_loop_and_cleans_up() {
    let env = TestEnv::new();
    let mut sup = Supervisor::new("Fake", &env.config, FakeRole::new().failing_core_at(2));
    sup.pid_file().write_current().unwrap();

    assert!(sup.run_loop().is_err());
    assert_eq!(sup.role().cores, 2);
    assert!(!env.pid_path("Fake").exists());
}

#[test]
fn test_panic_in_core_is_swallowed() {
    let env = TestEnv::new();
    let mut sup = Supervisor::new("Fake", &env.config, FakeRole::new().panicking_at(1));
    sup.pid_file().write_current().unwrap();

    let code = catch_faults(|| sup.run_loop());

    assert_eq!(code, ReturnCode::Ok);
    assert_eq!(sup.role().cores, 1);
    // The loop unwound past cleanup.
    assert!(env.pid_path("Fake").exists());
}

#[test]
fn test_live_unrelated_process_blocks_start() {
    let env = TestEnv::new();
    let mut child = Command::new("sleep").arg("30").spawn().unwrap();
    env.write_pid("Fake", child.id());

    let mut sup = Supervisor::new("Fake", &env.config, FakeRole::new());
    assert_eq!(
        sup.check_process(StartMode::Foreground).unwrap(),
        InstanceCheck::AlreadyRunning {
            pid: child.id() as i32
        }
    );
    assert_eq!(sup.start(StartMode::Normal), ReturnCode::IsRunning);
    assert!(env.pid_path("Fake").exists());
    assert_eq!(sup.role().created, 0);

    child.kill().unwrap();
    child.wait().unwrap();
}

#[test_log::test]
fn test_quit_sends_sigquit_to_running_instance() {
    let env = TestEnv::new();
    let mut child = Command::new("sleep").arg("30").spawn().unwrap();
    env.write_pid("Fake", child.id());

    let mut sup = Supervisor::new("Fake", &env.config, FakeRole::new());
    assert_eq!(sup.start(StartMode::Quit), ReturnCode::IsInterrupted);

    let status = child.wait().unwrap();
    assert_eq!(status.signal(), Some(Signal::SIGQUIT as i32));
    assert_eq!(sup.role().created, 0);
}

#[test]
fn test_quit_without_instance_creates_nothing() {
    let env = TestEnv::new();
    let mut sup = Supervisor::new("Fake", &env.config, FakeRole::new());

    assert_eq!(sup.start(StartMode::Quit), ReturnCode::IsInterrupted);
    assert!(!env.pid_path("Fake").exists());
}

#[test]
fn test_stale_pid_file_is_removed() {
    let env = TestEnv::new();
    let mut child = Command::new("true").spawn().unwrap();
    let pid = child.id();
    child.wait().unwrap();
    env.write_pid("Fake", pid);

    let sup = Supervisor::new("Fake", &env.config, FakeRole::new());
    assert_eq!(
        sup.check_process(StartMode::Normal).unwrap(),
        InstanceCheck::Proceed
    );
    assert!(!env.pid_path("Fake").exists());
}
