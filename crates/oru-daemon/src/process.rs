//! Thin wrappers over the Unix process primitives the supervisor needs.

use std::fs::OpenOptions;
use std::os::fd::AsRawFd;

use nix::errno::Errno;
use nix::sys::resource::{Resource, setrlimit};
use nix::sys::signal::{Signal, kill};
use nix::sys::stat::{Mode, umask};
use nix::unistd::{ForkResult, Pid, dup2, fork, setsid};

use crate::DaemonError;

/// Which side of the fork we are on after [`daemonize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detached {
    /// The original process; `child` is the new daemon.
    Launcher { child: Pid },
    /// The detached daemon process.
    Daemon,
}

/// Fork, and in the child: clear the umask, start a new session, move to
/// `/` and point stdin, stdout and stderr at `/dev/null`.
///
/// The child must not hold the launcher's terminal or pipes: a caller that
/// captures the launcher's output would otherwise wait for the daemon.
/// Log output configured with `logging.file` is unaffected.
///
/// Must be called while the process is still single-threaded.
#[allow(unsafe_code)]
pub fn daemonize() -> Result<Detached, DaemonError> {
    // SAFETY: the supervisor forks before spawning any thread, and the child
    // continues on the same single thread.
    match unsafe { fork() }.map_err(|e| DaemonError::errno("fork", e))? {
        ForkResult::Parent { child } => Ok(Detached::Launcher { child }),
        ForkResult::Child => {
            umask(Mode::empty());
            setsid().map_err(|e| DaemonError::errno("setsid", e))?;
            std::env::set_current_dir("/").map_err(|e| DaemonError::io("chdir to /", e))?;
            detach_stdio()?;
            Ok(Detached::Daemon)
        }
    }
}

const DEV_NULL: &str = "/dev/null";

/// Replace fds 0, 1 and 2 with `/dev/null`.
fn detach_stdio() -> Result<(), DaemonError> {
    let null = OpenOptions::new()
        .read(true)
        .write(true)
        .open(DEV_NULL)
        .map_err(|e| DaemonError::io(format!("open {DEV_NULL}"), e))?;
    for target in 0..=2 {
        dup2(null.as_raw_fd(), target).map_err(|e| DaemonError::errno("dup2", e))?;
    }
    Ok(())
}

/// Whether a process with this pid exists. A process we may not signal
/// (EPERM) still exists.
pub fn is_alive(pid: i32) -> bool {
    match kill(Pid::from_raw(pid), None) {
        Ok(()) => true,
        Err(Errno::EPERM) => true,
        Err(_) => false,
    }
}

pub fn send_signal(pid: i32, signal: Signal) -> Result<(), DaemonError> {
    kill(Pid::from_raw(pid), signal).map_err(|e| DaemonError::errno("kill", e))
}

/// Set both soft and hard open-file limits to `limit`.
pub fn raise_fd_limit(limit: u64) -> Result<(), DaemonError> {
    setrlimit(
        Resource::RLIMIT_NOFILE,
        limit as nix::libc::rlim_t,
        limit as nix::libc::rlim_t,
    )
    .map_err(|e| DaemonError::errno("setrlimit(RLIMIT_NOFILE)", e))
}
