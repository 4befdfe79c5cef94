//! A scriptable [`Role`] for driving the supervisor in tests.

use nix::sys::signal::{Signal, raise};
use oru_daemon::{DaemonError, Role, ShutdownState};

/// Counts hook calls and stops, fails or panics on a chosen iteration.
///
/// # Example
///
/// ```ignore
/// let role = FakeRole::new().stop_after(3);
/// let mut supervisor = Supervisor::new("Fake", &config, role);
/// supervisor.run_loop().unwrap();
/// assert_eq!(supervisor.role().cores, 3);
/// ```
#[derive(Debug, Default)]
pub struct FakeRole {
    pub created: usize,
    pub destroyed: usize,
    pub cores: usize,
    stop_after: Option<usize>,
    raise_after: Option<(usize, Signal)>,
    fail_create: bool,
    fail_core_at: Option<usize>,
    panic_at: Option<usize>,
}

impl FakeRole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the shared state stopped (as a SIGTERM would) on core call `n`.
    pub fn stop_after(mut self, n: usize) -> Self {
        self.stop_after = Some(n);
        self
    }

    /// Deliver a real `signal` to this process on core call `n`.
    pub fn raise_after(mut self, n: usize, signal: Signal) -> Self {
        self.raise_after = Some((n, signal));
        self
    }

    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub fn failing_core_at(mut self, n: usize) -> Self {
        self.fail_core_at = Some(n);
        self
    }

    pub fn panicking_at(mut self, n: usize) -> Self {
        self.panic_at = Some(n);
        self
    }
}

impl Role for FakeRole {
    fn create_communication_services(&mut self) -> Result<(), DaemonError> {
        self.created += 1;
        if self.fail_create {
            return Err(DaemonError::io(
                "fake create",
                std::io::Error::other("scripted failure"),
            ));
        }
        Ok(())
    }

    fn destroy_communication_services(&mut self) {
        self.destroyed += 1;
    }

    fn core(&mut self, shutdown: &ShutdownState) -> Result<(), DaemonError> {
        self.cores += 1;
        let n = self.cores;

        if self.panic_at == Some(n) {
            panic!("scripted panic in core call {n}");
        }
        if self.fail_core_at == Some(n) {
            return Err(DaemonError::io(
                "fake core",
                std::io::Error::other("scripted failure"),
            ));
        }
        if let Some((at, signal)) = self.raise_after
            && at == n
        {
            raise(signal).map_err(|e| DaemonError::errno("raise", e))?;
        }
        if self.stop_after == Some(n) {
            shutdown.request_stop(Signal::SIGTERM);
        }
        Ok(())
    }
}
