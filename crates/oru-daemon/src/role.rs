//! The pluggable behavior a [`Supervisor`](crate::Supervisor) drives.

use crate::{DaemonError, ShutdownState};

/// Lifecycle hooks of a daemon role (server, client, or a test fake).
///
/// The supervisor calls `create_communication_services` once before the run
/// loop, `core` once per iteration while running, and
/// `destroy_communication_services` once after the loop, even when an
/// earlier hook failed.
pub trait Role {
    /// Acquire sockets or other resources. An error prevents the loop from
    /// iterating.
    fn create_communication_services(&mut self) -> Result<(), DaemonError>;

    fn destroy_communication_services(&mut self);

    /// One iteration of work. `shutdown` lets long waits end early when a
    /// stop signal arrives. An error ends the run loop.
    fn core(&mut self, shutdown: &ShutdownState) -> Result<(), DaemonError>;
}

impl<R: Role + ?Sized> Role for Box<R> {
    fn create_communication_services(&mut self) -> Result<(), DaemonError> {
        (**self).create_communication_services()
    }

    fn destroy_communication_services(&mut self) {
        (**self).destroy_communication_services()
    }

    fn core(&mut self, shutdown: &ShutdownState) -> Result<(), DaemonError> {
        (**self).core(shutdown)
    }
}
