#![deny(unsafe_code)]

//! ORU client role.
//!
//! Each run-loop iteration connects to the server socket, sends one request
//! (`PING` or `REQ_STATUS`), logs the reply and then waits out the poll
//! interval.

pub mod role;

pub use role::ClientRole;

/// Name used for the PID file and log span.
pub const DAEMON_NAME: &str = "Client";
