#![deny(unsafe_code)]

//! ORU server role.
//!
//! Listens on a Unix domain socket and answers one request per connection:
//!
//! ```text
//! PING        ─► PONG         (same seq)
//! REQ_STATUS  ─► RESP_STATUS  (same seq, PROCESSING)
//! anything    ─► ERROR        (same seq)
//! ```

/// Request-to-reply mapping.
pub mod dispatch;
/// Listener lifecycle and per-connection handling.
pub mod role;

pub use dispatch::{reply_for, respond};
pub use role::ServerRole;

/// Name used for the PID file and log span.
pub const DAEMON_NAME: &str = "Server";
