#![deny(unsafe_code)]

//! ORU daemon lifecycle supervisor.
//!
//! Turns a process into a singleton background service: parses the start
//! mode, checks the PID file for a live instance, forks and detaches,
//! installs stop-signal handlers, and drives a pluggable [`Role`] until a
//! stop signal arrives.
//!
//! ```text
//! launch ─► args ─► config ─► logging ─► Supervisor::start
//!                                           │
//!                    check_process ◄────────┤
//!                    daemonize (unless -f) ◄┤
//!                    main_loop ─► run_loop ─► Role::core ...
//! ```

/// Command-line flags and start modes.
pub mod args;
/// Compile-time build metadata (version, git hash, profile).
pub mod build_info;
pub mod error;
/// Shared `launch` entry point for daemon binaries.
pub mod launcher;
/// `tracing` subscriber setup.
pub mod logging;
pub mod pid_file;
/// fork/setsid, liveness probes and resource limits.
pub mod process;
pub mod return_code;
pub mod role;
/// Stop-signal handlers and the shared shutdown state.
pub mod signals;
pub mod supervisor;

pub use args::{DaemonArgs, StartMode};
pub use error::DaemonError;
pub use launcher::launch;
pub use pid_file::PidFile;
pub use return_code::ReturnCode;
pub use role::Role;
pub use signals::ShutdownState;
pub use supervisor::{InstanceCheck, Supervisor, catch_faults};
