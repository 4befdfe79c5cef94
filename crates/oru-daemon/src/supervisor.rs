//! The daemon lifecycle: singleton check, detach, run loop, cleanup.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use nix::sys::signal::Signal;
use oru_config::AppConfig;
use tracing::{debug, error, info, warn};

use crate::args::StartMode;
use crate::pid_file::PidFile;
use crate::process::{self, Detached};
use crate::signals::{self, ShutdownState};
use crate::{DaemonError, ReturnCode, Role, build_info};

/// Outcome of looking for an already running instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceCheck {
    /// No live instance; startup may continue.
    Proceed,
    /// Another instance is alive; this one must not start.
    AlreadyRunning { pid: i32 },
    /// Quit mode: the live instance (if any) was asked to stop.
    Interrupted { pid: Option<i32> },
}

impl InstanceCheck {
    pub fn return_code(&self) -> ReturnCode {
        match self {
            Self::Proceed => ReturnCode::Ok,
            Self::AlreadyRunning { .. } => ReturnCode::IsRunning,
            Self::Interrupted { .. } => ReturnCode::IsInterrupted,
        }
    }
}

/// Turns the current process into a singleton, signal-controlled daemon
/// driving a [`Role`].
pub struct Supervisor<R> {
    name: String,
    role: R,
    shutdown: Arc<ShutdownState>,
    pid_file: PidFile,
    fd_limit: u64,
}

impl<R: Role> Supervisor<R> {
    pub fn new(name: impl Into<String>, config: &AppConfig, role: R) -> Self {
        let name = name.into();
        let pid_file = PidFile::new(config.daemon.pid_file_path(&name));
        Self {
            name,
            role,
            shutdown: Arc::new(ShutdownState::new()),
            pid_file,
            fd_limit: config.daemon.fd_limit,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pid_file(&self) -> &PidFile {
        &self.pid_file
    }

    pub fn shutdown(&self) -> &Arc<ShutdownState> {
        &self.shutdown
    }

    pub fn role(&self) -> &R {
        &self.role
    }

    pub fn into_role(self) -> R {
        self.role
    }

    /// Look at the recorded PID and decide whether this process may start.
    ///
    /// A stale PID file is deleted; failing to delete it is an error. In
    /// quit mode a live instance gets SIGQUIT.
    pub fn check_process(&self, mode: StartMode) -> Result<InstanceCheck, DaemonError> {
        let quit = mode == StartMode::Quit;

        if let Some(pid) = self.pid_file.read() {
            if process::is_alive(pid) {
                if !quit {
                    info!(pid, "Was already started");
                    return Ok(InstanceCheck::AlreadyRunning { pid });
                }
                match process::send_signal(pid, Signal::SIGQUIT) {
                    Ok(()) => info!(pid, "Stop"),
                    Err(e) => error!(pid, error = %e, "Failed to stop daemon"),
                }
                return Ok(InstanceCheck::Interrupted { pid: Some(pid) });
            }

            info!(
                pid,
                path = %self.pid_file.path().display(),
                "Not running but PID file exists, removing it"
            );
            self.pid_file
                .remove()
                .inspect_err(|e| error!(error = %e, "Cannot delete PID file"))?;
        }

        if quit {
            info!("Not running");
            return Ok(InstanceCheck::Interrupted { pid: None });
        }
        Ok(InstanceCheck::Proceed)
    }

    /// Run the whole lifecycle for `mode` and report the outcome.
    ///
    /// In normal mode the calling process returns [`ReturnCode::Ok`] as soon
    /// as the daemon is forked; the daemon itself returns when its run loop
    /// ends.
    pub fn start(&mut self, mode: StartMode) -> ReturnCode {
        if mode == StartMode::Unknown {
            return ReturnCode::BadArguments;
        }

        let check = match self.check_process(mode) {
            Ok(check) => check,
            Err(e) => return e.return_code(),
        };
        if check != InstanceCheck::Proceed {
            return check.return_code();
        }

        if mode != StartMode::Foreground {
            match process::daemonize() {
                Ok(Detached::Launcher { child }) => {
                    debug!(pid = child.as_raw(), "Forked daemon process");
                    return ReturnCode::Ok;
                }
                Ok(Detached::Daemon) => {}
                Err(e) => {
                    error!(critical = true, error = %e, "Start daemon error");
                    println!("Start daemon error: {e}");
                    return ReturnCode::Failed;
                }
            }
        }

        catch_faults(|| self.main_loop())
    }

    /// Set up the running process and enter the run loop.
    pub fn main_loop(&mut self) -> Result<(), DaemonError> {
        info!("Started");
        info!(
            version = build_info::version_number(),
            build = %build_info::version_string(),
            "{} version",
            self.name
        );

        signals::install(&self.shutdown)?;

        if let Err(e) = process::raise_fd_limit(self.fd_limit) {
            error!(limit = self.fd_limit, error = %e, "Set file descriptor's limit failed");
        }

        self.pid_file
            .write_current()
            .inspect_err(|e| error!(error = %e, "Set PID to file failed"))?;

        self.run_loop()
    }

    /// Create services, call `core` until stopped or failed, then clean up
    /// and destroy services. Does not install signal handlers.
    pub fn run_loop(&mut self) -> Result<(), DaemonError> {
        if !self.shutdown.begin() {
            info!("Stop requested before the run loop started");
        }

        let mut result = self.role.create_communication_services();
        while result.is_ok() && self.shutdown.is_running() {
            result = self.role.core(&self.shutdown);
        }

        if let Err(e) = &result {
            error!(error = %e, "Run loop ended with error");
        }

        self.clean();
        self.role.destroy_communication_services();
        result
    }

    fn clean(&self) {
        if let Some(signal) = self.shutdown.last_signal() {
            info!(signal = signal.as_str(), "Signal");
            if signals::is_stop_signal(signal) {
                info!("Stop");
            }
        }

        if let Err(e) = self.pid_file.remove() {
            warn!(error = %e, "Failed to remove PID file");
        }

        info!("Stopped");
    }
}

/// Run `body`, logging any error it returns or any panic it raises.
///
/// A panic is logged and reported as [`ReturnCode::Ok`]: a launcher that
/// forked the daemon has already reported success, and foreground runs
/// behave the same way.
pub fn catch_faults<F>(body: F) -> ReturnCode
where
    F: FnOnce() -> Result<(), DaemonError>,
{
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(())) => ReturnCode::Ok,
        Ok(Err(e)) => {
            error!(error = %e, "Daemon failed");
            e.return_code()
        }
        Err(payload) => {
            error!(fault = panic_message(payload.as_ref()), "Unhandled fault");
            ReturnCode::Ok
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
