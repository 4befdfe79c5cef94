//! Stop-signal handling.
//!
//! OS signal handlers receive no context, so one [`ShutdownState`] is
//! registered process-wide the first time handlers are installed. The
//! handler only performs atomic stores on it; logging of the received
//! signal happens later, in the supervisor's cleanup.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, OnceLock};

use nix::libc::c_int;
use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction};

use crate::DaemonError;

/// Signals that mean "shut down gracefully".
pub const STOP_SIGNALS: [Signal; 3] = [Signal::SIGTERM, Signal::SIGINT, Signal::SIGQUIT];

pub fn is_stop_signal(signal: Signal) -> bool {
    STOP_SIGNALS.contains(&signal)
}

/// Running flag and last received signal, shared with the signal handler.
#[derive(Debug, Default)]
pub struct ShutdownState {
    running: AtomicBool,
    stop_requested: AtomicBool,
    last_signal: AtomicI32,
}

impl ShutdownState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter the running state. A stop recorded earlier still wins, so the
    /// return value tells whether the loop may start.
    pub fn begin(&self) -> bool {
        let may_run = !self.stop_requested.load(Ordering::SeqCst);
        self.running.store(may_run, Ordering::SeqCst);
        may_run
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    /// Record a raw signal number. Async-signal-safe: atomics only.
    pub fn record(&self, signo: c_int) {
        self.last_signal.store(signo, Ordering::SeqCst);
        if Signal::try_from(signo).is_ok_and(is_stop_signal) {
            self.stop_requested.store(true, Ordering::SeqCst);
            self.running.store(false, Ordering::SeqCst);
        }
    }

    /// Same as receiving `signal` from the OS.
    pub fn request_stop(&self, signal: Signal) {
        self.record(signal as c_int);
    }

    pub fn last_signal(&self) -> Option<Signal> {
        match self.last_signal.load(Ordering::SeqCst) {
            0 => None,
            signo => Signal::try_from(signo).ok(),
        }
    }
}

static ACTIVE: OnceLock<Arc<ShutdownState>> = OnceLock::new();

extern "C" fn on_stop_signal(signo: c_int) {
    if let Some(state) = ACTIVE.get() {
        state.record(signo);
    }
}

/// Bind `state` as the process-wide shutdown handle and route
/// SIGTERM/SIGINT/SIGQUIT to it.
///
/// Only one state can ever be bound; installing again with the same state
/// is allowed, with a different one fails.
#[allow(unsafe_code)]
pub fn install(state: &Arc<ShutdownState>) -> Result<(), DaemonError> {
    let active = ACTIVE.get_or_init(|| Arc::clone(state));
    if !Arc::ptr_eq(active, state) {
        return Err(DaemonError::SignalsAlreadyBound);
    }

    let action = SigAction::new(
        SigHandler::Handler(on_stop_signal),
        SaFlags::empty(),
        SigSet::empty(),
    );
    for signal in STOP_SIGNALS {
        // SAFETY: the handler only does atomic loads and stores on a handle
        // that is never replaced after it is set.
        unsafe { sigaction(signal, &action) }.map_err(|e| DaemonError::errno("sigaction", e))?;
    }
    Ok(())
}
