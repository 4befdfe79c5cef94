//! Process-facing status codes.

use std::fmt;
use std::process::ExitCode;

/// Outcome of a daemon start attempt, reported to the launching shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ReturnCode {
    UnknownError = -1,
    Ok = 0,
    Error = 1,
    BadArguments = 2,
    Failed = 3,
    /// A running instance was asked to stop, or there was nothing to stop.
    IsInterrupted = 4,
    /// Another instance already holds the PID file.
    IsRunning = 5,
}

impl ReturnCode {
    const ALL: [ReturnCode; 7] = [
        ReturnCode::UnknownError,
        ReturnCode::Ok,
        ReturnCode::Error,
        ReturnCode::BadArguments,
        ReturnCode::Failed,
        ReturnCode::IsInterrupted,
        ReturnCode::IsRunning,
    ];

    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Map a numeric id back to a code; unknown ids are `UnknownError`.
    pub fn from_i32(id: i32) -> Self {
        Self::ALL
            .into_iter()
            .find(|code| code.as_i32() == id)
            .unwrap_or(Self::UnknownError)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::UnknownError => "UNKNOWN_ERROR",
            Self::Ok => "OK",
            Self::Error => "ERROR",
            Self::BadArguments => "BAD_ARGUMENTS",
            Self::Failed => "FAILED",
            Self::IsInterrupted => "IS_INTERRUPTED",
            Self::IsRunning => "IS_RUNNING",
        }
    }

    /// Stable name for a numeric id, for log lines.
    pub fn name_of(id: i32) -> &'static str {
        Self::from_i32(id).name()
    }

    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }
}

impl fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<ReturnCode> for ExitCode {
    /// The exit status is the code truncated to a byte (`-1` becomes 255).
    fn from(code: ReturnCode) -> Self {
        ExitCode::from(code.as_i32() as u8)
    }
}
