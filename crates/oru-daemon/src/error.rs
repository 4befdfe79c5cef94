use std::path::PathBuf;

use crate::ReturnCode;

/// Errors from the supervisor and from role hooks it drives.
#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("bad arguments: {0}")]
    BadArguments(String),

    #[error(transparent)]
    Config(#[from] oru_config::ConfigError),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{context}: {source}")]
    Errno {
        context: &'static str,
        #[source]
        source: nix::errno::Errno,
    },

    #[error("PID file {path}: {source}")]
    PidFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("stop-signal handlers are already bound to another supervisor")]
    SignalsAlreadyBound,
}

impl DaemonError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn errno(context: &'static str, source: nix::errno::Errno) -> Self {
        Self::Errno { context, source }
    }

    /// The process-facing code this error is reported as.
    pub fn return_code(&self) -> ReturnCode {
        match self {
            Self::BadArguments(_) => ReturnCode::BadArguments,
            _ => ReturnCode::Failed,
        }
    }
}
