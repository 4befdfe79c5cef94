//! PID file persistence.
//!
//! The file holds the decimal process id and nothing else.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::DaemonError;

#[derive(Debug, Clone)]
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// The recorded pid, if the file exists and its first line parses as a
    /// positive integer.
    pub fn read(&self) -> Option<i32> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        let pid = content.lines().next()?.trim().parse::<i32>().ok()?;
        (pid > 0).then_some(pid)
    }

    /// Record the current process id.
    pub fn write_current(&self) -> Result<(), DaemonError> {
        std::fs::write(&self.path, std::process::id().to_string()).map_err(|source| {
            DaemonError::PidFile {
                path: self.path.clone(),
                source,
            }
        })
    }

    /// Delete the file. A file that is already gone is not an error.
    pub fn remove(&self) -> Result<(), DaemonError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(DaemonError::PidFile {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
