//! Temporary runtime directory for daemon tests.
//!
//! [`TestEnv`] owns a temp directory that holds the PID files, the control
//! socket and an optional config file, so tests never touch `/tmp` paths
//! shared with a real daemon.

use std::path::PathBuf;

use oru_config::AppConfig;
use tempfile::TempDir;

use crate::TestConfigBuilder;

/// A test-scoped runtime directory with a matching [`AppConfig`].
///
/// The directory is deleted when this value is dropped, guaranteeing cleanup
/// even on panic.
pub struct TestEnv {
    pub config: AppConfig,
    dir: TempDir,
}

impl TestEnv {
    /// Fresh directory; PID files and the socket live inside it. Timeouts
    /// are short so server loops notice a stop quickly.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let config = TestConfigBuilder::new()
            .runtime_dir(dir.path())
            .socket_path(dir.path().join("oru.sock"))
            .accept_timeout_ms(50)
            .io_timeout_ms(2000)
            .poll_interval_secs(0)
            .build();
        Self { config, dir }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    pub fn socket_path(&self) -> PathBuf {
        PathBuf::from(&self.config.transport.socket_path)
    }

    pub fn pid_path(&self, name: &str) -> PathBuf {
        self.config.daemon.pid_file_path(name)
    }

    /// Write the current config as `oru.toml` and return its path, for
    /// passing to a daemon with `-c`.
    pub fn write_config(&self) -> PathBuf {
        let path = self.dir.path().join("oru.toml");
        let content = toml::to_string(&self.config).expect("failed to serialize test config");
        std::fs::write(&path, content).expect("failed to write test config");
        path
    }

    /// Record `pid` in the PID file of daemon `name`.
    pub fn write_pid(&self, name: &str, pid: u32) {
        std::fs::write(self.pid_path(name), pid.to_string()).expect("failed to write PID file");
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
