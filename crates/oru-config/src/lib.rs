#![deny(unsafe_code)]

//! Configuration loading and validation for the ORU daemons.
//!
//! Loads TOML configuration files and validates them. Every field has a
//! default, so an empty file (or no file at all) yields the stock setup:
//! PID files in `/tmp`, the control socket at `/tmp/unix.socket`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Longest socket path that fits in `sockaddr_un.sun_path` with its NUL.
pub const MAX_SOCKET_PATH_LEN: usize = 107;

/// Upper bound for `client.poll_interval_secs` (one day).
pub const MAX_POLL_INTERVAL_SECS: u64 = 86_400;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Top-level application configuration.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Process lifecycle settings.
    #[serde(default)]
    pub daemon: DaemonConfig,

    /// Control socket settings shared by server and client.
    #[serde(default)]
    pub transport: TransportConfig,

    /// Polling client settings.
    #[serde(default)]
    pub client: ClientConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Process lifecycle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Directory holding `<name>.pid`.
    #[serde(default = "default_runtime_dir")]
    pub runtime_dir: String,

    /// Open-file limit (soft and hard) applied at startup.
    #[serde(default = "default_fd_limit")]
    pub fd_limit: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            runtime_dir: default_runtime_dir(),
            fd_limit: default_fd_limit(),
        }
    }
}

impl DaemonConfig {
    /// PID file location for the daemon called `name`.
    pub fn pid_file_path(&self, name: &str) -> PathBuf {
        Path::new(&self.runtime_dir).join(format!("{name}.pid"))
    }
}

fn default_runtime_dir() -> String {
    "/tmp".to_string()
}

fn default_fd_limit() -> u64 {
    10240
}

/// Control socket settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Filesystem path of the Unix domain socket.
    #[serde(default = "default_socket_path")]
    pub socket_path: String,

    /// Pending-connection backlog passed to `listen`.
    #[serde(default = "default_backlog")]
    pub backlog: i32,

    /// How long one server iteration waits for a connection (0 = forever).
    #[serde(default = "default_accept_timeout_ms")]
    pub accept_timeout_ms: u64,

    /// Read/write timeout on an established connection (0 = none).
    #[serde(default = "default_io_timeout_ms")]
    pub io_timeout_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            socket_path: default_socket_path(),
            backlog: default_backlog(),
            accept_timeout_ms: default_accept_timeout_ms(),
            io_timeout_ms: default_io_timeout_ms(),
        }
    }
}

impl TransportConfig {
    pub fn accept_timeout(&self) -> Option<Duration> {
        non_zero_millis(self.accept_timeout_ms)
    }

    pub fn io_timeout(&self) -> Option<Duration> {
        non_zero_millis(self.io_timeout_ms)
    }
}

fn non_zero_millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

fn default_socket_path() -> String {
    "/tmp/unix.socket".to_string()
}

fn default_backlog() -> i32 {
    5
}

fn default_accept_timeout_ms() -> u64 {
    1000
}

fn default_io_timeout_ms() -> u64 {
    5000
}

/// Which request the polling client sends each round.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientRequest {
    #[default]
    Ping,
    Status,
}

/// Polling client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Pause between two polls, in seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Request kind: "ping" or "status".
    #[serde(default)]
    pub request: ClientRequest,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            request: ClientRequest::default(),
        }
    }
}

impl ClientConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

fn default_poll_interval_secs() -> u64 {
    5
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "debug", "trace").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Append log output to this file instead of stderr.
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from a TOML file at the given path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Load `path` when given, otherwise fall back to the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                debug!("No config file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.daemon.runtime_dir.is_empty() {
            return Err(ConfigError::Validation(
                "daemon.runtime_dir must not be empty".to_string(),
            ));
        }
        if self.daemon.fd_limit == 0 {
            return Err(ConfigError::Validation(
                "daemon.fd_limit must be non-zero".to_string(),
            ));
        }

        let socket_path = &self.transport.socket_path;
        if socket_path.is_empty() {
            return Err(ConfigError::Validation(
                "transport.socket_path must not be empty".to_string(),
            ));
        }
        if socket_path.len() > MAX_SOCKET_PATH_LEN {
            return Err(ConfigError::Validation(format!(
                "transport.socket_path must be at most {MAX_SOCKET_PATH_LEN} bytes, got {}",
                socket_path.len()
            )));
        }
        if self.transport.backlog <= 0 {
            return Err(ConfigError::Validation(format!(
                "transport.backlog must be positive, got {}",
                self.transport.backlog
            )));
        }

        if self.client.poll_interval_secs > MAX_POLL_INTERVAL_SECS {
            return Err(ConfigError::Validation(format!(
                "client.poll_interval_secs must be at most {MAX_POLL_INTERVAL_SECS}, got {}",
                self.client.poll_interval_secs
            )));
        }

        if self.logging.level.is_empty() {
            return Err(ConfigError::Validation(
                "logging.level must not be empty".to_string(),
            ));
        }
        if self.logging.file.as_deref() == Some("") {
            return Err(ConfigError::Validation(
                "logging.file must not be empty when set".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.daemon.runtime_dir, "/tmp");
        assert_eq!(config.daemon.fd_limit, 10240);
        assert_eq!(config.transport.socket_path, "/tmp/unix.socket");
        assert_eq!(config.transport.backlog, 5);
        assert_eq!(config.client.poll_interval_secs, 5);
        assert_eq!(config.client.request, ClientRequest::Ping);
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config.transport.socket_path, "/tmp/unix.socket");
    }

    #[test]
    fn test_parse_full_toml() {
        let toml = r#"
            [daemon]
            runtime_dir = "/run/oru"
            fd_limit = 4096

            [transport]
            socket_path = "/run/oru/control.sock"
            backlog = 16
            accept_timeout_ms = 250
            io_timeout_ms = 0

            [client]
            poll_interval_secs = 1
            request = "status"

            [logging]
            level = "debug"
            file = "/var/log/oru.log"
        "#;
        let config = AppConfig::parse(toml).unwrap();
        assert_eq!(config.daemon.runtime_dir, "/run/oru");
        assert_eq!(config.daemon.fd_limit, 4096);
        assert_eq!(config.transport.socket_path, "/run/oru/control.sock");
        assert_eq!(config.transport.backlog, 16);
        assert_eq!(
            config.transport.accept_timeout(),
            Some(Duration::from_millis(250))
        );
        assert_eq!(config.transport.io_timeout(), None);
        assert_eq!(config.client.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.client.request, ClientRequest::Status);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file.as_deref(), Some("/var/log/oru.log"));
    }

    #[test]
    fn test_pid_file_path_derives_from_name() {
        let config = AppConfig::default();
        assert_eq!(
            config.daemon.pid_file_path("Server"),
            PathBuf::from("/tmp/Server.pid")
        );
    }

    #[test]
    fn test_validation_rejects_zero_backlog() {
        let toml = r#"
            [transport]
            backlog = 0
        "#;
        assert!(AppConfig::parse(toml).is_err());
    }

    #[test]
    fn test_validation_rejects_long_socket_path() {
        let long = "x".repeat(MAX_SOCKET_PATH_LEN + 1);
        let toml = format!("[transport]\nsocket_path = \"/{long}\"\n");
        let err = AppConfig::parse(&toml).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_validation_rejects_empty_runtime_dir() {
        let toml = r#"
            [daemon]
            runtime_dir = ""
        "#;
        assert!(AppConfig::parse(toml).is_err());
    }

    #[test]
    fn test_validation_rejects_zero_fd_limit() {
        let toml = r#"
            [daemon]
            fd_limit = 0
        "#;
        assert!(AppConfig::parse(toml).is_err());
    }

    #[test]
    fn test_validation_bounds_poll_interval() {
        let at_limit = format!("[client]\npoll_interval_secs = {MAX_POLL_INTERVAL_SECS}\n");
        assert!(AppConfig::parse(&at_limit).is_ok());

        let err = AppConfig::parse("[client]\npoll_interval_secs = 9223372036854775807\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_unknown_client_request_is_a_parse_error() {
        let toml = r#"
            [client]
            request = "reboot"
        "#;
        let err = AppConfig::parse(toml).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("oru.toml");
        std::fs::write(&path, "[transport]\nsocket_path = \"/tmp/oru-test.sock\"\n").unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.transport.socket_path, "/tmp/oru-test.sock");
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = AppConfig::load(Path::new("/nonexistent/oru.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_or_default_without_path() {
        let config = AppConfig::load_or_default(None).unwrap();
        assert_eq!(config.daemon.runtime_dir, "/tmp");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("bad value".to_string());
        assert_eq!(err.to_string(), "validation error: bad value");
    }
}
