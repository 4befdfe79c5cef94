//! Configuration builders for tests.
//!
//! Use [`TestConfigBuilder`] to create customised [`AppConfig`] values without
//! repeating boilerplate across crate boundaries.

use std::path::Path;

use oru_config::{AppConfig, ClientRequest};

/// Fluent builder for [`AppConfig`] in tests.
///
/// # Example
///
/// ```ignore
/// let config = TestConfigBuilder::new()
///     .runtime_dir(tmp.path())
///     .socket_path(tmp.path().join("oru.sock"))
///     .accept_timeout_ms(50)
///     .build();
/// ```
pub struct TestConfigBuilder {
    config: AppConfig,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn runtime_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.daemon.runtime_dir = dir.as_ref().display().to_string();
        self
    }

    pub fn socket_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config.transport.socket_path = path.as_ref().display().to_string();
        self
    }

    pub fn accept_timeout_ms(mut self, ms: u64) -> Self {
        self.config.transport.accept_timeout_ms = ms;
        self
    }

    pub fn io_timeout_ms(mut self, ms: u64) -> Self {
        self.config.transport.io_timeout_ms = ms;
        self
    }

    pub fn poll_interval_secs(mut self, secs: u64) -> Self {
        self.config.client.poll_interval_secs = secs;
        self
    }

    pub fn request(mut self, request: ClientRequest) -> Self {
        self.config.client.request = request;
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
