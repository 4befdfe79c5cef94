#![deny(unsafe_code)]

//! Shared test utilities for the ORU workspace.
//!
//! Provides a scriptable fake [`Role`](oru_daemon::Role), config builders
//! rooted in temporary directories, and tracing helpers so that individual
//! crate tests stay concise and consistent.
//!
//! Add this crate as a `[dev-dependency]` in any workspace member and use it
//! from integration tests under `tests/`:
//!
//! ```toml
//! [dev-dependencies]
//! oru-test-utils = { workspace = true }
//! ```

pub mod config;
pub mod env;
pub mod role;
pub mod tracing_setup;

pub use config::TestConfigBuilder;
pub use env::TestEnv;
pub use role::FakeRole;
pub use tracing_setup::init_test_tracing;
